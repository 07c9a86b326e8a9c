//! Core business logic - framework-agnostic operations over the document store.
//!
//! Functions take any SeaORM `ConnectionTrait`, so they run the same against a live
//! connection or a `MockDatabase`.

/// Accounts, logins and the explicit session context
pub mod auth;
/// Class CRUD and lookups
pub mod class;
/// Dashboard counts and class occupancy
pub mod dashboard;
/// Denormalized class counters kept in step with student writes
pub mod enrollment;
/// Admission and employee number generation
pub mod identifiers;
/// Profile editing with avatar replacement
pub mod profile;
/// Student CRUD
pub mod student;
/// Teacher CRUD
pub mod teacher;

use crate::errors::{Error, Result};

/// A fresh opaque document id.
#[must_use]
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation {
            message: format!("{field} cannot be empty"),
        });
    }
    Ok(())
}
