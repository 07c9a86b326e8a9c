//! Student entity - One enrolled (or formerly enrolled) pupil.
//!
//! `class_id` is a plain reference to a row in `classes`; no foreign key is
//! declared, so a student can point at a class that has since been deleted.
//! `class_name` is a denormalized copy kept only for display.

use super::common::{Gender, Grade};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[allow(missing_docs)]
pub enum StudentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "graduated")]
    Graduated,
    #[sea_orm(string_value = "transferred")]
    Transferred,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
#[allow(missing_docs)]
pub struct Model {
    /// Document id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Opaque identity generated at creation
    pub student_id: String,
    /// Human-facing key, `HS-{year}-{grade}-{seq}`; assigned once
    pub admission_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Date,
    pub gender: Gender,
    pub grade: Grade,
    /// Avatar preview URL in the file bucket
    pub avatar: Option<String>,
    /// Class this student is placed in, if any
    pub class_id: Option<String>,
    /// Denormalized class name for display
    pub class_name: Option<String>,
    pub parent_name: String,
    pub parent_email: Option<String>,
    pub parent_phone: String,
    /// Linked once the parent registers an account
    pub parent_user_id: Option<String>,
    pub address: Option<String>,
    pub medical_info: Option<String>,
    pub enrollment_date: DateTimeUtc,
    pub status: StudentStatus,
    /// Account id of whoever created the record
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Students have no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
