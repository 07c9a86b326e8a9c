//! Account entity - Login credentials.
//!
//! Kept apart from the [`super::user`] profile the way a hosted identity
//! service keeps its accounts apart from application data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Account id, stamped into `created_by` on records this account creates
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Login email, unique across accounts
    #[sea_orm(unique)]
    pub email: String,
    /// Name given at registration
    pub name: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Registration time
    pub created_at: DateTimeUtc,
}

/// Accounts have no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
