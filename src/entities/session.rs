//! Session entity - A live login, keyed by its bearer token.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Bearer token
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Account the session belongs to
    pub account_id: String,
    /// Login time
    pub created_at: DateTimeUtc,
}

/// Sessions have no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
