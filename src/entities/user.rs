//! User entity - The profile document attached to an account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of the person behind the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[allow(missing_docs)]
pub enum UserType {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "teacher")]
    Teacher,
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "parent")]
    Parent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[allow(missing_docs)]
pub enum UserStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

/// User profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Profile document id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning account id
    pub user_id: String,
    /// Copied from the account at registration
    pub email: String,
    /// Name shown in the dashboard
    pub full_name: String,
    /// Role
    pub user_type: UserType,
    /// Contact number
    pub phone_number: Option<String>,
    /// Lifecycle state
    pub status: UserStatus,
    /// Avatar preview URL in the file bucket
    pub avatar: Option<String>,
    /// Staff number for employees
    pub employee_id: Option<String>,
    /// Registration time
    pub date_joined: DateTimeUtc,
    /// Most recent successful login
    pub last_login: Option<DateTimeUtc>,
}

/// Profiles have no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
