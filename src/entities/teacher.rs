//! Teacher entity - A member of teaching staff.
//!
//! `subjects` and `classes` are JSON arrays. `emergency_contact` holds a
//! serialized [`crate::core::teacher::EmergencyContact`] blob rather than a
//! structured column.

use super::common::{Gender, StringList};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract under which the teacher is employed
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[allow(missing_docs)]
pub enum EmploymentType {
    #[sea_orm(string_value = "Full-time")]
    FullTime,
    #[sea_orm(string_value = "Part-time")]
    PartTime,
    #[sea_orm(string_value = "Contract")]
    Contract,
}

/// Teacher lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[allow(missing_docs)]
pub enum TeacherStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "on-leave")]
    OnLeave,
    #[sea_orm(string_value = "terminated")]
    Terminated,
}

/// Teacher database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teachers")]
#[allow(missing_docs)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub teacher_id: String,
    /// Human-facing key, `TS-{year}-{seq}`; assigned once
    pub employee_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Date,
    pub gender: Gender,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub date_of_joining: Date,
    pub qualification: String,
    pub specialization: String,
    pub subjects: StringList,
    /// Grade codes taught, e.g. `["P1", "P2"]`
    pub classes: StringList,
    pub employment_type: EmploymentType,
    pub status: TeacherStatus,
    pub salary: Option<f64>,
    pub bank_details: Option<String>,
    /// JSON blob, see [`crate::core::teacher::parse_emergency_contact`]
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Teachers have no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
