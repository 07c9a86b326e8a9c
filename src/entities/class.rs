//! Class entity - A teaching group for one grade in one term.
//!
//! `current_students` is a denormalized count that student mutations adjust by
//! one at a time; it is not recomputed from the `students` table.

use super::common::{Grade, StringList};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Academic term
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[allow(missing_docs)]
pub enum Term {
    #[sea_orm(string_value = "Term1")]
    Term1,
    #[sea_orm(string_value = "Term2")]
    Term2,
    #[sea_orm(string_value = "Term3")]
    Term3,
}

/// Class lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[allow(missing_docs)]
pub enum ClassStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Class database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    /// Document id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Same value as `id`, kept as a field of its own
    pub class_id: String,
    /// Display name, e.g. "Primary 1 Blue"
    pub name: String,
    /// Grade taught
    pub grade: Grade,
    /// Teacher document id, not validated
    pub class_teacher_id: Option<String>,
    /// Denormalized teacher name, may be stale
    pub class_teacher_name: Option<String>,
    /// Room the class meets in
    pub room_number: Option<String>,
    /// Seats available
    pub capacity: i32,
    /// Students currently assigned, best-effort
    pub current_students: i32,
    /// Subjects taught in this class
    pub subjects: StringList,
    /// Free-form timetable
    pub schedule: Option<String>,
    /// Year label, e.g. "2025"
    pub academic_year: String,
    /// Term this class runs in
    pub term: Term,
    /// Lifecycle state
    pub status: ClassStatus,
    /// Free-form notes
    pub notes: Option<String>,
    /// Account id of the creator
    pub created_by: String,
    /// When the class was created
    pub created_at: DateTimeUtc,
    /// When the class was last written
    pub updated_at: DateTimeUtc,
}

/// Classes have no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
