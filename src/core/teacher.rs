//! Teacher business logic - Handles all teacher-related operations.
//!
//! The emergency contact is stored as a serialized JSON blob in a single text
//! column; [`parse_emergency_contact`] reads it back.

use crate::{
    core::{auth::Session, identifiers, new_document_id, require_text},
    entities::{
        Gender, StringList, Teacher,
        teacher::{self, EmploymentType, TeacherStatus},
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// How many teachers [`get_teachers`] returns at most
pub const TEACHER_LIST_LIMIT: u64 = 100;

/// Who to call when something happens to the teacher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Contact name
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Relationship to the teacher
    pub relationship: String,
}

/// Fields supplied when hiring a teacher
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct NewTeacher {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub date_of_joining: NaiveDate,
    pub qualification: String,
    pub specialization: String,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub employment_type: EmploymentType,
    pub salary: Option<f64>,
    pub bank_details: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub notes: Option<String>,
}

/// A partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct TeacherUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub date_of_joining: Option<NaiveDate>,
    pub qualification: Option<String>,
    pub specialization: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub classes: Option<Vec<String>>,
    pub employment_type: Option<EmploymentType>,
    pub status: Option<TeacherStatus>,
    pub salary: Option<Option<f64>>,
    pub bank_details: Option<Option<String>>,
    pub emergency_contact: Option<EmergencyContact>,
    pub notes: Option<Option<String>>,
}

fn serialize_contact(contact: Option<&EmergencyContact>) -> Result<Option<String>> {
    contact
        .map(serde_json::to_string)
        .transpose()
        .map_err(Into::into)
}

/// Decodes a teacher's stored emergency contact blob.
pub fn parse_emergency_contact(teacher: &teacher::Model) -> Result<Option<EmergencyContact>> {
    teacher
        .emergency_contact
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(Into::into)
}

fn validate_salary(salary: Option<f64>) -> Result<()> {
    match salary {
        Some(amount) if !amount.is_finite() || amount < 0.0 => Err(Error::Validation {
            message: format!("Salary must be a non-negative amount, got {amount}"),
        }),
        _ => Ok(()),
    }
}

/// Hires a teacher: generates the employee number and writes the record as `active`.
#[instrument(skip(db, session, data))]
pub async fn create_teacher<C>(db: &C, session: &Session, data: NewTeacher) -> Result<teacher::Model>
where
    C: ConnectionTrait,
{
    require_text("first name", &data.first_name)?;
    require_text("last name", &data.last_name)?;
    require_text("email", &data.email)?;
    require_text("phone", &data.phone)?;
    validate_salary(data.salary)?;

    let employee_number = identifiers::generate_employee_number(db).await;
    let emergency_contact = serialize_contact(data.emergency_contact.as_ref())?;
    let id = new_document_id();
    let now = Utc::now();

    let teacher = teacher::ActiveModel {
        id: Set(id.clone()),
        teacher_id: Set(id),
        employee_number: Set(employee_number),
        first_name: Set(data.first_name.trim().to_string()),
        last_name: Set(data.last_name.trim().to_string()),
        email: Set(data.email.trim().to_string()),
        phone: Set(data.phone),
        date_of_birth: Set(data.date_of_birth),
        gender: Set(data.gender),
        address: Set(data.address),
        avatar: Set(data.avatar),
        date_of_joining: Set(data.date_of_joining),
        qualification: Set(data.qualification),
        specialization: Set(data.specialization),
        subjects: Set(StringList(data.subjects)),
        classes: Set(StringList(data.classes)),
        employment_type: Set(data.employment_type),
        status: Set(TeacherStatus::Active),
        salary: Set(data.salary),
        bank_details: Set(data.bank_details),
        emergency_contact: Set(emergency_contact),
        notes: Set(data.notes),
        created_by: Set(session.account_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let teacher = teacher.insert(db).await?;
    info!(
        "Created teacher {} ({})",
        teacher.employee_number, teacher.id
    );
    Ok(teacher)
}

/// Retrieves the most recently hired teachers, newest first.
pub async fn get_teachers<C>(db: &C) -> Result<Vec<teacher::Model>>
where
    C: ConnectionTrait,
{
    Teacher::find()
        .order_by_desc(teacher::Column::CreatedAt)
        .limit(TEACHER_LIST_LIMIT)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one teacher by document id.
pub async fn get_teacher<C>(db: &C, id: &str) -> Result<teacher::Model>
where
    C: ConnectionTrait,
{
    Teacher::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::TeacherNotFound { id: id.to_string() })
}

/// Applies a partial update. The employee number is never touched.
#[instrument(skip(db, changes))]
pub async fn update_teacher<C>(db: &C, id: &str, changes: TeacherUpdate) -> Result<teacher::Model>
where
    C: ConnectionTrait,
{
    let current = get_teacher(db, id).await?;
    let mut active: teacher::ActiveModel = current.into();

    if let Some(first_name) = changes.first_name {
        require_text("first name", &first_name)?;
        active.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = changes.last_name {
        require_text("last name", &last_name)?;
        active.last_name = Set(last_name.trim().to_string());
    }
    if let Some(email) = changes.email {
        require_text("email", &email)?;
        active.email = Set(email.trim().to_string());
    }
    if let Some(phone) = changes.phone {
        active.phone = Set(phone);
    }
    if let Some(date_of_birth) = changes.date_of_birth {
        active.date_of_birth = Set(date_of_birth);
    }
    if let Some(gender) = changes.gender {
        active.gender = Set(gender);
    }
    if let Some(address) = changes.address {
        active.address = Set(address);
    }
    if let Some(avatar) = changes.avatar {
        active.avatar = Set(avatar);
    }
    if let Some(date_of_joining) = changes.date_of_joining {
        active.date_of_joining = Set(date_of_joining);
    }
    if let Some(qualification) = changes.qualification {
        active.qualification = Set(qualification);
    }
    if let Some(specialization) = changes.specialization {
        active.specialization = Set(specialization);
    }
    if let Some(subjects) = changes.subjects {
        active.subjects = Set(StringList(subjects));
    }
    if let Some(classes) = changes.classes {
        active.classes = Set(StringList(classes));
    }
    if let Some(employment_type) = changes.employment_type {
        active.employment_type = Set(employment_type);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    if let Some(salary) = changes.salary {
        validate_salary(salary)?;
        active.salary = Set(salary);
    }
    if let Some(bank_details) = changes.bank_details {
        active.bank_details = Set(bank_details);
    }
    if let Some(contact) = changes.emergency_contact {
        active.emergency_contact = Set(serialize_contact(Some(&contact))?);
    }
    if let Some(notes) = changes.notes {
        active.notes = Set(notes);
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Deletes a teacher.
///
/// Classes naming this teacher keep their `class_teacher_id`; nothing checks or
/// clears the reference.
#[instrument(skip(db))]
pub async fn delete_teacher<C>(db: &C, id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Teacher::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::TeacherNotFound { id: id.to_string() });
    }
    info!("Deleted teacher {id}");
    Ok(())
}
