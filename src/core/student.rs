//! Student business logic - Handles all student-related operations.
//!
//! Every write to a student that touches its class placement is followed by a
//! best-effort counter adjustment on the affected class(es), see
//! [`crate::core::enrollment`]. The student write is the operation of record: its
//! errors propagate, counter errors do not.

use crate::{
    core::{
        auth::Session,
        enrollment::{self, ClassMove},
        identifiers, new_document_id, require_text,
    },
    entities::{Gender, Grade, Student, student},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

pub use crate::entities::student::StudentStatus;

/// Fields supplied when admitting a student
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub grade: Grade,
    pub avatar: Option<String>,
    pub class_id: Option<String>,
    pub class_name: Option<String>,
    pub parent_name: String,
    pub parent_email: Option<String>,
    pub parent_phone: String,
    pub address: Option<String>,
    pub medical_info: Option<String>,
}

/// A partial update. `None` leaves a field untouched.
///
/// Optional fields are doubly wrapped: `Some(None)` clears the value, so
/// `class_id: Some(None)` removes the student from their class.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct StudentUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub grade: Option<Grade>,
    pub avatar: Option<Option<String>>,
    pub class_id: Option<Option<String>>,
    pub class_name: Option<Option<String>>,
    pub parent_name: Option<String>,
    pub parent_email: Option<Option<String>>,
    pub parent_phone: Option<String>,
    pub address: Option<Option<String>>,
    pub medical_info: Option<Option<String>>,
    pub status: Option<StudentStatus>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Admits a new student.
///
/// Assigns a fresh document id and `student_id`, generates the admission number,
/// writes the record as `active`, then increments the class counter if a class was
/// given. A failed counter increment is logged and the student is still returned.
#[instrument(skip(db, session, data), fields(grade = %data.grade))]
pub async fn create_student<C>(db: &C, session: &Session, data: NewStudent) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    require_text("first name", &data.first_name)?;
    require_text("last name", &data.last_name)?;
    require_text("parent name", &data.parent_name)?;
    require_text("parent phone", &data.parent_phone)?;

    let admission_number = identifiers::generate_admission_number(db, data.grade).await;
    let class_id = non_empty(data.class_id);
    let now = Utc::now();

    let student = student::ActiveModel {
        id: Set(new_document_id()),
        student_id: Set(new_document_id()),
        admission_number: Set(admission_number),
        first_name: Set(data.first_name.trim().to_string()),
        last_name: Set(data.last_name.trim().to_string()),
        date_of_birth: Set(data.date_of_birth),
        gender: Set(data.gender),
        grade: Set(data.grade),
        avatar: Set(non_empty(data.avatar)),
        class_id: Set(class_id.clone()),
        class_name: Set(non_empty(data.class_name)),
        parent_name: Set(data.parent_name),
        parent_email: Set(non_empty(data.parent_email)),
        parent_phone: Set(data.parent_phone),
        parent_user_id: Set(None),
        address: Set(non_empty(data.address)),
        medical_info: Set(non_empty(data.medical_info)),
        enrollment_date: Set(now),
        status: Set(StudentStatus::Active),
        created_by: Set(session.account_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let student = student.insert(db).await?;
    info!(
        "Created student {} ({})",
        student.admission_number, student.id
    );

    enrollment::on_student_created(db, class_id.as_deref()).await;
    Ok(student)
}

/// Retrieves every student, most recently admitted first.
pub async fn get_students<C>(db: &C) -> Result<Vec<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .order_by_desc(student::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one student by document id.
pub async fn get_student<C>(db: &C, id: &str) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    Student::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::StudentNotFound { id: id.to_string() })
}

/// Students placed in a class, by last name.
pub async fn get_students_in_class<C>(db: &C, class_id: &str) -> Result<Vec<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::ClassId.eq(class_id))
        .order_by_asc(student::Column::LastName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update.
///
/// The admission number is never touched. If the class assignment changed, the old
/// class is decremented and the new one incremented after the student is written;
/// each adjustment may fail on its own without undoing the other.
#[instrument(skip(db, changes))]
pub async fn update_student<C>(db: &C, id: &str, changes: StudentUpdate) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    let current = get_student(db, id).await?;
    let previous_class = current.class_id.clone();
    let mut active: student::ActiveModel = current.into();

    if let Some(first_name) = changes.first_name {
        require_text("first name", &first_name)?;
        active.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = changes.last_name {
        require_text("last name", &last_name)?;
        active.last_name = Set(last_name.trim().to_string());
    }
    if let Some(date_of_birth) = changes.date_of_birth {
        active.date_of_birth = Set(date_of_birth);
    }
    if let Some(gender) = changes.gender {
        active.gender = Set(gender);
    }
    if let Some(grade) = changes.grade {
        active.grade = Set(grade);
    }
    if let Some(avatar) = changes.avatar {
        active.avatar = Set(non_empty(avatar));
    }
    if let Some(class_id) = changes.class_id {
        active.class_id = Set(non_empty(class_id));
    }
    if let Some(class_name) = changes.class_name {
        active.class_name = Set(non_empty(class_name));
    }
    if let Some(parent_name) = changes.parent_name {
        require_text("parent name", &parent_name)?;
        active.parent_name = Set(parent_name);
    }
    if let Some(parent_email) = changes.parent_email {
        active.parent_email = Set(non_empty(parent_email));
    }
    if let Some(parent_phone) = changes.parent_phone {
        require_text("parent phone", &parent_phone)?;
        active.parent_phone = Set(parent_phone);
    }
    if let Some(address) = changes.address {
        active.address = Set(non_empty(address));
    }
    if let Some(medical_info) = changes.medical_info {
        active.medical_info = Set(non_empty(medical_info));
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;

    let class_move = ClassMove::between(previous_class.as_deref(), updated.class_id.as_deref());
    enrollment::on_student_moved(db, &class_move).await;

    Ok(updated)
}

/// Deletes a student, then decrements the class they were placed in.
///
/// The class is read from the student before deletion. A failed decrement is logged
/// and the deletion stands.
#[instrument(skip(db))]
pub async fn delete_student<C>(db: &C, id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let student = get_student(db, id).await?;

    Student::delete_by_id(id).exec(db).await?;
    info!("Deleted student {}", student.admission_number);

    enrollment::on_student_deleted(db, student.class_id.as_deref()).await;
    Ok(())
}
