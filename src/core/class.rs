//! Class business logic - Handles all class-related operations.
//!
//! `class_teacher_name` is whatever the caller supplied alongside
//! `class_teacher_id`; it is not refreshed when the teacher record changes.
//! `current_students` is only ever changed through [`crate::core::enrollment`].

use crate::{
    core::{auth::Session, new_document_id, require_text},
    entities::{
        Grade, SchoolClass, StringList,
        class::{self, ClassStatus, Term},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{info, instrument};

/// How many classes [`get_classes`] returns at most
pub const CLASS_LIST_LIMIT: u64 = 100;

/// Fields supplied when opening a class
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct NewClass {
    pub name: String,
    pub grade: Grade,
    pub class_teacher_id: Option<String>,
    pub class_teacher_name: Option<String>,
    pub room_number: Option<String>,
    pub capacity: i32,
    pub subjects: Vec<String>,
    pub schedule: Option<String>,
    pub academic_year: String,
    pub term: Term,
    pub notes: Option<String>,
}

/// A partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct ClassUpdate {
    pub name: Option<String>,
    pub grade: Option<Grade>,
    pub class_teacher_id: Option<Option<String>>,
    pub class_teacher_name: Option<Option<String>>,
    pub room_number: Option<Option<String>>,
    pub capacity: Option<i32>,
    pub subjects: Option<Vec<String>>,
    pub schedule: Option<Option<String>>,
    pub academic_year: Option<String>,
    pub term: Option<Term>,
    pub status: Option<ClassStatus>,
    pub notes: Option<Option<String>>,
}

fn validate_capacity(capacity: i32) -> Result<()> {
    if capacity < 1 {
        return Err(Error::Validation {
            message: format!("Class capacity must be at least 1, got {capacity}"),
        });
    }
    Ok(())
}

/// Opens a class with an empty roster.
#[instrument(skip(db, session, data), fields(name = %data.name))]
pub async fn create_class<C>(db: &C, session: &Session, data: NewClass) -> Result<class::Model>
where
    C: ConnectionTrait,
{
    require_text("class name", &data.name)?;
    require_text("academic year", &data.academic_year)?;
    validate_capacity(data.capacity)?;

    let id = new_document_id();
    let now = Utc::now();
    let class = class::ActiveModel {
        id: Set(id.clone()),
        class_id: Set(id),
        name: Set(data.name.trim().to_string()),
        grade: Set(data.grade),
        class_teacher_id: Set(data.class_teacher_id),
        class_teacher_name: Set(data.class_teacher_name),
        room_number: Set(data.room_number),
        capacity: Set(data.capacity),
        current_students: Set(0),
        subjects: Set(StringList(data.subjects)),
        schedule: Set(data.schedule),
        academic_year: Set(data.academic_year),
        term: Set(data.term),
        status: Set(ClassStatus::Active),
        notes: Set(data.notes),
        created_by: Set(session.account_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let class = class.insert(db).await?;
    info!("Created class {} ({})", class.name, class.id);
    Ok(class)
}

/// Retrieves classes ordered by grade.
pub async fn get_classes<C>(db: &C) -> Result<Vec<class::Model>>
where
    C: ConnectionTrait,
{
    SchoolClass::find()
        .order_by_asc(class::Column::Grade)
        .order_by_asc(class::Column::Name)
        .limit(CLASS_LIST_LIMIT)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one class by document id.
pub async fn get_class<C>(db: &C, id: &str) -> Result<class::Model>
where
    C: ConnectionTrait,
{
    SchoolClass::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ClassNotFound { id: id.to_string() })
}

/// Classes of one grade, by name.
pub async fn get_classes_by_grade<C>(db: &C, grade: Grade) -> Result<Vec<class::Model>>
where
    C: ConnectionTrait,
{
    SchoolClass::find()
        .filter(class::Column::Grade.eq(grade))
        .order_by_asc(class::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Classes whose class teacher is `teacher_id`.
pub async fn get_classes_by_teacher<C>(db: &C, teacher_id: &str) -> Result<Vec<class::Model>>
where
    C: ConnectionTrait,
{
    SchoolClass::find()
        .filter(class::Column::ClassTeacherId.eq(teacher_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update. The student counter is not part of it.
#[instrument(skip(db, changes))]
pub async fn update_class<C>(db: &C, id: &str, changes: ClassUpdate) -> Result<class::Model>
where
    C: ConnectionTrait,
{
    let current = get_class(db, id).await?;
    let mut active: class::ActiveModel = current.into();

    if let Some(name) = changes.name {
        require_text("class name", &name)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(grade) = changes.grade {
        active.grade = Set(grade);
    }
    if let Some(class_teacher_id) = changes.class_teacher_id {
        active.class_teacher_id = Set(class_teacher_id);
    }
    if let Some(class_teacher_name) = changes.class_teacher_name {
        active.class_teacher_name = Set(class_teacher_name);
    }
    if let Some(room_number) = changes.room_number {
        active.room_number = Set(room_number);
    }
    if let Some(capacity) = changes.capacity {
        validate_capacity(capacity)?;
        active.capacity = Set(capacity);
    }
    if let Some(subjects) = changes.subjects {
        active.subjects = Set(StringList(subjects));
    }
    if let Some(schedule) = changes.schedule {
        active.schedule = Set(schedule);
    }
    if let Some(academic_year) = changes.academic_year {
        require_text("academic year", &academic_year)?;
        active.academic_year = Set(academic_year);
    }
    if let Some(term) = changes.term {
        active.term = Set(term);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    if let Some(notes) = changes.notes {
        active.notes = Set(notes);
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Deletes a class.
///
/// Students placed in it keep their `class_id`; there is no cascade and no guard.
#[instrument(skip(db))]
pub async fn delete_class<C>(db: &C, id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = SchoolClass::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ClassNotFound { id: id.to_string() });
    }
    info!("Deleted class {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_class_starts_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;

        let class = create_test_class(&db, &session, "P1-A", 30).await?;
        assert_eq!(class.current_students, 0);
        assert_eq!(class.status, ClassStatus::Active);
        assert_eq!(class.class_id, class.id);
        assert_eq!(class.created_by, session.account_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_class_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;

        let mut data = test_new_class("P2 Blue", 0);
        assert!(matches!(
            create_class(&db, &session, data.clone()).await,
            Err(Error::Validation { .. })
        ));
        data.capacity = 20;
        data.name = " ".to_string();
        assert!(matches!(
            create_class(&db, &session, data).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_class_queries() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let teacher = create_test_teacher(&db, &session, "Amina").await?;

        let mut p3 = test_new_class("P3 Green", 35);
        p3.grade = Grade::P3;
        p3.class_teacher_id = Some(teacher.id.clone());
        p3.class_teacher_name = Some("Amina Test".to_string());
        create_class(&db, &session, p3).await?;
        create_test_class(&db, &session, "P1 Red", 30).await?;
        create_test_class(&db, &session, "P1 Blue", 30).await?;

        let all = get_classes(&db).await?;
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["P1 Blue", "P1 Red", "P3 Green"]);

        let p1 = get_classes_by_grade(&db, Grade::P1).await?;
        assert_eq!(p1.len(), 2);

        let taught = get_classes_by_teacher(&db, &teacher.id).await?;
        assert_eq!(taught.len(), 1);
        assert_eq!(taught[0].class_teacher_name.as_deref(), Some("Amina Test"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_class_leaves_counter() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let class = create_test_class(&db, &session, "P4 Gold", 30).await?;
        create_test_student(&db, &session, Grade::P4, Some(&class.id)).await?;

        let changes = ClassUpdate {
            capacity: Some(45),
            term: Some(Term::Term2),
            room_number: Some(Some("B12".to_string())),
            ..Default::default()
        };
        let updated = update_class(&db, &class.id, changes).await?;
        assert_eq!(updated.capacity, 45);
        assert_eq!(updated.term, Term::Term2);
        assert_eq!(updated.current_students, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_class_leaves_students() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let class = create_test_class(&db, &session, "P5 Silver", 30).await?;
        let student = create_test_student(&db, &session, Grade::P5, Some(&class.id)).await?;

        delete_class(&db, &class.id).await?;
        assert!(matches!(
            get_class(&db, &class.id).await,
            Err(Error::ClassNotFound { .. })
        ));

        let dangling = crate::core::student::get_student(&db, &student.id).await?;
        assert_eq!(dangling.class_id.as_deref(), Some(class.id.as_str()));
        Ok(())
    }
}
