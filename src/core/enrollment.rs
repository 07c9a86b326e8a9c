//! Class enrollment counters.
//!
//! `classes.current_students` is a denormalized count. The store has no
//! multi-document transactions, so student mutations are the operation of record
//! and the counter adjustment that follows is a separate read-then-write step.
//! When that step fails it is logged and dropped; the student write is not undone
//! and the counter is left to drift.
//!
//! Two writers adjusting the same class at once can both read the same value and
//! one adjustment is lost. Nothing here retries or reconciles automatically;
//! [`recount_class_students`] exists for an operator to repair a drifted count.

use crate::{
    entities::{SchoolClass, Student, class, student},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, Set, prelude::*};
use tracing::{debug, error, instrument};

/// A change to a student's class assignment, as seen by the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMove<'a> {
    /// Assignment unchanged
    Unchanged,
    /// Student moved between classes; either side may be absent
    Moved {
        /// Class the student left
        from: Option<&'a str>,
        /// Class the student joined
        to: Option<&'a str>,
    },
}

impl<'a> ClassMove<'a> {
    /// Compares the previous and new assignment. Empty ids count as no class.
    #[must_use]
    pub fn between(previous: Option<&'a str>, next: Option<&'a str>) -> Self {
        let previous = previous.filter(|id| !id.is_empty());
        let next = next.filter(|id| !id.is_empty());
        if previous == next {
            Self::Unchanged
        } else {
            Self::Moved {
                from: previous,
                to: next,
            }
        }
    }
}

/// Reads a class, adds `delta` to its counter (never below zero) and writes it back.
///
/// Returns the stored count. Not atomic: a concurrent adjustment between the read
/// and the write is overwritten.
#[instrument(skip(db))]
pub async fn adjust_class_student_count<C>(db: &C, class_id: &str, delta: i32) -> Result<i32>
where
    C: ConnectionTrait,
{
    let class = SchoolClass::find_by_id(class_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ClassNotFound {
            id: class_id.to_string(),
        })?;

    let next = class.current_students.saturating_add(delta).max(0);
    let mut active: class::ActiveModel = class.into();
    active.current_students = Set(next);
    active.updated_at = Set(Utc::now());
    active.update(db).await?;

    debug!("Class {class_id} now has {next} students");
    Ok(next)
}

/// Overwrites a class's counter with an explicit value.
pub async fn set_class_student_count<C>(db: &C, class_id: &str, count: i32) -> Result<class::Model>
where
    C: ConnectionTrait,
{
    if count < 0 {
        return Err(Error::Validation {
            message: format!("Student count cannot be negative: {count}"),
        });
    }

    let class = SchoolClass::find_by_id(class_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ClassNotFound {
            id: class_id.to_string(),
        })?;

    let mut active: class::ActiveModel = class.into();
    active.current_students = Set(count);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Counts the student documents that reference a class.
pub async fn count_students_in_class<C>(db: &C, class_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::ClassId.eq(class_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Replaces a class's counter with the true number of referencing students.
///
/// Only runs when called; student mutations never trigger it.
pub async fn recount_class_students<C>(db: &C, class_id: &str) -> Result<class::Model>
where
    C: ConnectionTrait,
{
    let actual = count_students_in_class(db, class_id).await?;
    let count = i32::try_from(actual).map_err(|_| Error::Validation {
        message: format!("Class {class_id} has too many students to count: {actual}"),
    })?;
    set_class_student_count(db, class_id, count).await
}

/// Best-effort adjustment: failures are logged and swallowed.
///
/// Returns the new count when the adjustment was stored.
pub async fn try_adjust_class_student_count<C>(db: &C, class_id: &str, delta: i32) -> Option<i32>
where
    C: ConnectionTrait,
{
    match adjust_class_student_count(db, class_id, delta).await {
        Ok(count) => Some(count),
        Err(e) => {
            error!("Error adjusting student count of class {class_id} by {delta}: {e}");
            None
        }
    }
}

/// Counter side effect of creating a student placed in `class_id`.
pub async fn on_student_created<C>(db: &C, class_id: Option<&str>)
where
    C: ConnectionTrait,
{
    if let Some(class_id) = class_id.filter(|id| !id.is_empty()) {
        try_adjust_class_student_count(db, class_id, 1).await;
    }
}

/// Counter side effect of a student's class assignment changing.
///
/// The two sides are adjusted independently; if one fails the other still applies.
pub async fn on_student_moved<C>(db: &C, class_move: &ClassMove<'_>)
where
    C: ConnectionTrait,
{
    let ClassMove::Moved { from, to } = class_move else {
        return;
    };

    if let Some(old_class) = from {
        try_adjust_class_student_count(db, old_class, -1).await;
    }
    if let Some(new_class) = to {
        try_adjust_class_student_count(db, new_class, 1).await;
    }
}

/// Counter side effect of deleting a student who was placed in `class_id`.
pub async fn on_student_deleted<C>(db: &C, class_id: Option<&str>)
where
    C: ConnectionTrait,
{
    if let Some(class_id) = class_id.filter(|id| !id.is_empty()) {
        try_adjust_class_student_count(db, class_id, -1).await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::class::get_class;
    use crate::core::student::{StudentUpdate, create_student, delete_student, update_student};
    use crate::entities::Grade;
    use crate::test_utils::*;

    async fn count_of(db: &DatabaseConnection, class_id: &str) -> Result<i32> {
        Ok(get_class(db, class_id).await?.current_students)
    }

    #[test]
    fn test_class_move_between() {
        assert_eq!(ClassMove::between(Some("a"), Some("a")), ClassMove::Unchanged);
        assert_eq!(ClassMove::between(None, None), ClassMove::Unchanged);
        assert_eq!(ClassMove::between(Some(""), None), ClassMove::Unchanged);
        assert_eq!(
            ClassMove::between(Some("a"), Some("b")),
            ClassMove::Moved {
                from: Some("a"),
                to: Some("b")
            }
        );
        assert_eq!(
            ClassMove::between(None, Some("b")),
            ClassMove::Moved {
                from: None,
                to: Some("b")
            }
        );
    }

    #[tokio::test]
    async fn test_counter_follows_student_lifecycle() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let p1_a = create_test_class(&db, &session, "P1-A", 30).await?;
        let p1_b = create_test_class(&db, &session, "P1-B", 30).await?;
        assert_eq!(p1_a.current_students, 0);
        assert_eq!(p1_a.capacity, 30);

        let x = create_test_student(&db, &session, Grade::P1, Some(&p1_a.id)).await?;
        assert_eq!(count_of(&db, &p1_a.id).await?, 1);

        let update = StudentUpdate {
            class_id: Some(Some(p1_b.id.clone())),
            class_name: Some(Some(p1_b.name.clone())),
            ..Default::default()
        };
        update_student(&db, &x.id, update).await?;
        assert_eq!(count_of(&db, &p1_a.id).await?, 0);
        assert_eq!(count_of(&db, &p1_b.id).await?, 1);

        delete_student(&db, &x.id).await?;
        assert_eq!(count_of(&db, &p1_b.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_counter_matches_created_and_deleted_students() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let class = create_test_class(&db, &session, "P3 Green", 40).await?;

        let mut ids = Vec::new();
        for _ in 0..7 {
            let student = create_test_student(&db, &session, Grade::P3, Some(&class.id)).await?;
            ids.push(student.id);
        }
        assert_eq!(count_of(&db, &class.id).await?, 7);
        assert_eq!(count_students_in_class(&db, &class.id).await?, 7);

        for id in &ids {
            delete_student(&db, id).await?;
        }
        assert_eq!(count_of(&db, &class.id).await?, 0);

        // Redundant decrements stay at zero
        try_adjust_class_student_count(&db, &class.id, -1).await;
        on_student_deleted(&db, Some(&class.id)).await;
        assert_eq!(count_of(&db, &class.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_move_preserves_total_across_classes() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let blue = create_test_class(&db, &session, "P2 Blue", 30).await?;
        let red = create_test_class(&db, &session, "P2 Red", 30).await?;

        let a = create_test_student(&db, &session, Grade::P2, Some(&blue.id)).await?;
        create_test_student(&db, &session, Grade::P2, Some(&blue.id)).await?;
        create_test_student(&db, &session, Grade::P2, Some(&red.id)).await?;

        let before = count_of(&db, &blue.id).await? + count_of(&db, &red.id).await?;
        let update = StudentUpdate {
            class_id: Some(Some(red.id.clone())),
            ..Default::default()
        };
        update_student(&db, &a.id, update).await?;

        assert_eq!(count_of(&db, &blue.id).await?, 1);
        assert_eq!(count_of(&db, &red.id).await?, 2);
        let after = count_of(&db, &blue.id).await? + count_of(&db, &red.id).await?;
        assert_eq!(before, after);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_without_class_change_leaves_counter() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let class = create_test_class(&db, &session, "P4 Gold", 25).await?;
        let student = create_test_student(&db, &session, Grade::P4, Some(&class.id)).await?;

        let update = StudentUpdate {
            first_name: Some("Renamed".to_string()),
            ..Default::default()
        };
        update_student(&db, &student.id, update).await?;
        let same_class = StudentUpdate {
            class_id: Some(Some(class.id.clone())),
            ..Default::default()
        };
        update_student(&db, &student.id, same_class).await?;

        assert_eq!(count_of(&db, &class.id).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_class_does_not_block_student_writes() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let class = create_test_class(&db, &session, "P5 Silver", 30).await?;

        // Creation against a class that does not exist still succeeds
        let orphan = create_student(&db, &session, test_new_student(Grade::P5, Some("no-such-class")))
            .await?;
        assert_eq!(orphan.class_id.as_deref(), Some("no-such-class"));

        // A move out of the missing class still increments the real one
        let update = StudentUpdate {
            class_id: Some(Some(class.id.clone())),
            ..Default::default()
        };
        update_student(&db, &orphan.id, update).await?;
        assert_eq!(count_of(&db, &class.id).await?, 1);

        // Deleting a student of a since-deleted class still deletes the student
        crate::core::class::delete_class(&db, &class.id).await?;
        delete_student(&db, &orphan.id).await?;
        assert!(crate::core::student::get_student(&db, &orphan.id).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_unassigning_decrements_old_class() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let class = create_test_class(&db, &session, "P6 Amber", 30).await?;
        let student = create_test_student(&db, &session, Grade::P6, Some(&class.id)).await?;

        let update = StudentUpdate {
            class_id: Some(None),
            class_name: Some(None),
            ..Default::default()
        };
        let updated = update_student(&db, &student.id, update).await?;
        assert!(updated.class_id.is_none());
        assert_eq!(count_of(&db, &class.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_recount_repairs_drift() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let class = create_test_class(&db, &session, "P7 Violet", 30).await?;
        create_test_student(&db, &session, Grade::P7, Some(&class.id)).await?;
        create_test_student(&db, &session, Grade::P7, Some(&class.id)).await?;

        set_class_student_count(&db, &class.id, 9).await?;
        assert_eq!(count_of(&db, &class.id).await?, 9);

        let repaired = recount_class_students(&db, &class.id).await?;
        assert_eq!(repaired.current_students, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_count_rejects_negative_and_missing() -> Result<()> {
        let db = setup_test_db().await?;
        let session = create_test_session(&db).await?;
        let class = create_test_class(&db, &session, "P1 Teal", 30).await?;

        assert!(matches!(
            set_class_student_count(&db, &class.id, -3).await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            adjust_class_student_count(&db, "missing", 1).await,
            Err(Error::ClassNotFound { .. })
        ));
        Ok(())
    }
}
