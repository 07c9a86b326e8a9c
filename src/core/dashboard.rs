//! Dashboard figures.
//!
//! Enrollment figures are read from the denormalized class counters, so they show
//! whatever drift those counters carry.

use crate::{
    entities::{
        SchoolClass, Student, Teacher, class, student::{self, StudentStatus},
        teacher::{self, TeacherStatus},
    },
    errors::Result,
};
use sea_orm::{PaginatorTrait, QueryOrder, prelude::*};

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Students with status `active`
    pub active_students: u64,
    /// Teachers with status `active`
    pub active_teachers: u64,
    /// Classes with status `active`
    pub active_classes: u64,
    /// Seats across active classes
    pub total_capacity: i64,
    /// Sum of active classes' `current_students`
    pub enrolled: i64,
    /// `enrolled` as a percentage of `total_capacity`
    pub fill_percent: f64,
}

/// How full one class is
#[derive(Debug, Clone, PartialEq)]
pub struct ClassOccupancy {
    /// The class
    pub class: class::Model,
    /// Seats left, never negative
    pub seats_left: i32,
    /// Fill as a percentage of capacity
    pub fill_percent: f64,
}

/// Percentage of `capacity` taken by `occupied`; 0 when there is no capacity.
#[must_use]
pub fn calculate_fill(occupied: i64, capacity: i64) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let percent = (occupied as f64 / capacity as f64) * 100.0;
    percent
}

/// Computes the headline numbers.
pub async fn dashboard_summary<C>(db: &C) -> Result<DashboardSummary>
where
    C: ConnectionTrait,
{
    let active_students = Student::find()
        .filter(student::Column::Status.eq(StudentStatus::Active))
        .count(db)
        .await?;
    let active_teachers = Teacher::find()
        .filter(teacher::Column::Status.eq(TeacherStatus::Active))
        .count(db)
        .await?;

    let classes = SchoolClass::find()
        .filter(class::Column::Status.eq(class::ClassStatus::Active))
        .all(db)
        .await?;
    let total_capacity: i64 = classes.iter().map(|c| i64::from(c.capacity)).sum();
    let enrolled: i64 = classes.iter().map(|c| i64::from(c.current_students)).sum();

    Ok(DashboardSummary {
        active_students,
        active_teachers,
        active_classes: classes.len() as u64,
        total_capacity,
        enrolled,
        fill_percent: calculate_fill(enrolled, total_capacity),
    })
}

/// Occupancy of every active class, fullest first.
pub async fn class_occupancy<C>(db: &C) -> Result<Vec<ClassOccupancy>>
where
    C: ConnectionTrait,
{
    let classes = SchoolClass::find()
        .filter(class::Column::Status.eq(class::ClassStatus::Active))
        .order_by_asc(class::Column::Grade)
        .all(db)
        .await?;

    let mut occupancy: Vec<ClassOccupancy> = classes
        .into_iter()
        .map(|class| ClassOccupancy {
            seats_left: (class.capacity - class.current_students).max(0),
            fill_percent: calculate_fill(
                i64::from(class.current_students),
                i64::from(class.capacity),
            ),
            class,
        })
        .collect();
    occupancy.sort_by(|a, b| b.fill_percent.total_cmp(&a.fill_percent));
    Ok(occupancy)
}
