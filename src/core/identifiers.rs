//! Human-readable sequential identifiers.
//!
//! Students get admission numbers `HS-{year}-{grade}-{seq}` and teachers get
//! employee numbers `TS-{year}-{seq}`, with `seq` zero-padded to three digits.
//!
//! The two schemes pick the next sequence differently. Admission numbers scan every
//! matching student and take the true maximum, so gaps left by deletions are never
//! reused. Employee numbers only look at the most recently created teacher, so a
//! deleted or out-of-order record can make the sequence restart or repeat.
//!
//! Neither scheme is safe under concurrent writers: two creations that read the same
//! state produce the same identifier. When the store cannot be read the generators
//! fall back to a timestamp-derived suffix instead of failing the creation.

use crate::{
    entities::{Grade, Student, Teacher, student, teacher},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Utc};
use sea_orm::{QueryOrder, prelude::*};
use tracing::{debug, error, warn};

/// Prefix of every student admission number
pub const ADMISSION_PREFIX: &str = "HS";

/// Prefix of every teacher employee number
pub const EMPLOYEE_PREFIX: &str = "TS";

const ADMISSION_FALLBACK_DIGITS: usize = 6;
const EMPLOYEE_FALLBACK_DIGITS: usize = 3;

/// The part of an admission number shared by every student of `grade` admitted in
/// `year`, trailing dash included.
#[must_use]
pub fn admission_prefix(year: i32, grade: Grade) -> String {
    format!("{ADMISSION_PREFIX}-{year}-{grade}-")
}

/// Formats a complete admission number.
#[must_use]
pub fn format_admission_number(year: i32, grade: Grade, sequence: u32) -> String {
    format!("{}{sequence:03}", admission_prefix(year, grade))
}

/// Formats a complete employee number.
#[must_use]
pub fn format_employee_number(year: i32, sequence: u32) -> String {
    format!("{EMPLOYEE_PREFIX}-{year}-{sequence:03}")
}

/// Last `digits` decimal digits of a millisecond timestamp.
#[must_use]
pub fn timestamp_suffix(timestamp_millis: i64, digits: usize) -> String {
    let text = timestamp_millis.unsigned_abs().to_string();
    let start = text.len().saturating_sub(digits);
    text[start..].to_string()
}

/// Admission number used when the student scan fails.
#[must_use]
pub fn fallback_admission_number(year: i32, grade: Grade, timestamp_millis: i64) -> String {
    format!(
        "{}{}",
        admission_prefix(year, grade),
        timestamp_suffix(timestamp_millis, ADMISSION_FALLBACK_DIGITS)
    )
}

/// Employee number used when the teacher lookup fails.
#[must_use]
pub fn fallback_employee_number(year: i32, timestamp_millis: i64) -> String {
    format!(
        "{EMPLOYEE_PREFIX}-{year}-{}",
        timestamp_suffix(timestamp_millis, EMPLOYEE_FALLBACK_DIGITS)
    )
}

/// Picks the next admission sequence for (`year`, `grade`) from existing numbers.
///
/// Numbers outside the (`year`, `grade`) prefix are ignored, as are matching numbers
/// whose suffix is not numeric. Returns the highest suffix plus one, or 1 if none
/// match.
pub fn next_admission_sequence<'a, I>(existing: I, year: i32, grade: Grade) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = admission_prefix(year, grade);
    existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(prefix.as_str()))
        .filter_map(|suffix| {
            let digits = suffix.split('-').next().unwrap_or(suffix);
            match digits.parse::<u32>() {
                Ok(sequence) => Some(sequence),
                Err(_) => {
                    warn!("Ignoring admission number with non-numeric suffix: {prefix}{suffix}");
                    None
                }
            }
        })
        .max()
        .map_or(1, |highest| highest.saturating_add(1))
}

/// Picks the next employee sequence from the most recently created employee number.
///
/// A number from another year (or no number at all) restarts the sequence at 1.
/// A number in the current year whose suffix is not numeric is an error, which the
/// caller turns into the timestamp fallback.
pub fn next_employee_sequence(last_employee_number: Option<&str>, year: i32) -> Result<u32> {
    let Some(number) = last_employee_number else {
        return Ok(1);
    };

    let parts: Vec<&str> = number.split('-').collect();
    if parts.len() != 3 || parts[1] != year.to_string() {
        return Ok(1);
    }

    parts[2]
        .parse::<u32>()
        .map(|sequence| sequence.saturating_add(1))
        .map_err(|_| Error::InvalidIdentifier {
            value: number.to_string(),
        })
}

async fn scan_admission_sequence<C>(db: &C, year: i32, grade: Grade) -> Result<u32>
where
    C: ConnectionTrait,
{
    let prefix = admission_prefix(year, grade);
    let students = Student::find()
        .filter(student::Column::AdmissionNumber.starts_with(prefix.as_str()))
        .all(db)
        .await?;

    Ok(next_admission_sequence(
        students.iter().map(|s| s.admission_number.as_str()),
        year,
        grade,
    ))
}

async fn latest_employee_sequence<C>(db: &C, year: i32) -> Result<u32>
where
    C: ConnectionTrait,
{
    let latest = Teacher::find()
        .order_by_desc(teacher::Column::CreatedAt)
        .order_by_desc(teacher::Column::EmployeeNumber)
        .one(db)
        .await?;

    next_employee_sequence(latest.as_ref().map(|t| t.employee_number.as_str()), year)
}

/// Generates the admission number for a student of `grade` created at `now`.
///
/// Never fails: a store error is logged and replaced by
/// `HS-{year}-{grade}-{last 6 digits of the timestamp}`.
pub async fn admission_number_at<C>(db: &C, grade: Grade, now: DateTime<Utc>) -> String
where
    C: ConnectionTrait,
{
    let year = now.year();
    match scan_admission_sequence(db, year, grade).await {
        Ok(sequence) => {
            let number = format_admission_number(year, grade, sequence);
            debug!("Generated admission number {number}");
            number
        }
        Err(e) => {
            error!("Error generating admission number, using timestamp fallback: {e}");
            fallback_admission_number(year, grade, now.timestamp_millis())
        }
    }
}

/// Generates the admission number for a new student of `grade`.
pub async fn generate_admission_number<C>(db: &C, grade: Grade) -> String
where
    C: ConnectionTrait,
{
    admission_number_at(db, grade, Utc::now()).await
}

/// Generates the employee number for a teacher created at `now`.
///
/// Never fails: a store or parse error is logged and replaced by
/// `TS-{year}-{last 3 digits of the timestamp}`.
pub async fn employee_number_at<C>(db: &C, now: DateTime<Utc>) -> String
where
    C: ConnectionTrait,
{
    let year = now.year();
    match latest_employee_sequence(db, year).await {
        Ok(sequence) => {
            let number = format_employee_number(year, sequence);
            debug!("Generated employee number {number}");
            number
        }
        Err(e) => {
            error!("Error generating employee number, using timestamp fallback: {e}");
            fallback_employee_number(year, now.timestamp_millis())
        }
    }
}

/// Generates the employee number for a new teacher.
pub async fn generate_employee_number<C>(db: &C) -> String
where
    C: ConnectionTrait,
{
    employee_number_at(db, Utc::now()).await
}
