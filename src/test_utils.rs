//! Shared test utilities for `hillside-admin`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    config::settings::StorageConfig,
    core::{
        auth::{Session, SessionContext},
        class::{self, NewClass},
        new_document_id,
        student::{self, NewStudent},
        teacher::{self, NewTeacher},
    },
    entities::{
        Gender, Grade, account,
        class::Term,
        session,
        student::{self as student_entity, StudentStatus},
        teacher::{self as teacher_entity, EmploymentType, TeacherStatus},
        user::{self, UserStatus, UserType},
    },
    errors::Result,
    storage::FileBucket,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::ops::Deref;
use tempfile::TempDir;

/// Installs a test subscriber so `warn!`/`error!` output shows up with `--nocapture`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an admin account, its profile and a session without hashing a password.
///
/// # Defaults
/// * email: `admin-{id}@hillside.test`
/// * `full_name`: `"Test Admin"`
/// * `user_type`: admin
pub async fn create_test_session(db: &DatabaseConnection) -> Result<Session> {
    let account_id = new_document_id();
    let email = format!("admin-{account_id}@hillside.test");
    let now = Utc::now();

    account::ActiveModel {
        id: Set(account_id.clone()),
        email: Set(email.clone()),
        name: Set("Test Admin".to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    let user = user::ActiveModel {
        id: Set(new_document_id()),
        user_id: Set(account_id.clone()),
        email: Set(email),
        full_name: Set("Test Admin".to_string()),
        user_type: Set(UserType::Admin),
        phone_number: Set(None),
        status: Set(UserStatus::Active),
        avatar: Set(None),
        employee_id: Set(None),
        date_joined: Set(now),
        last_login: Set(Some(now)),
    }
    .insert(db)
    .await?;

    let row = session::ActiveModel {
        id: Set(new_document_id()),
        account_id: Set(account_id.clone()),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(Session {
        token: row.id,
        account_id,
        user,
    })
}

/// A [`SessionContext`] already holding a test session, with no token file.
pub async fn logged_in_context(db: &DatabaseConnection) -> Result<SessionContext> {
    let session = create_test_session(db).await?;
    Ok(SessionContext::with_session(session))
}

/// A fresh temporary directory, removed when the returned guard is dropped.
pub fn scratch_dir(name: &str) -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix(&format!("hillside-{name}-"))
        .tempdir()?;
    Ok(dir)
}

/// A [`FileBucket`] that owns its scratch directory.
///
/// Derefs to the bucket; the directory is deleted with it.
pub struct TestBucket {
    bucket: FileBucket,
    _dir: TempDir,
}

impl Deref for TestBucket {
    type Target = FileBucket;

    fn deref(&self) -> &Self::Target {
        &self.bucket
    }
}

/// A file bucket rooted in a scratch directory with the default limits.
///
/// # Defaults
/// * `public_base_url`: `"http://bucket.test"`
pub fn test_bucket(name: &str) -> Result<TestBucket> {
    let dir = scratch_dir(name)?;
    let config = StorageConfig {
        bucket_dir: dir.path().to_path_buf(),
        public_base_url: "http://bucket.test".to_string(),
        ..StorageConfig::default()
    };
    Ok(TestBucket {
        bucket: FileBucket::from_config(&config),
        _dir: dir,
    })
}

fn test_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Admission data with sensible defaults.
///
/// # Defaults
/// * name: `"Test Pupil"`
/// * `parent_name`: `"Test Parent"`
/// * `class_name`: mirrors `class_id` when one is given
#[must_use]
pub fn test_new_student(grade: Grade, class_id: Option<&str>) -> NewStudent {
    NewStudent {
        first_name: "Test".to_string(),
        last_name: "Pupil".to_string(),
        date_of_birth: test_date(2018, 3, 14),
        gender: Gender::Female,
        grade,
        avatar: None,
        class_id: class_id.map(str::to_string),
        class_name: class_id.map(|id| format!("Class {id}")),
        parent_name: "Test Parent".to_string(),
        parent_email: Some("parent@hillside.test".to_string()),
        parent_phone: "+256 700 000000".to_string(),
        address: None,
        medical_info: None,
    }
}

/// Admits a test student through the normal create path.
pub async fn create_test_student(
    db: &DatabaseConnection,
    session: &Session,
    grade: Grade,
    class_id: Option<&str>,
) -> Result<student_entity::Model> {
    student::create_student(db, session, test_new_student(grade, class_id)).await
}

/// Inserts a student row carrying a chosen admission number, bypassing generation
/// and the class counter.
pub async fn insert_student_with_admission_number(
    db: &DatabaseConnection,
    admission_number: &str,
) -> Result<student_entity::Model> {
    let id = new_document_id();
    let now = Utc::now();
    let row = student_entity::ActiveModel {
        id: Set(id.clone()),
        student_id: Set(id),
        admission_number: Set(admission_number.to_string()),
        first_name: Set("Imported".to_string()),
        last_name: Set("Pupil".to_string()),
        date_of_birth: Set(test_date(2017, 9, 1)),
        gender: Set(Gender::Male),
        grade: Set(Grade::P1),
        avatar: Set(None),
        class_id: Set(None),
        class_name: Set(None),
        parent_name: Set("Test Parent".to_string()),
        parent_email: Set(None),
        parent_phone: Set("+256 700 000001".to_string()),
        parent_user_id: Set(None),
        address: Set(None),
        medical_info: Set(None),
        enrollment_date: Set(now),
        status: Set(StudentStatus::Active),
        created_by: Set("import".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    row.insert(db).await.map_err(Into::into)
}

/// Hiring data with sensible defaults.
///
/// # Defaults
/// * `last_name`: `"Test"`
/// * subjects: Mathematics, English
/// * `employment_type`: full-time
#[must_use]
pub fn test_new_teacher(first_name: &str) -> NewTeacher {
    NewTeacher {
        first_name: first_name.to_string(),
        last_name: "Test".to_string(),
        email: format!("{}@hillside.test", first_name.to_lowercase()),
        phone: "+256 700 111111".to_string(),
        date_of_birth: test_date(1988, 6, 2),
        gender: Gender::Female,
        address: None,
        avatar: None,
        date_of_joining: test_date(2024, 1, 8),
        qualification: "Diploma in Primary Education".to_string(),
        specialization: "Mathematics".to_string(),
        subjects: vec!["Mathematics".to_string(), "English".to_string()],
        classes: Vec::new(),
        employment_type: EmploymentType::FullTime,
        salary: None,
        bank_details: None,
        emergency_contact: None,
        notes: None,
    }
}

/// Hires a test teacher through the normal create path.
pub async fn create_test_teacher(
    db: &DatabaseConnection,
    session: &Session,
    first_name: &str,
) -> Result<crate::entities::teacher::Model> {
    teacher::create_teacher(db, session, test_new_teacher(first_name)).await
}

/// Inserts a teacher row carrying a chosen employee number and creation time,
/// bypassing generation.
pub async fn insert_teacher_with_employee_number(
    db: &DatabaseConnection,
    employee_number: &str,
    created_at: DateTime<Utc>,
) -> Result<crate::entities::teacher::Model> {
    let data = test_new_teacher("Imported");
    let id = new_document_id();
    let row = teacher_entity::ActiveModel {
        id: Set(id.clone()),
        teacher_id: Set(id),
        employee_number: Set(employee_number.to_string()),
        first_name: Set(data.first_name),
        last_name: Set(data.last_name),
        email: Set(data.email),
        phone: Set(data.phone),
        date_of_birth: Set(data.date_of_birth),
        gender: Set(data.gender),
        address: Set(None),
        avatar: Set(None),
        date_of_joining: Set(data.date_of_joining),
        qualification: Set(data.qualification),
        specialization: Set(data.specialization),
        subjects: Set(data.subjects.into()),
        classes: Set(data.classes.into()),
        employment_type: Set(data.employment_type),
        status: Set(TeacherStatus::Active),
        salary: Set(None),
        bank_details: Set(None),
        emergency_contact: Set(None),
        notes: Set(None),
        created_by: Set("import".to_string()),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    };
    row.insert(db).await.map_err(Into::into)
}

/// Class data with sensible defaults.
///
/// # Defaults
/// * grade: P1
/// * `academic_year`: `"2025"`
/// * term: Term 1
#[must_use]
pub fn test_new_class(name: &str, capacity: i32) -> NewClass {
    NewClass {
        name: name.to_string(),
        grade: Grade::P1,
        class_teacher_id: None,
        class_teacher_name: None,
        room_number: None,
        capacity,
        subjects: Vec::new(),
        schedule: None,
        academic_year: "2025".to_string(),
        term: Term::Term1,
        notes: None,
    }
}

/// Opens a test class through the normal create path.
pub async fn create_test_class(
    db: &DatabaseConnection,
    session: &Session,
    name: &str,
    capacity: i32,
) -> Result<crate::entities::class::Model> {
    class::create_class(db, session, test_new_class(name, capacity)).await
}
