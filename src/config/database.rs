//! Database configuration module.
//!
//! This module handles the document store connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.
//! Creation is idempotent (`IF NOT EXISTS`) because it runs on every startup.

use crate::entities::{Account, SchoolClass, Session, Student, Teacher, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// The file behind a `sqlite://` URL, if it names one.
fn sqlite_file(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty() && path != ":memory:").then(|| Path::new(path))
}

/// Establishes a connection to the configured database.
///
/// The `DATABASE_URL` environment variable, when set, has already been folded into
/// the settings by [`crate::config::settings::load_default_config`].
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to {database_url}");
    if let Some(parent) = sqlite_file(database_url).and_then(Path::parent) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every collection table that does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Student).await?;
    create_table(db, &schema, Teacher).await?;
    create_table(db, &schema, SchoolClass).await?;
    create_table(db, &schema, Account).await?;
    create_table(db, &schema, Session).await?;
    create_table(db, &schema, User).await?;

    info!("Document store tables ensured");
    Ok(())
}
