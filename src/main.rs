use dotenvy::dotenv;
use hillside_admin::{
    config::{self, database},
    core::{auth::SessionContext, dashboard},
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;

    // 4. Open the document store and make sure every collection exists
    let db = database::create_connection(&app_config.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Rehydrate the session persisted by the previous run
    let context = SessionContext::restore(&db, app_config.session.token_file.clone()).await;
    match context.current() {
        Some(session) => info!(
            "Logged in as {} ({:?})",
            session.user.full_name, session.user.user_type
        ),
        None => warn!("No active session; log in before creating records"),
    }

    // 6. Report the dashboard figures
    let summary = dashboard::dashboard_summary(&db).await?;
    info!(
        "{} active students, {} active teachers, {} active classes, {}/{} seats filled ({:.1}%)",
        summary.active_students,
        summary.active_teachers,
        summary.active_classes,
        summary.enrolled,
        summary.total_capacity,
        summary.fill_percent
    );
    for occupancy in dashboard::class_occupancy(&db).await? {
        info!(
            "{}: {}/{} ({} seats left)",
            occupancy.class.name,
            occupancy.class.current_students,
            occupancy.class.capacity,
            occupancy.seats_left
        );
    }

    Ok(())
}
