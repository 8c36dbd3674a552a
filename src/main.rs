use salon_recipes::{
    config::{catalog as catalog_config, database, owner},
    core::{catalog, report},
    errors::Result,
};
use chrono::{Datelike, Utc};
use dotenvy::dotenv;
use std::path::Path;
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

    let owner_id = owner::get_owner_id();
    info!(%owner_id, "Starting salon recipes");

    // 3. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;

    // 4. Seed the catalog from catalog.toml when present
    let catalog_path = catalog_config::get_catalog_path();
    if Path::new(&catalog_path).exists() {
        let config = catalog_config::load_config(&catalog_path)?;
        let seeded = catalog::seed_catalog(&db, &owner_id, &config).await?;
        info!(?seeded, %catalog_path, "Catalog seed applied");
    } else {
        warn!(%catalog_path, "No catalog file found, skipping seed");
    }

    // 5. Load the session catalog and summarize this month
    let session_catalog = catalog::load_catalog(&db, &owner_id).await?;
    info!(
        materials = session_catalog.materials().len(),
        oxidants = session_catalog.oxidants().len(),
        service_templates = session_catalog.service_templates().len(),
        "Catalog ready"
    );

    let today = Utc::now().date_naive();
    let months = report::monthly_revenue(&db, &owner_id, today.year()).await?;
    if let Some(current) = months.iter().find(|m| m.month == today.month()) {
        info!(
            visits = current.visit_count,
            revenue = %report::format_amount(current.total),
            "Revenue this month"
        );
    }

    Ok(())
}
