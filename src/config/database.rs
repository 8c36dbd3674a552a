//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Parents are created before children because the child tables carry
//! foreign keys to them.

use crate::entities::{
    Bowl, Client, Material, MaterialLine, MaterialRatio, Oxidant, Product, ProductSale,
    ProductSaleLine, ServiceTemplate, Visit, VisitProduct, VisitService,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::debug;

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/salon.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to [`DEFAULT_DATABASE_URL`] if no environment variable is set.
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!(%database_url, "Connecting to database");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table that does not exist yet.
///
/// # Errors
/// Returns an error if a `CREATE TABLE` statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Client).await?;
    create_table(db, &schema, Material).await?;
    create_table(db, &schema, MaterialRatio).await?;
    create_table(db, &schema, Oxidant).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, ServiceTemplate).await?;
    create_table(db, &schema, Visit).await?;
    create_table(db, &schema, VisitService).await?;
    create_table(db, &schema, Bowl).await?;
    create_table(db, &schema, MaterialLine).await?;
    create_table(db, &schema, VisitProduct).await?;
    create_table(db, &schema, ProductSale).await?;
    create_table(db, &schema, ProductSaleLine).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BowlModel, ClientModel, MaterialLineModel, VisitModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ClientModel> = Client::find().limit(1).all(&db).await?;
        let _: Vec<VisitModel> = Visit::find().limit(1).all(&db).await?;
        let _: Vec<BowlModel> = Bowl::find().limit(1).all(&db).await?;
        let _: Vec<MaterialLineModel> = MaterialLine::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_twice() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
