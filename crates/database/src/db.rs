use sea_orm::{Database, DatabaseConnection, DbErr};
use std::env;

/// Creates a database connection from the `DATABASE_URL` environment
/// variable (the server loads `.env` via dotenvy at startup).
pub async fn create_connection() -> Result<DatabaseConnection, DbErr> {
    let url = env::var("DATABASE_URL")
        .map_err(|_| DbErr::Custom("DATABASE_URL is not set".to_string()))?;
    Database::connect(url).await
}
