use crate::config::config;
use crate::database::postgres::schema;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database).await?;
    schema::migrate(&pool).await?;
    println!("Schema applied");
    Ok(())
}
