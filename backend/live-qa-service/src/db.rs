use db_pool::{create_pool, run_migrations, DbConfig};
use sqlx::migrate::Migrator;
use sqlx::PgPool;

use crate::config::Config;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(config: &Config) -> anyhow::Result<PgPool> {
    let db_config = DbConfig::for_service("live-qa-service", &config.database_url);
    db_config.log_config();

    let pool = create_pool(db_config).await?;
    if config.run_migrations {
        run_migrations(&pool, &MIGRATOR).await?;
    }
    Ok(pool)
}
