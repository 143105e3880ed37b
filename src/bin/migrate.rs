use sea_orm_migration::MigratorTrait;
use technest_api::{config::AppConfig, db::create_orm_conn, migration::Migrator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// `migrate [up|down|fresh|status]`, default `up`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sea_orm_migration=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let conn = create_orm_conn(&config.database_url).await?;

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    match command.as_str() {
        "up" => Migrator::up(&conn, None).await?,
        "down" => Migrator::down(&conn, Some(1)).await?,
        "fresh" => Migrator::fresh(&conn).await?,
        "status" => Migrator::status(&conn).await?,
        other => anyhow::bail!("unknown command {other}, expected up, down, fresh or status"),
    }

    tracing::info!(command = %command, "migration finished");
    Ok(())
}
