use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // A missing .env is fine, the variables may come from the real environment.
    dotenvy::dotenv().ok();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "schoolbot={level},telegram_bot={level},collector={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    tracing::info!("database ready");

    let bot = telegram_bot::Bot::builder()
        .token(settings.token())
        .database(db)
        .news_api_key(settings.news.api_key.clone())
        .location((&settings.weather).into())
        .image_dir(&settings.telegram.image_dir)
        .build()?;
    if settings.news.api_key.is_none() {
        tracing::warn!("NEWSAPI_KEY is not set, /news will answer with a setup hint");
    }

    bot.run().await;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
