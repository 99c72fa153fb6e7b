use std::fs::File;

use rand::{SeedableRng, rngs::StdRng};
use settings::Dataset;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finlytics={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let store = load_dataset(&settings.dataset)?;
    tracing::info!("Loaded {} transactions", store.len());

    let engine = engine::Engine::builder()
        .store(store)
        .window_days(settings.query.default_window_days)
        .build();

    let Some(server) = settings.server else {
        tracing::warn!("No server settings found, nothing to do");
        return Ok(());
    };

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

fn load_dataset(
    dataset: &Dataset,
) -> Result<engine::TransactionStore, Box<dyn std::error::Error + Send + Sync>> {
    let store = match dataset {
        Dataset::Seed { count, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_os_rng(),
            };
            tracing::info!("Generating {count} transactions");
            engine::seed::seeded_store(*count, chrono::Utc::now(), &mut rng)?
        }
        Dataset::Json(path) => {
            tracing::info!("Reading transactions from {path}");
            engine::TransactionStore::from_json_reader(File::open(path)?)?
        }
    };
    Ok(store)
}
