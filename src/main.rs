//! Somnia command-line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use somnia::services::analysis::AnalysisPipeline;
use somnia::services::visualization::{DreamVisualizer, VisualStyle};
use somnia::models::settings::SettingsUpdate;
use somnia::storage::{ConfigService, Database, SqliteAnalysisStore};
use somnia::utils::paths;
use somnia::{logging, DreamInput, Tier};
use somnia_llm::{OpenAIImageProvider, OpenAIProvider};

#[derive(Debug, Parser)]
#[command(name = "somnia", version, about = "Interpret a dream with a hosted language model")]
struct Cli {
    /// Dream record as JSON: {title, content, emotion, sleepQuality, context?}
    dream: PathBuf,

    /// Request the premium analysis
    #[arg(long)]
    premium: bool,

    /// Stable dream id used as the cache key (random when omitted)
    #[arg(long)]
    id: Option<String>,

    /// Ignore any cached analysis and generate a new one
    #[arg(long)]
    force: bool,

    /// Also render an image (realistic, artistic, surreal, minimalist)
    #[arg(long, value_name = "STYLE")]
    visualize: Option<VisualStyle>,

    /// Config file (defaults to ~/.somnia/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save a new text model to the config file before analyzing
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let mut config_service = match &cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;
    if let Some(model) = cli.model.clone() {
        config_service
            .update_config(SettingsUpdate {
                text_model: Some(model),
                ..Default::default()
            })
            .context("failed to update configuration")?;
        tracing::info!(path = %config_service.path().display(), "saved text model");
    }
    let config = config_service.effective_config();

    let raw = std::fs::read_to_string(&cli.dream)
        .with_context(|| format!("failed to read {}", cli.dream.display()))?;
    let dream: DreamInput = serde_json::from_str(&raw)
        .with_context(|| format!("invalid dream record in {}", cli.dream.display()))?;

    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => paths::database_path()?,
    };
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    let store = Arc::new(SqliteAnalysisStore::new(db));

    let provider = Arc::new(OpenAIProvider::new(config.text_provider())?);
    let pipeline = AnalysisPipeline::new(provider, store);

    let tier = if cli.premium { Tier::Premium } else { Tier::Free };
    let dream_id = cli
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(%dream_id, %tier, "analyzing dream");

    let analysis = if cli.force {
        pipeline.regenerate_analysis(&dream_id, &dream, tier).await
    } else {
        pipeline.generate_analysis(&dream_id, &dream, tier).await
    };

    let output = match cli.visualize {
        Some(style) => {
            let image_config = config.image_provider();
            let model = image_config.model.clone();
            let visualizer =
                DreamVisualizer::new(Arc::new(OpenAIImageProvider::new(image_config)?), model);
            let visualization = visualizer.visualize(&dream, style).await?;
            serde_json::json!({
                "dreamId": dream_id,
                "analysis": analysis,
                "visualization": visualization,
            })
        }
        None => serde_json::json!({
            "dreamId": dream_id,
            "analysis": analysis,
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
