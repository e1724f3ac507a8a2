// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hearth - conversational assistant backend for home-improvement projects.
//!
//! This is the binary entry point: config loading, adapter wiring, and the
//! `serve` / `shell` / `config` subcommands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shell;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hearth_actions::ActionResolver;
use hearth_anthropic::AnthropicGeneration;
use hearth_config::HearthConfig;
use hearth_core::{HearthError, TurnStore};
use hearth_pipeline::{PipelineDeps, TurnPipeline};
use hearth_retrieval::ScopedRetriever;
use hearth_storage::SqliteTurnStore;
use hearth_tools::{HttpContractorLookup, HttpGroundingSearch, HttpImageGeneration};

/// Hearth - conversational assistant backend for home-improvement projects.
#[derive(Parser, Debug)]
#[command(name = "hearth", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Hearth HTTP server.
    Serve,
    /// Launch an interactive REPL conversation.
    Shell,
    /// Print the resolved configuration.
    Config,
}

/// Everything `serve` and `shell` need, wired from config.
pub struct App {
    pub config: HearthConfig,
    pub store: Arc<SqliteTurnStore>,
    pub pipeline: Arc<TurnPipeline>,
    pub resolver: Arc<ActionResolver>,
}

impl App {
    /// Build all adapters and the pipeline from configuration.
    pub async fn build(config: HearthConfig) -> Result<Self, HearthError> {
        let api_key = config.generation.api_key.clone().ok_or_else(|| {
            HearthError::Config(
                "generation.api_key is required (set HEARTH_GENERATION_API_KEY)".into(),
            )
        })?;

        let generation = Arc::new(AnthropicGeneration::new(
            &api_key,
            &config.generation.api_version,
            config.generation.model.clone(),
        )?);
        let classifier_generation = Arc::new(AnthropicGeneration::new(
            &api_key,
            &config.generation.api_version,
            config.generation.classifier_model.clone(),
        )?);

        let image = Arc::new(HttpImageGeneration::new(&config.image)?);
        let search = Arc::new(HttpGroundingSearch::new(&config.search)?);
        let contractors = Arc::new(HttpContractorLookup::new(&config.maps)?);

        let store = Arc::new(SqliteTurnStore::new(config.storage.clone()));
        store.initialize().await?;

        let index = Arc::new(ScopedRetriever::open(&config.retrieval).await);

        let pipeline = Arc::new(TurnPipeline::new(
            PipelineDeps {
                store: Arc::clone(&store) as Arc<dyn TurnStore>,
                index,
                generation: Arc::clone(&generation) as _,
                classifier_generation: Some(classifier_generation as _),
                image: Arc::clone(&image) as _,
                search: Arc::clone(&search) as _,
                contractors: Arc::clone(&contractors) as _,
            },
            &config,
        ));

        let resolver = Arc::new(ActionResolver::new(
            generation,
            image,
            search,
            contractors,
            config.maps.default_location.clone(),
            config.generation.max_tokens,
        ));

        Ok(Self {
            config,
            store,
            pipeline,
            resolver,
        })
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hearth={log_level},warn")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match hearth_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            hearth_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => match App::build(config).await {
            Ok(app) => serve::run(app).await,
            Err(e) => Err(e),
        },
        Some(Commands::Shell) => match App::build(config).await {
            Ok(app) => shell::run(app).await,
            Err(e) => Err(e),
        },
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(HearthError::Config(format!("failed to render config: {e}"))),
            }
        }
        None => {
            println!("hearth: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("hearth: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = hearth_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "hearth");
    }
}
