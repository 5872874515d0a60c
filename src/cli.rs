//! Command-line interface.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cache::RedisCache;
use crate::config::Settings;
use crate::models::Language;
use crate::scrapers::browser::BrowserHarvester;
use crate::scrapers::ScrapePipeline;
use crate::server;

#[derive(Parser)]
#[command(
    name = "saintshub",
    version,
    about = "Daily verse and quote API with music library listings"
)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (the default).
    Serve {
        /// Port override (defaults to PORT or 5001).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Scrape the verse of the day once and print it.
    Verse,
    /// Scrape the quote of the day once and print it.
    Quote {
        /// Quote language ("en" or "fr").
        #[arg(long, default_value = "en")]
        lang: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = Settings::from_env()?;

        match self.command.unwrap_or(Command::Serve { port: None }) {
            Command::Serve { port } => {
                server::serve(&settings, port.unwrap_or(settings.port)).await
            }
            Command::Verse => {
                let pipeline = standalone_pipeline(&settings).await?;
                let record = pipeline.refresh_verse().await?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(())
            }
            Command::Quote { lang } => {
                let pipeline = standalone_pipeline(&settings).await?;
                let record = pipeline.refresh_quote(Language::from_param(&lang)).await?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(())
            }
        }
    }
}

async fn standalone_pipeline(settings: &Settings) -> anyhow::Result<ScrapePipeline> {
    let cache = RedisCache::connect(&settings.cache).await?;
    Ok(ScrapePipeline::new(
        Arc::new(cache),
        Arc::new(BrowserHarvester::new(Default::default())),
    ))
}
