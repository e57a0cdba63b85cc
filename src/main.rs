use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};

use skycast::{
    AddressClassifier, AddressLabel, FixedClassifier, HeuristicClassifier, LocationStore,
    MemoryLocationStore, PersistentLocationStore, PipelineOrchestrator, SkycastConfig, logging,
};

const ABOUT: &str = "Weather lookups for free-text locations";

const LONG_ABOUT: &str = "
Looks up current conditions and a daily forecast for a city, town, postal code, landmark or
'lat,lon' pair. Results are printed as JSON.

The weather API key is read from the config file or SKYCAST_WEATHER__API_KEY.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles = STYLES, about = ABOUT, long_about = LONG_ABOUT)]
struct Args {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log at debug level")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Current conditions plus the daily forecast
    Weather {
        #[arg(short, long, help = "Location query (e.g. \"New York\", 10001, \"40.7,-74.0\")")]
        location: String,

        #[arg(long, help = "Skip classification and use this address type (e.g. \"Zip Code\")")]
        label: Option<String>,
    },
    /// Daily forecast for a date range of up to five days
    Range {
        #[arg(short, long)]
        location: String,

        #[arg(long, help = "First day, YYYY-MM-DD")]
        start: NaiveDate,

        #[arg(long, help = "Last day, YYYY-MM-DD")]
        end: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = SkycastConfig::load_from_path(args.config.clone())?;
    if args.verbose {
        config.logging.level = "debug".to_string();
    }
    logging::init(&config.logging)?;
    debug!("Loaded configuration: {:?}", config.store);

    let store = open_store(&config)?;
    let classifier: Arc<dyn AddressClassifier> = match &args.command {
        Command::Weather {
            label: Some(label), ..
        } => Arc::new(FixedClassifier(AddressLabel::from_label(label))),
        _ => Arc::new(HeuristicClassifier),
    };

    let pipeline = match PipelineOrchestrator::from_config(&config, classifier, store) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Failed to build pipeline: {}", e);
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    match args.command {
        Command::Weather { location, .. } => {
            let envelope = pipeline.run(&location).await;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(if envelope.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Range {
            location,
            start,
            end,
        } => match pipeline.forecast_range(&location, start, end).await {
            Ok(range) => {
                println!("{}", serde_json::to_string_pretty(&range)?);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                error!("Range forecast failed: {}", e);
                eprintln!("{}", e.user_message());
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

fn open_store(config: &SkycastConfig) -> Result<Arc<dyn LocationStore>> {
    if !config.store.persistent {
        return Ok(Arc::new(MemoryLocationStore::new()));
    }

    let store = PersistentLocationStore::open(&config.store.path)
        .with_context(|| format!("Failed to open location store at {}", config.store.path))?;
    Ok(Arc::new(store))
}
