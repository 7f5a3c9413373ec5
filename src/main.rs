use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use sunrise_navigator::config::{LoggingConfig, SunriseConfig};
use sunrise_navigator::models::{ALARM_SOUNDS, AlarmSettings};
use sunrise_navigator::{AddressValidator, BriefingService, MusicSearch, http, web};

#[derive(Parser, Debug)]
#[command(name = "sunrise-navigator")]
#[command(about = "Smart alarm with a morning briefing: traffic, weather, news and a quote")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the API and front-end
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ring the alarm now and print the briefing
    Ring {
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Assemble a briefing without ringing the alarm
    Briefing {
        #[arg(long)]
        home: String,
        #[arg(long)]
        destination: String,
        #[arg(long)]
        weather_location: String,
    },
    /// Current commute estimate
    Traffic {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
    },
    /// Current weather
    Weather {
        #[arg(short, long)]
        location: String,
    },
    /// Top headlines
    News,
    /// A motivational quote
    Quote {
        #[arg(short, long)]
        topic: Option<String>,
    },
    /// Check that an address resolves
    ValidateAddress { address: String },
    /// Search tracks to wake up to
    Music {
        #[arg(short, long)]
        query: String,
    },
    /// List the built-in alarm sounds
    Sounds,
}

#[derive(clap::Args, Debug)]
struct SettingsArgs {
    /// Wake time as HH:MM
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    home: Option<String>,
    #[arg(long)]
    destination: Option<String>,
    #[arg(long)]
    alarm_sound: Option<String>,
    #[arg(long)]
    weather_location: Option<String>,
}

impl SettingsArgs {
    fn into_settings(self) -> AlarmSettings {
        let defaults = AlarmSettings::default();
        AlarmSettings {
            time: self.time.unwrap_or(defaults.time),
            home: self.home.unwrap_or(defaults.home),
            destination: self.destination.unwrap_or(defaults.destination),
            alarm_sound: self.alarm_sound.unwrap_or(defaults.alarm_sound),
            weather_location: self.weather_location.unwrap_or(defaults.weather_location),
        }
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("sunrise_navigator={level},tower_http={level},warn"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SunriseConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    init_logging(&config.logging, cli.verbose);
    tracing::debug!("Starting Sunrise Navigator {}", sunrise_navigator::VERSION);

    let client = http::build_client(config.http.request_timeout())?;
    let service = BriefingService::from_config(&config, client.clone());

    match cli.command {
        Commands::Serve { port } => {
            web::run(&config, port.unwrap_or(config.server.port)).await?;
        }
        Commands::Ring { settings } => {
            let ring = service
                .ring(&settings.into_settings())
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_json(&ring)?;
        }
        Commands::Briefing {
            home,
            destination,
            weather_location,
        } => {
            let briefing = service
                .assemble(&home, &destination, &weather_location, None)
                .await;
            print_json(&briefing)?;
        }
        Commands::Traffic {
            origin,
            destination,
        } => print_json(&service.traffic(&origin, &destination).await)?,
        Commands::Weather { location } => print_json(&service.weather(&location).await)?,
        Commands::News => print_json(&service.news().await)?,
        Commands::Quote { topic } => print_json(&service.quote(topic.as_deref()).await)?,
        Commands::ValidateAddress { address } => {
            let validation = AddressValidator::new(client, &config.maps)
                .validate(&address)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_json(&validation)?;
        }
        Commands::Music { query } => {
            print_json(&MusicSearch::new(client, &config.music).search(&query).await)?;
        }
        Commands::Sounds => print_json(&ALARM_SOUNDS)?,
    }

    Ok(())
}
