mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use url::Url;

use commands::{compare_images, show_stats};
use rocisc::format::OutputFormat;
use rocisc::{ImageReference, Platform, RegistryClient, RegistryConfig};

#[derive(Parser)]
#[command(name = "rocisc")]
#[command(version)]
#[command(about = "Remote OCI Image Size Calculator - Image sizes straight from the registry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry base URL
    #[arg(long, global = true, default_value = RegistryClient::DOCKER_HUB)]
    registry: String,

    /// CPU architecture of the image variant (defaults to this host's)
    #[arg(long, global = true)]
    arch: Option<String>,

    /// Operating system of the image variant (defaults to this host's)
    #[arg(long, global = true)]
    os: Option<String>,

    /// Pre-made Authorization header value, skips the token exchange
    #[arg(long, global = true, env = "AUTHORIZATION", hide_env_values = true)]
    authorization: Option<String>,

    /// Log every registry request
    #[arg(long, global = true)]
    debug: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Show layer count, sizes and space savings of images
    Stats {
        /// Images to inspect (e.g., library/ubuntu:24.04)
        #[arg(required = true)]
        images: Vec<ImageReference>,
    },

    /// Compare the sizes of two images
    Compare {
        /// Baseline image
        before: ImageReference,

        /// Image compared against the baseline
        after: ImageReference,
    },
}

impl Commands {
    fn images(&self) -> Vec<ImageReference> {
        match self {
            Commands::Stats { images } => images.clone(),
            Commands::Compare { before, after } => vec![before.clone(), after.clone()],
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.debug)?;

    let host = Platform::current();
    let platform = Platform::new(
        cli.arch.unwrap_or_else(|| host.architecture().to_string()),
        cli.os.unwrap_or_else(|| host.os().to_string()),
    );
    let config = RegistryConfig {
        registry: Url::parse(&cli.registry)
            .context(format!("Invalid registry URL '{}'", cli.registry))?,
        authorization: cli.authorization,
        debug: cli.debug,
    };

    let images = cli.command.images();
    let mut registry = RegistryClient::new(config);
    registry
        .try_authenticate(&images)
        .await
        .context(format!("Failed to authenticate with {}", cli.registry))?;

    match cli.command {
        Commands::Stats { images } => {
            show_stats(&registry, &platform, &images, cli.format).await?;
        }
        Commands::Compare { before, after } => {
            compare_images(&registry, &platform, &before, &after, cli.format).await?;
        }
    }

    Ok(())
}
