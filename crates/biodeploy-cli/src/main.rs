mod commands;

use biodeploy_cloud::ExecError;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "biodeploy", about = "Build and deploy the bioindex service to Cloud Run")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the container image locally
    Build {
        /// Image tag (default: latest)
        #[arg(long)]
        tag: Option<String>,
    },
    /// Build, tag, push, and deploy to Cloud Run
    Deploy {
        /// Allow deploying with uncommitted changes
        #[arg(long)]
        allow_dirty: bool,
        /// Image tag (default: latest)
        #[arg(long)]
        tag: Option<String>,
    },
    /// Check docker/gcloud setup and deploy readiness
    Doctor,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build { tag } => commands::build(tag).await,
        Commands::Deploy { allow_dirty, tag } => commands::deploy(allow_dirty, tag).await,
        Commands::Doctor => commands::doctor().await,
    }
}

/// The pipeline exits with the failing stage's own exit code when one is
/// available, so wrappers see exactly what the failed tool reported.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ExecError>().and_then(ExecError::exit_code))
        .unwrap_or(1)
}
