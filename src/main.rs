use anyhow::Result;
use clap::{Parser, Subcommand};
use socialconnect_backend::api;
use socialconnect_backend::auth::ROLE_ADMIN;
use socialconnect_backend::bootstrap;
use socialconnect_backend::config::SocialConnectConfig;
use socialconnect_backend::profiles::ProfileService;
use socialconnect_backend::telemetry;

#[derive(Parser)]
#[command(author, version, about = "SocialConnect backend server")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for REST/API access
    Serve,
    /// Grant a profile the admin role
    Promote {
        /// Username of the profile to promote
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let config = SocialConnectConfig::from_env()?;
    let resources = bootstrap::initialize(&config)?;
    tracing::info!(
        db_path = %config.paths.db_path.display(),
        database_initialized = resources.database_initialized,
        "bootstrap complete"
    );

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve_http(config, resources.database).await,
        Command::Promote { username } => {
            let service = ProfileService::new(resources.database);
            let profile = service.set_role(&username, ROLE_ADMIN)?;
            tracing::info!(username = %profile.username, "granted admin role");
            Ok(())
        }
    }
}
