use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tutorgate::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorgate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Serve { host, port } => cli::commands::serve(host, port).await,
        Commands::Check { path, token } => cli::commands::check(&path, token).await,
        Commands::Token { token, secret, format } => {
            cli::commands::token(&token, secret, format).await
        }
        Commands::Mint {
            id,
            email,
            name,
            role,
            ttl,
            secret,
        } => cli::commands::mint(&id, &email, &name, role, ttl, &secret).await,
        Commands::Routes => cli::commands::routes().await,
    }
}
