//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::api;
use crate::auth::{self, jwt, Claims, RouteGuard, User};
use crate::cli::{error, info, print_claims, print_decision, print_route_table, success, warn, OutputFormat, RoleArg};
use crate::config::{self, loader::CONFIG_FILENAME, Config};
use crate::error::Error;

/// Initialize a new tutorgate.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    fs::write(config_path, config::loader::default_config_content())?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Edit the route lists, then run 'tutorgate serve'");

    Ok(())
}

/// Start the edge server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config_or_default()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!(
        "Serving {} on http://{}:{}",
        config.server.static_dir.display(),
        host,
        port
    ));
    api::run_server(config, &host, port).await?;
    Ok(())
}

/// Dry-run the guard for one request
pub async fn check(target: &str, token: Option<String>) -> Result<()> {
    let config = load_config_or_default()?;
    let guard = RouteGuard::from_config(&config)?;
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    if !guard.applies_to(path) {
        info(&format!("{} is excluded from the guard", path));
        return Ok(());
    }

    let now = chrono::Utc::now().timestamp();
    let decision = guard.decide(path, query, token.as_deref(), now);
    print_decision(
        path,
        guard.classify(path),
        jwt::is_authenticated_at(token.as_deref(), now),
        &decision,
    );
    Ok(())
}

/// Decode a token and optionally verify its signature
pub async fn token(token: &str, secret: Option<String>, format: OutputFormat) -> Result<()> {
    let claims = auth::decode_claims(token)?;
    let now = chrono::Utc::now().timestamp();

    match format {
        OutputFormat::Table => print_claims(&claims, now),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&claims)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&claims)?),
    }

    if let Some(secret) = secret {
        match jwt::verify_token(token, secret.as_bytes()) {
            Ok(_) => success("Signature valid"),
            Err(Error::TokenExpired(_)) => warn("Signature valid but token expired"),
            Err(e) => {
                error("Signature check failed");
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// Sign a development token
pub async fn mint(
    id: &str,
    email: &str,
    name: &str,
    role: RoleArg,
    ttl: i64,
    secret: &str,
) -> Result<()> {
    let user = User::new(id, email, name, role.into());
    let claims = Claims::for_user(&user, chrono::Utc::now().timestamp(), ttl);
    println!("{}", jwt::mint_token(&claims, secret.as_bytes())?);
    Ok(())
}

/// Print the route classification
pub async fn routes() -> Result<()> {
    let config = load_config_or_default()?;
    print_route_table(&config.routes.table()?);
    Ok(())
}

// Helper functions

fn load_config_or_default() -> Result<Config> {
    match config::load_config() {
        Ok(config) => Ok(config),
        Err(Error::ConfigNotFound) => {
            warn(&format!("No {} found, using defaults", CONFIG_FILENAME));
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!("{}", e)),
    }
}
