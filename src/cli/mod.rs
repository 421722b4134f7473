//! CLI interface for Tutorgate

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};

use crate::auth::Role;

#[derive(Parser)]
#[command(name = "tutorgate")]
#[command(version)]
#[command(about = "Route guard and session core for the tutoring frontend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default tutorgate.toml in the current directory
    Init,

    /// Serve the frontend bundle behind the route guard
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show what the guard would do with a request
    Check {
        /// Request path, optionally with a query string
        path: String,

        /// Access token cookie value
        #[arg(short, long, env = "TUTORGATE_TOKEN")]
        token: Option<String>,
    },

    /// Decode an access token and report whether it is live
    Token {
        token: String,

        /// Also verify the HS256 signature with this secret
        #[arg(long, env = "TUTORGATE_SECRET")]
        secret: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Sign a development token for a local user
    Mint {
        #[arg(long, default_value = "dev-user")]
        id: String,

        #[arg(long, default_value = "dev@example.com")]
        email: String,

        #[arg(long, default_value = "Dev User")]
        name: String,

        #[arg(long, value_enum, default_value = "teacher")]
        role: RoleArg,

        /// Lifetime in seconds
        #[arg(long, default_value = "3600")]
        ttl: i64,

        #[arg(long, env = "TUTORGATE_SECRET")]
        secret: String,
    },

    /// List the route classification
    Routes,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Teacher,
    Student,
    Parent,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Teacher => Role::Teacher,
            RoleArg::Student => Role::Student,
            RoleArg::Parent => Role::Parent,
        }
    }
}
