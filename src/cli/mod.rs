pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "talent-api")]
#[command(about = "Talent API - job platform backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides TALENT_API_PORT / PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store instead of Postgres")]
        in_memory: bool,
    },

    #[command(about = "Apply the database schema and exit")]
    Migrate,

    #[command(about = "Issue a signed session token for local testing")]
    Token {
        #[arg(long, help = "userId claim")]
        user_id: i64,

        #[arg(long, default_value = "JobSeeker", help = "userType claim")]
        role: String,

        #[arg(long, default_value_t = 1, help = "Lifetime in hours")]
        hours: i64,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        in_memory: false,
    }) {
        Commands::Serve { port, in_memory } => commands::serve::handle(port, in_memory).await,
        Commands::Migrate => commands::migrate::handle().await,
        Commands::Token { user_id, role, hours } => commands::token::handle(user_id, role, hours),
    }
}
