pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "maaeenctl")]
#[command(about = "Command-line client for a running Maaeen API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "MAAEEN_URL", default_value = "http://localhost:3000", help = "API base URL")]
    pub url: String,

    #[arg(long, global = true, env = "MAAEEN_TOKEN", hide_env_values = true, help = "Session token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check server health status from the /health endpoint")]
    Health,

    #[command(about = "Show server information from the API root endpoint")]
    Info,

    #[command(about = "Account registration and sessions")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Browse the course catalog")]
    Courses {
        #[command(subcommand)]
        cmd: commands::courses::CourseCommands,
    },

    #[command(about = "Enroll in a published course")]
    Enroll {
        #[arg(help = "Course id")]
        course_id: uuid::Uuid,
    },

    #[command(about = "Record progress on a lesson")]
    Progress {
        #[arg(long, help = "Lesson id")]
        lesson: uuid::Uuid,
        #[arg(long, help = "Enrollment id")]
        enrollment: uuid::Uuid,
        #[arg(long, help = "Mark the lesson completed")]
        completed: bool,
        #[arg(long, help = "Seconds watched")]
        watch_time: Option<i64>,
    },

    #[command(about = "Administration (admin session required)")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.url, cli.token.clone())?;

    match cli.command {
        Commands::Health => commands::server::health(&client, output_format).await,
        Commands::Info => commands::server::info(&client, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(&client, cmd, output_format).await,
        Commands::Courses { cmd } => commands::courses::handle(&client, cmd, output_format).await,
        Commands::Enroll { course_id } => commands::learning::enroll(&client, course_id, output_format).await,
        Commands::Progress { lesson, enrollment, completed, watch_time } => {
            commands::learning::progress(&client, lesson, enrollment, completed, watch_time, output_format).await
        }
        Commands::Admin { cmd } => commands::admin::handle(&client, cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["maaeenctl", "courses", "list", "--json", "--url", "http://api.test"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.url, "http://api.test");
        assert!(matches!(cli.command, Commands::Courses { .. }));
    }

    #[test]
    fn progress_requires_ids() {
        assert!(Cli::try_parse_from(["maaeenctl", "progress", "--completed"]).is_err());
    }
}
