use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{field, output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register a student account")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "MAAEEN_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Login and print a session token")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "MAAEEN_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(client: &ApiClient, cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { name, email, password } => {
            let user = client
                .post("/auth/register", &json!({ "name": name, "email": email, "password": password }))
                .await?;
            output_success(&output_format, &format!("Registered {}", field(&user, "email")), Some(user))
        }
        AuthCommands::Login { email, password } => {
            let session = client.post("/auth/login", &json!({ "email": email, "password": password })).await?;
            output_value(&output_format, &session, |s| {
                format!("export MAAEEN_TOKEN={}", field(s, "token"))
            })
        }
        AuthCommands::Whoami => {
            let user = client.get("/api/auth/whoami").await?;
            output_value(&output_format, &user, |u| {
                format!("{} <{}> {}", field(u, "name"), field(u, "email"), field(u, "role"))
            })
        }
    }
}
