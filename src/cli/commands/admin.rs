use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::utils::{field, output_value, table};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Platform totals")]
    Stats,

    #[command(about = "Recent activity feed")]
    Activity,
}

pub async fn handle(client: &ApiClient, cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Stats => {
            let stats = client.get("/api/admin/stats").await?;
            output_value(&output_format, &stats, |s| {
                format!(
                    "users: {} (+{} in 30d)\ncourses: {} (+{} in 30d)\nactive enrollments: {}\nreviews: {}",
                    s["totalUsers"], s["recentUsers"], s["totalCourses"], s["recentCourses"], s["totalEnrollments"], s["totalReviews"],
                )
            })
        }
        AdminCommands::Activity => {
            let feed = client.get("/api/admin/activity").await?;
            output_value(&output_format, &feed, |f| {
                let rows: Vec<Vec<String>> = f
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .map(|i| {
                                vec![
                                    field(i, "createdAt").to_string(),
                                    field(i, "type").to_string(),
                                    field(i, "description").to_string(),
                                ]
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                table(&["WHEN", "TYPE", "WHAT"], &rows)
            })
        }
    }
}
