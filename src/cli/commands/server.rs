use crate::cli::client::ApiClient;
use crate::cli::utils::{field, output_value};
use crate::cli::OutputFormat;

pub async fn health(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let (status, body) = client.probe("/health").await?;
    output_value(&output_format, &body, |b| {
        let data = &b["data"];
        format!("{} {} (database: {})", status.as_u16(), field(data, "status"), field(data, "database"))
    })?;
    if !status.is_success() {
        anyhow::bail!("server is degraded");
    }
    Ok(())
}

pub async fn info(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = client.get("/").await?;
    output_value(&output_format, &data, |d| {
        format!("{} {}\n{}", field(d, "name"), field(d, "version"), field(d, "description"))
    })
}
