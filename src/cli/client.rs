use anyhow::{bail, Context};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Thin JSON client that unwraps the `{success, data}` envelope.
pub struct ApiClient {
    base_url: url::Url,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base_url = url::Url::parse(base_url).with_context(|| format!("invalid API url: {}", base_url))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("maaeenctl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base_url, token: token.filter(|t| !t.is_empty()), http })
    }

    pub fn endpoint(&self, path: &str) -> anyhow::Result<url::Url> {
        self.base_url.join(path).with_context(|| format!("invalid path: {}", path))
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Raw status and body, without envelope checks
    pub async fn probe(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.http.get(self.endpoint(path)?).send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    async fn send<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> anyhow::Result<Value> {
        let mut request = self.http.request(method, self.endpoint(path)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.context("request failed")?;
        let status = response.status();
        let envelope: Value = response
            .json()
            .await
            .with_context(|| format!("server returned a non-JSON body ({})", status))?;
        unwrap_envelope(status, envelope)
    }
}

pub fn unwrap_envelope(status: StatusCode, envelope: Value) -> anyhow::Result<Value> {
    if envelope.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(envelope.get("data").cloned().unwrap_or(Value::Null));
    }
    let message = envelope.get("error").and_then(Value::as_str).unwrap_or("request failed");
    let code = envelope.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
    bail!("{} ({}, HTTP {})", message, code, status.as_u16())
}
