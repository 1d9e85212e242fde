use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

/// Closed failure taxonomy for DM transmission.
///
/// The dispatch loop classifies outcomes from these tags instead of
/// inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmSendErrorKind {
    /// The recipient has private messages disabled or has blocked the bot.
    Blocked,
    /// The recipient could not be resolved at send time.
    NotFound,
    /// Any other transport or platform failure.
    Other,
}

impl DmSendErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::NotFound => "not_found",
            Self::Other => "error",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{}: {detail}", .kind.as_str())]
pub struct DmSendError {
    pub kind: DmSendErrorKind,
    pub detail: String,
    pub http_status: Option<u16>,
}

impl DmSendError {
    fn transport(detail: String) -> Self {
        Self {
            kind: DmSendErrorKind::Other,
            detail,
            http_status: None,
        }
    }
}

/// Transmission seam between the dispatch loop and the Discord REST API.
///
/// Test doubles implement this to exercise the run loop without network
/// access; dry-run mode never reaches it at all.
#[async_trait]
pub trait DmTransport: Send + Sync {
    /// Opens (or reuses) the recipient's DM channel, returning its id.
    async fn open_dm_channel(&self, user_id: &str) -> Result<String, DmSendError>;

    /// Sends one message chunk to a previously opened DM channel.
    async fn send_chunk(&self, channel_id: &str, content: &str) -> Result<(), DmSendError>;
}

#[derive(Debug, Clone)]
pub struct DiscordDmConfig {
    pub api_base: String,
    pub bot_token: String,
    pub http_timeout_ms: u64,
}

impl Default for DiscordDmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://discord.com/api/v10".to_string(),
            bot_token: String::new(),
            http_timeout_ms: 10_000,
        }
    }
}

/// REST transport for direct messages.
///
/// Every request carries an explicit timeout so a non-responsive platform
/// call cannot hang the run. Status codes map onto the closed error
/// taxonomy: 403 means the DM was refused, 404 means the recipient is gone,
/// everything else is reported as-is.
#[derive(Debug, Clone)]
pub struct DiscordDmClient {
    config: DiscordDmConfig,
    client: reqwest::Client,
}

impl DiscordDmClient {
    pub fn new(config: DiscordDmConfig) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            bail!("dm client requires a bot token");
        }
        if config.http_timeout_ms == 0 {
            bail!("dm client requires an http timeout greater than 0");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()
            .context("failed to build dm http client")?;
        Ok(Self { config, client })
    }

    async fn post_json(&self, url: &str, body: Value) -> Result<Value, DmSendError> {
        let response = self
            .client
            .post(url)
            .header(
                "Authorization",
                format!("Bot {}", self.config.bot_token.trim()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|error| DmSendError::transport(format!("request to {url} failed: {error}")))?;
        let status = response.status();
        if status.is_success() {
            return response.json::<Value>().await.map_err(|error| DmSendError {
                kind: DmSendErrorKind::Other,
                detail: format!("failed to decode response from {url}: {error}"),
                http_status: Some(status.as_u16()),
            });
        }
        let detail = compact_detail(&response.text().await.unwrap_or_default());
        let kind = match status.as_u16() {
            403 => DmSendErrorKind::Blocked,
            404 => DmSendErrorKind::NotFound,
            _ => DmSendErrorKind::Other,
        };
        Err(DmSendError {
            kind,
            detail: format!("{url} returned {status}: {detail}"),
            http_status: Some(status.as_u16()),
        })
    }
}

#[async_trait]
impl DmTransport for DiscordDmClient {
    async fn open_dm_channel(&self, user_id: &str) -> Result<String, DmSendError> {
        let url = format!("{}/users/@me/channels", self.config.api_base);
        let payload = self.post_json(&url, json!({ "recipient_id": user_id })).await?;
        payload["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DmSendError {
                kind: DmSendErrorKind::Other,
                detail: format!("dm channel response for user {user_id} carried no id"),
                http_status: None,
            })
    }

    async fn send_chunk(&self, channel_id: &str, content: &str) -> Result<(), DmSendError> {
        let url = format!("{}/channels/{}/messages", self.config.api_base, channel_id);
        self.post_json(&url, json!({ "content": content })).await?;
        Ok(())
    }
}

fn compact_detail(raw: &str) -> String {
    const LIMIT: usize = 256;
    let trimmed = raw.trim();
    if trimmed.chars().count() <= LIMIT {
        return trimmed.to_string();
    }
    let mut output: String = trimmed.chars().take(LIMIT).collect();
    output.push_str("...");
    output
}
