use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::roster_contract::{GuildSummary, RosterMember};

const DEFAULT_MEMBER_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct RosterClientConfig {
    pub api_base: String,
    pub bot_token: String,
    pub http_timeout_ms: u64,
    /// Page size for member pagination; the platform caps this at 1000.
    pub member_page_size: usize,
}

impl Default for RosterClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://discord.com/api/v10".to_string(),
            bot_token: String::new(),
            http_timeout_ms: 10_000,
            member_page_size: DEFAULT_MEMBER_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GuildMemberPayload {
    user: MemberUserPayload,
    #[serde(default)]
    nick: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemberUserPayload {
    id: String,
    username: String,
    #[serde(default)]
    global_name: Option<String>,
}

impl GuildMemberPayload {
    fn into_member(self) -> RosterMember {
        RosterMember {
            user_id: self.user.id,
            username: self.user.username,
            global_name: self.user.global_name,
            nick: self.nick,
        }
    }
}

/// Read-only snapshot client for the guild roster.
///
/// Every failure here is fatal for the run: the dispatcher must not start
/// sending against a partial or unresolvable roster.
#[derive(Debug, Clone)]
pub struct RosterClient {
    config: RosterClientConfig,
    client: reqwest::Client,
}

impl RosterClient {
    pub fn new(config: RosterClientConfig) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            bail!("roster client requires a bot token");
        }
        if config.http_timeout_ms == 0 {
            bail!("roster client requires an http timeout greater than 0");
        }
        if config.member_page_size == 0 {
            bail!("roster client requires a member page size greater than 0");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()
            .context("failed to build roster http client")?;
        Ok(Self { config, client })
    }

    /// Resolves the configured guild among the guilds the bot has joined.
    ///
    /// Fatal when the bot has joined no guild at all or the requested id is
    /// not among the joined ones; the error names what the bot did join so
    /// misconfigured ids are easy to spot.
    pub async fn resolve_guild(&self, guild_id: &str) -> Result<GuildSummary> {
        let url = format!("{}/users/@me/guilds", self.config.api_base);
        let joined: Vec<GuildSummary> = self.get_json(&url).await?;
        if joined.is_empty() {
            bail!("bot has not joined any guild");
        }
        joined
            .iter()
            .find(|guild| guild.id == guild_id)
            .cloned()
            .ok_or_else(|| {
                let joined_names: Vec<String> = joined
                    .iter()
                    .map(|guild| format!("{} ({})", guild.name, guild.id))
                    .collect();
                anyhow!(
                    "bot has not joined guild {guild_id}; joined: {}",
                    joined_names.join(", ")
                )
            })
    }

    /// Fetches the full member roster, paginating by user id until a short
    /// page signals the end.
    pub async fn fetch_members(&self, guild_id: &str) -> Result<Vec<RosterMember>> {
        let url = format!("{}/guilds/{}/members", self.config.api_base, guild_id);
        let mut members: Vec<RosterMember> = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut query: Vec<(&str, String)> =
                vec![("limit", self.config.member_page_size.to_string())];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }
            let page: Vec<GuildMemberPayload> = self.get_json_with_query(&url, &query).await?;
            let page_len = page.len();
            members.extend(page.into_iter().map(GuildMemberPayload::into_member));
            if page_len < self.config.member_page_size {
                break;
            }
            after = members.last().map(|member| member.user_id.clone());
        }
        info!(members = members.len(), guild = %guild_id, "fetched roster snapshot");
        Ok(members)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_with_query(url, &[]).await
    }

    async fn get_json_with_query<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(
                "Authorization",
                format!("Bot {}", self.config.bot_token.trim()),
            )
            .send()
            .await
            .with_context(|| format!("roster request failed: {url}"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "roster request {url} returned {status}: {}",
                compact_detail(&body)
            );
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode roster response from {url}"))
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
