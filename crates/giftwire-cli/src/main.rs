//! `giftwire` binary: resolves a guild roster, reconciles the pairing table
//! against it, and dispatches one Secret Santa DM per resolved assignment.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use giftwire_dispatch::{
    DiscordDmClient, DiscordDmConfig, DispatchRunConfig, DispatchRunner,
};
use giftwire_roster::{
    read_pairing_rows, resolve_assignments, AliasIndex, RosterClient, RosterClientConfig,
};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "giftwire",
    about = "Secret Santa DM dispatcher for Discord guilds",
    version
)]
struct Cli {
    #[arg(
        long,
        env = "GIFTWIRE_BOT_TOKEN",
        hide_env_values = true,
        help = "Bot token used to authenticate against the Discord API"
    )]
    bot_token: String,

    #[arg(
        long,
        env = "GIFTWIRE_GUILD_ID",
        help = "Guild id whose roster the pairing table resolves against"
    )]
    guild_id: String,

    #[arg(
        long,
        env = "GIFTWIRE_PAIRINGS",
        default_value = "secret_santa.csv",
        help = "CSV pairing table with username,target columns"
    )]
    pairings: PathBuf,

    #[arg(
        long,
        env = "GIFTWIRE_DELIVERY_LOG",
        default_value = "dm_log.txt",
        help = "Delivery log path, overwritten each run"
    )]
    delivery_log: PathBuf,

    #[arg(
        long,
        env = "GIFTWIRE_DRY_RUN",
        action = ArgAction::SetTrue,
        help = "Resolve and compose everything without sending any DM"
    )]
    dry_run: bool,

    #[arg(
        long,
        env = "GIFTWIRE_INTER_CHUNK_DELAY_MS",
        default_value_t = 600,
        help = "Delay between chunks of one recipient's message"
    )]
    inter_chunk_delay_ms: u64,

    #[arg(
        long,
        env = "GIFTWIRE_INTER_RECIPIENT_DELAY_MS",
        default_value_t = 1200,
        help = "Delay after each recipient, success or failure"
    )]
    inter_recipient_delay_ms: u64,

    #[arg(
        long,
        env = "GIFTWIRE_CHUNK_SIZE_LIMIT",
        default_value_t = 1900,
        value_parser = parse_positive_usize,
        help = "Maximum characters per transmitted chunk (the platform hard limit is 2000)"
    )]
    chunk_size_limit: usize,

    #[arg(
        long,
        env = "GIFTWIRE_HTTP_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Per-request HTTP timeout for roster and DM calls"
    )]
    http_timeout_ms: u64,

    #[arg(
        long,
        env = "GIFTWIRE_DISCORD_API_BASE",
        default_value = "https://discord.com/api/v10",
        help = "Discord REST API base, overridable for tests and proxies"
    )]
    discord_api_base: String,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // The pairing table is validated first so configuration mistakes abort
    // before any network activity.
    let rows = read_pairing_rows(&cli.pairings)?;
    info!(rows = rows.len(), table = %cli.pairings.display(), "pairing table loaded");

    let roster_client = RosterClient::new(RosterClientConfig {
        api_base: cli.discord_api_base.clone(),
        bot_token: cli.bot_token.clone(),
        http_timeout_ms: cli.http_timeout_ms,
        ..RosterClientConfig::default()
    })?;
    let guild = roster_client.resolve_guild(&cli.guild_id).await?;
    info!(guild = %guild.name, id = %guild.id, "using guild");

    let members = roster_client.fetch_members(&cli.guild_id).await?;
    let index = AliasIndex::build(&members);
    info!(members = members.len(), aliases = index.len(), "roster indexed");

    let report = resolve_assignments(&rows, &index);
    info!(
        resolved = report.stats.rows_resolved,
        skipped = report.stats.rows_skipped,
        "assignments resolved"
    );

    let transport = DiscordDmClient::new(DiscordDmConfig {
        api_base: cli.discord_api_base,
        bot_token: cli.bot_token,
        http_timeout_ms: cli.http_timeout_ms,
    })?;
    let runner = DispatchRunner::new(
        DispatchRunConfig {
            dry_run: cli.dry_run,
            chunk_size_limit: cli.chunk_size_limit,
            inter_chunk_delay_ms: cli.inter_chunk_delay_ms,
            inter_recipient_delay_ms: cli.inter_recipient_delay_ms,
            delivery_log_path: cli.delivery_log,
        },
        transport,
    )?;
    let run_report = runner.run(&report.assignments).await?;
    info!(
        success = run_report.success_count,
        fail = run_report.fail_count,
        "done"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli).await
}
