//! End-to-end pipeline tests: roster snapshot over a mocked REST API,
//! pairing resolution, and dispatch with the real DM transport.

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

use giftwire_dispatch::{DiscordDmClient, DiscordDmConfig, DispatchRunConfig, DispatchRunner};
use giftwire_roster::{
    parse_pairing_rows, resolve_assignments, AliasIndex, RosterClient, RosterClientConfig,
};

fn mock_roster(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/users/@me/guilds");
        then.status(200)
            .json_body(json!([{"id": "42", "name": "Winter Guild"}]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/guilds/42/members");
        then.status(200).json_body(json!([
            {"user": {"id": "1", "username": "alice"}},
            {"nick": "Bobby", "user": {"id": "2", "username": "bob"}}
        ]));
    });
}

fn roster_client(server: &MockServer) -> RosterClient {
    RosterClient::new(RosterClientConfig {
        api_base: server.base_url(),
        bot_token: "test-token".to_string(),
        http_timeout_ms: 5_000,
        ..RosterClientConfig::default()
    })
    .expect("roster client")
}

fn dm_client(server: &MockServer) -> DiscordDmClient {
    DiscordDmClient::new(DiscordDmConfig {
        api_base: server.base_url(),
        bot_token: "test-token".to_string(),
        http_timeout_ms: 5_000,
    })
    .expect("dm client")
}

const PAIRING_CSV: &str = "\u{feff}username,target\nalice,Bob\n@Bobby,Alice\ncarol,Dave\n";

#[tokio::test]
async fn roster_to_dispatch_dry_run_sends_nothing() {
    let server = MockServer::start();
    mock_roster(&server);
    let tempdir = tempfile::tempdir().expect("tempdir");
    let log_path = tempdir.path().join("dm_log.txt");

    let guild = roster_client(&server)
        .resolve_guild("42")
        .await
        .expect("guild");
    assert_eq!(guild.name, "Winter Guild");
    let members = roster_client(&server)
        .fetch_members("42")
        .await
        .expect("members");
    let index = AliasIndex::build(&members);

    let rows = parse_pairing_rows(PAIRING_CSV).expect("rows");
    let resolved = resolve_assignments(&rows, &index);
    assert_eq!(resolved.assignments.len(), 2);
    assert_eq!(resolved.assignments[0].giver.user_id, "1");
    assert_eq!(resolved.assignments[0].target_name, "Bob");
    assert_eq!(resolved.assignments[1].giver.user_id, "2");
    assert_eq!(resolved.assignments[1].target_name, "Alice");
    assert_eq!(resolved.stats.rows_skipped, 1);

    // No DM endpoints are mocked: a dry run that reached the transport
    // would fail loudly instead of reporting success.
    let runner = DispatchRunner::new(
        DispatchRunConfig {
            dry_run: true,
            inter_chunk_delay_ms: 0,
            inter_recipient_delay_ms: 0,
            delivery_log_path: log_path.clone(),
            ..DispatchRunConfig::default()
        },
        dm_client(&server),
    )
    .expect("runner");
    let report = runner.run(&resolved.assignments).await.expect("run");

    assert_eq!(report.success_count, 2);
    assert_eq!(report.fail_count, 0);
    let log = std::fs::read_to_string(&log_path).expect("log");
    assert!(log.lines().next().expect("line").starts_with("DRY_RUN would DM alice"));
}

#[tokio::test]
async fn roster_to_dispatch_delivers_one_dm_per_assignment() {
    let server = MockServer::start();
    mock_roster(&server);
    let open_alice = server.mock(|when, then| {
        when.method(POST)
            .path("/users/@me/channels")
            .json_body(json!({"recipient_id": "1"}));
        then.status(200).json_body(json!({"id": "dm-1"}));
    });
    let open_bob = server.mock(|when, then| {
        when.method(POST)
            .path("/users/@me/channels")
            .json_body(json!({"recipient_id": "2"}));
        then.status(200).json_body(json!({"id": "dm-2"}));
    });
    let send_alice = server.mock(|when, then| {
        when.method(POST).path("/channels/dm-1/messages");
        then.status(200).json_body(json!({"id": "m1"}));
    });
    let send_bob = server.mock(|when, then| {
        when.method(POST).path("/channels/dm-2/messages");
        then.status(200).json_body(json!({"id": "m2"}));
    });
    let tempdir = tempfile::tempdir().expect("tempdir");
    let log_path = tempdir.path().join("dm_log.txt");

    let members = roster_client(&server)
        .fetch_members("42")
        .await
        .expect("members");
    let index = AliasIndex::build(&members);
    let rows = parse_pairing_rows(PAIRING_CSV).expect("rows");
    let resolved = resolve_assignments(&rows, &index);

    let runner = DispatchRunner::new(
        DispatchRunConfig {
            inter_chunk_delay_ms: 0,
            inter_recipient_delay_ms: 0,
            delivery_log_path: log_path.clone(),
            ..DispatchRunConfig::default()
        },
        dm_client(&server),
    )
    .expect("runner");
    let report = runner.run(&resolved.assignments).await.expect("run");

    open_alice.assert();
    open_bob.assert();
    send_alice.assert();
    send_bob.assert();
    assert_eq!(report.success_count, 2);
    let log = std::fs::read_to_string(&log_path).expect("log");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines, vec!["Sent to alice (1)", "Sent to Bobby (2)"]);
}

#[test]
fn pairing_table_with_wrong_headers_aborts_before_any_send() {
    let error = parse_pairing_rows("name,giftee\nalice,Bob\n")
        .expect_err("missing required columns must be fatal");
    assert!(error.to_string().contains("username"));
}
