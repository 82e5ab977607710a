use chrono::{TimeZone, Utc};
use livewall_core::{LiveItem, Platform, Ranking, Snapshot};

use super::*;

#[test]
fn parses_refresh_with_defaults() {
    let cli = Cli::try_parse_from(["livewall-cli", "refresh"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Refresh {
            query: None,
            max: None
        })
    ));
}

#[test]
fn parses_refresh_with_query_and_max() {
    let cli = Cli::try_parse_from(["livewall-cli", "refresh", "-q", "speedrun", "--max", "25"])
        .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Refresh { query, max }) => {
            assert_eq!(query.as_deref(), Some("speedrun"));
            assert_eq!(max, Some(25));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn refresh_rejects_out_of_range_max() {
    assert!(Cli::try_parse_from(["livewall-cli", "refresh", "--max", "0"]).is_err());
    assert!(Cli::try_parse_from(["livewall-cli", "refresh", "--max", "51"]).is_err());
    assert!(Cli::try_parse_from(["livewall-cli", "refresh", "--max", "ten"]).is_err());
}

#[test]
fn parses_show_summary() {
    let cli = Cli::try_parse_from(["livewall-cli", "show", "--summary"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Show { summary: true })
    ));
}

#[test]
fn parses_store_commands() {
    let ping = Cli::try_parse_from(["livewall-cli", "store", "ping"]).expect("valid");
    assert!(matches!(
        ping.command,
        Some(Commands::Store {
            command: StoreCommands::Ping
        })
    ));

    let migrate = Cli::try_parse_from(["livewall-cli", "store", "migrate"]).expect("valid");
    assert!(matches!(
        migrate.command,
        Some(Commands::Store {
            command: StoreCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["livewall-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

fn item(platform: Platform, native_id: &str) -> LiveItem {
    LiveItem {
        id: LiveItem::compose_id(platform, native_id),
        platform,
        title: String::new(),
        thumbnail_url: String::new(),
        viewers: 0,
        url: String::new(),
        raw: serde_json::Map::new(),
    }
}

#[test]
fn summarize_counts_per_platform() {
    let snapshot = Snapshot::assemble(
        vec![
            (
                Platform::YouTube,
                vec![item(Platform::YouTube, "a"), item(Platform::YouTube, "b")],
            ),
            (Platform::Twitch, Vec::new()),
        ],
        Ranking::PlatformOrder,
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    );
    assert_eq!(
        live::summarize(&snapshot),
        "2025-03-01T12:00:00Z 2 item(s), youtube: 2, twitch: 0"
    );
}

#[test]
fn summarize_without_platforms_is_just_the_header() {
    let snapshot = Snapshot::empty(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    assert_eq!(live::summarize(&snapshot), "2025-03-01T12:00:00Z 0 item(s)");
}
