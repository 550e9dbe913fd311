use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use parkon_core::Environment;

use super::*;

/// Config whose database and TfL feed both point at a closed local port.
fn offline_config(database_url: Option<&str>) -> AppConfig {
    AppConfig {
        database_url: database_url.map(ToOwned::to_owned),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "warn".to_string(),
        inventory_path: None,
        tfl_api_key: None,
        tfl_base_url: "http://127.0.0.1:1".to_string(),
        geocoder_base_url: "http://127.0.0.1:1".to_string(),
        db_max_connections: 1,
        db_min_connections: 0,
        db_acquire_timeout_secs: 1,
        provider_timeout_secs: 1,
        provider_deadline_secs: 2,
        user_agent: "parkon-cli-test/0.1".to_string(),
        max_radius_km: 16.0934,
        cache_retention_days: 30,
    }
}

fn central_london() -> RawSearchParams {
    RawSearchParams {
        latitude: Some("51.5074".to_string()),
        longitude: Some("-0.1278".to_string()),
        radius_km: Some("2".to_string()),
        ..RawSearchParams::default()
    }
}

const CLOSED_PORT_DB: &str = "postgres://parkon@127.0.0.1:1/parkon";

#[test]
fn parses_search_with_negative_longitude() {
    let cli = Cli::try_parse_from([
        "parkon-cli",
        "search",
        "--latitude",
        "51.5074",
        "--longitude",
        "-0.1278",
        "--radius-km",
        "2",
        "--spot-type",
        "electric",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Search {
            latitude,
            longitude,
            radius_km,
            radius_miles,
            spot_type,
            realtime,
            ..
        }) => {
            assert_eq!(latitude, "51.5074");
            assert_eq!(longitude, "-0.1278");
            assert_eq!(radius_km.as_deref(), Some("2"));
            assert!(radius_miles.is_none());
            assert_eq!(spot_type.as_deref(), Some("electric"));
            assert!(!realtime);
        }
        _ => panic!("expected search command"),
    }
}

#[test]
fn search_rejects_both_radius_units() {
    let result = Cli::try_parse_from([
        "parkon-cli",
        "search",
        "--latitude",
        "51.5",
        "--longitude",
        "0.1",
        "--radius-km",
        "1",
        "--radius-miles",
        "1",
    ]);
    assert!(result.is_err());
}

#[test]
fn search_requires_coordinates() {
    let result = Cli::try_parse_from(["parkon-cli", "search", "--latitude", "51.5"]);
    assert!(result.is_err());
}

#[test]
fn parses_geocode_command() {
    let cli = Cli::try_parse_from(["parkon-cli", "geocode", "SW1A 1AA"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Geocode { ref postcode }) if postcode == "SW1A 1AA"
    ));
}

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["parkon-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Migrate)));
}

#[test]
fn parses_prune_cache_days() {
    let cli = Cli::try_parse_from(["parkon-cli", "prune-cache", "--days", "7"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::PruneCache { days: Some(7) })
    ));
}

#[test]
fn history_defaults_to_ten() {
    let cli = Cli::try_parse_from(["parkon-cli", "history"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::History { limit: 10 })));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["parkon-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn gbp_renders_as_pound_sign() {
    assert_eq!(currency_symbol("GBP"), "£");
    assert_eq!(currency_symbol("EUR"), "EUR");
}

#[tokio::test]
async fn recorded_search_succeeds_when_database_is_down() {
    let config = offline_config(Some(CLOSED_PORT_DB));
    run_search(
        &config,
        &central_london(),
        CallerPrivilege::Anonymous,
        true,
        true,
    )
    .await
    .expect("search must not fail on a cache write error");
}

#[tokio::test]
async fn record_searches_saves_nothing_without_a_reachable_database() {
    let recorded = MemorySink::new();
    let service =
        SearchService::from_app_config(&offline_config(None), Arc::new(recorded.clone()))
            .expect("service");
    service
        .search(&central_london(), CallerPrivilege::Anonymous)
        .await
        .expect("search");
    assert_eq!(recorded.records().len(), 1);

    assert_eq!(
        record_searches(&offline_config(Some(CLOSED_PORT_DB)), &recorded).await,
        0
    );
    assert_eq!(record_searches(&offline_config(None), &recorded).await, 0);
}

#[tokio::test]
async fn connect_requires_database_url() {
    let err = connect(&offline_config(None))
        .await
        .expect_err("no DATABASE_URL configured");
    assert!(err.to_string().contains("DATABASE_URL"), "got {err}");
}

#[tokio::test]
async fn search_runs_without_database_url() {
    let config = offline_config(None);
    run_search(
        &config,
        &central_london(),
        CallerPrivilege::Anonymous,
        false,
        false,
    )
    .await
    .expect("search needs no database");
}
