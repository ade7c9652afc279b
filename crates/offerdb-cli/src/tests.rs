use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["offerdb-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["offerdb-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["offerdb-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn ingest_without_region_targets_all_regions() {
    let cli = Cli::try_parse_from(["offerdb-cli", "ingest"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ingest { region: None })
    ));
}

#[test]
fn ingest_with_region_filter() {
    let cli = Cli::try_parse_from(["offerdb-cli", "ingest", "--region", "97230"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ingest { region: Some(ref r) }) if r == "97230"
    ));
}

#[test]
fn parses_schedule_command() {
    let cli = Cli::try_parse_from(["offerdb-cli", "schedule"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Schedule)));
}

#[test]
fn fetch_requires_region() {
    assert!(Cli::try_parse_from(["offerdb-cli", "fetch"]).is_err());

    let cli = Cli::try_parse_from(["offerdb-cli", "fetch", "--region", "10001"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Fetch { ref region }) if region == "10001"
    ));
}

#[test]
fn regions_add_takes_positional_code() {
    let cli = Cli::try_parse_from(["offerdb-cli", "regions", "add", "60601"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Regions {
            command: RegionsCommands::Add { ref code }
        }) if code == "60601"
    ));
}

#[test]
fn regions_rename_takes_two_codes() {
    let cli = Cli::try_parse_from(["offerdb-cli", "regions", "rename", "60601", "60602"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Regions {
            command: RegionsCommands::Rename { ref from, ref to }
        }) if from == "60601" && to == "60602"
    ));
}

#[test]
fn regions_list_and_remove() {
    let list = Cli::try_parse_from(["offerdb-cli", "regions", "list"]).unwrap();
    assert!(matches!(
        list.command,
        Some(Commands::Regions {
            command: RegionsCommands::List
        })
    ));

    let remove = Cli::try_parse_from(["offerdb-cli", "regions", "remove", "97230"]).unwrap();
    assert!(matches!(
        remove.command,
        Some(Commands::Regions {
            command: RegionsCommands::Remove { .. }
        })
    ));
}

#[test]
fn offers_defaults_limit_to_fifty() {
    let cli = Cli::try_parse_from(["offerdb-cli", "offers"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Offers {
            region: None,
            tab: None,
            program_type: None,
            model_year: None,
            limit: 50
        })
    ));
}

#[test]
fn offers_accepts_filters() {
    let cli = Cli::try_parse_from([
        "offerdb-cli",
        "offers",
        "--region",
        "97230",
        "--tab",
        "Special Program",
        "--program-type",
        "AcuraConquest",
        "--limit",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Offers {
            region: Some(ref r),
            tab: Some(ref t),
            program_type: Some(ref p),
            model_year: None,
            limit: 5
        }) if r == "97230" && t == "Special Program" && p == "AcuraConquest"
    ));
}

#[test]
fn runs_defaults_and_detail() {
    let cli = Cli::try_parse_from(["offerdb-cli", "runs"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Runs { id: None, limit: 10 })
    ));

    let cli = Cli::try_parse_from(["offerdb-cli", "runs", "--id", "42"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Runs { id: Some(42), .. })
    ));
}

#[test]
fn offer_filter_parses_region_and_limit() {
    let filter = query::offer_filter(Some("97230"), None, None, Some("2024".into()), 20).unwrap();
    assert_eq!(filter.region_code.as_ref().map(offerdb_core::RegionCode::as_str), Some("97230"));
    assert_eq!(filter.model_year.as_deref(), Some("2024"));
    assert_eq!(filter.limit, Some(20));
}

#[test]
fn offer_filter_rejects_bad_input() {
    assert!(query::offer_filter(None, None, None, None, 0).is_err());
    assert!(query::offer_filter(Some("   "), None, None, None, 10).is_err());
}
