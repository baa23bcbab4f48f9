use super::*;

#[test]
fn parses_audit_command() {
    let cli = Cli::try_parse_from(["geofence-cli", "audit"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Audit)));
}

#[test]
fn parses_resolve_command() {
    let cli = Cli::try_parse_from([
        "geofence-cli",
        "resolve",
        "--store-id",
        "42",
        "--polygon",
        "area.json",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Resolve {
        store_id,
        polygon,
        save,
    }) = cli.command
    else {
        panic!("expected resolve command");
    };
    assert_eq!(store_id, 42);
    assert_eq!(polygon, PathBuf::from("area.json"));
    assert!(!save);
}

#[test]
fn parses_resolve_with_save() {
    let cli = Cli::try_parse_from([
        "geofence-cli",
        "resolve",
        "--store-id",
        "7",
        "--polygon",
        "p.json",
        "--save",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Resolve { save: true, .. })
    ));
}

#[test]
fn resolve_requires_store_id() {
    assert!(Cli::try_parse_from(["geofence-cli", "resolve", "--polygon", "p.json"]).is_err());
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["geofence-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}
