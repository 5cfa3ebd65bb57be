//! CLI tests

use crate::{Cli, Commands, ConfigAction, OutputFormat};
use clap::{CommandFactory, Parser};

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_lifecycle_commands() {
    assert!(matches!(Cli::try_parse_from(["keyward", "generate"]).unwrap().command, Commands::Generate));
    assert!(matches!(Cli::try_parse_from(["keyward", "register"]).unwrap().command, Commands::Register));
    assert!(matches!(Cli::try_parse_from(["keyward", "unregister"]).unwrap().command, Commands::Unregister));
    assert!(matches!(Cli::try_parse_from(["keyward", "status"]).unwrap().command, Commands::Status));
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["keyward", "status", "--format", "json", "-q"]).unwrap();
    assert!(cli.format == OutputFormat::Json);
    assert!(cli.quiet);
}

#[test]
fn test_parse_config_set() {
    let cli = Cli::try_parse_from(["keyward", "config", "set", "bridge.url", "http://localhost"]).unwrap();
    match cli.command {
        Commands::Config {
            action: ConfigAction::Set { key, value },
        } => {
            assert_eq!(key, "bridge.url");
            assert_eq!(value, "http://localhost");
        }
        _ => panic!("expected config set"),
    }
}

#[test]
fn test_unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["keyward", "status", "--format", "yaml"]).is_err());
}
