use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_matrix_args() {
    let cli = Cli::try_parse_from([
        "mx",
        "matrix",
        "defs/orders.json",
        "--output",
        "json",
        "--limit",
        "5",
        "-v",
    ])
    .unwrap();

    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, PathBuf::from("."));
    match cli.command {
        Commands::Matrix(args) => {
            assert_eq!(args.file, PathBuf::from("defs/orders.json"));
            assert_eq!(args.output, OutputFormat::Json);
            assert_eq!(args.limit, Some(5));
            assert_eq!(args.max_combinations, None);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_validate_without_files() {
    let cli = Cli::try_parse_from(["mx", "-p", "project", "validate", "--strict"]).unwrap();
    assert_eq!(cli.global.project_dir, PathBuf::from("project"));
    match cli.command {
        Commands::Validate(args) => {
            assert!(args.files.is_empty());
            assert!(args.strict);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_inspect_requires_type() {
    assert!(Cli::try_parse_from(["mx", "inspect"]).is_err());
    assert!(Cli::try_parse_from(["mx", "inspect", "VARCHAR(MAX)"]).is_ok());
}
