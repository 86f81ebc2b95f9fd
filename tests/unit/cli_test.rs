//! Tests for command-line parsing and config layering

use std::path::PathBuf;

use clap::Parser;
use service_poller::cli::Cli;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("service-poller").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_short_flags_and_positional_services() {
    let cli = parse(&["-n", "3", "-t", "2", "-o", "out.jsonl", "alpha", "beta"]);
    assert_eq!(cli.threads, Some(3));
    assert_eq!(cli.interval_secs, Some(2));
    assert_eq!(cli.output, Some(PathBuf::from("out.jsonl")));
    assert_eq!(cli.services, vec!["alpha".to_string(), "beta".to_string()]);

    let cfg = cli.to_config().unwrap();
    assert_eq!(cfg.worker_count, 3);
    assert_eq!(cfg.interval_secs, 2);
    assert_eq!(cfg.services.len(), 2);
}

#[test]
fn test_no_arguments_gives_defaults() {
    let cfg = Cli::default().to_config().unwrap();
    assert_eq!(cfg.worker_count, 5);
    assert_eq!(cfg.interval_secs, 10);
    assert!(cfg.services.is_empty());
}

#[test]
fn test_zero_threads_rejected() {
    let cli = parse(&["--threads", "0"]);
    assert!(cli.to_config().is_err());
}

#[test]
fn test_non_numeric_interval_rejected() {
    let result = Cli::try_parse_from(["service-poller", "--time", "soon"]);
    assert!(result.is_err());
}

#[test]
fn test_command_line_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("poller.json");
    std::fs::write(
        &path,
        r#"{"worker_count": 8, "interval_secs": 30, "services": ["from-file"]}"#,
    )
    .unwrap();

    let cli = parse(&["--config", path.to_str().unwrap(), "-n", "2"]);
    let cfg = cli.to_config().unwrap();
    assert_eq!(cfg.worker_count, 2);
    assert_eq!(cfg.interval_secs, 30);
    assert_eq!(cfg.services, vec!["from-file".to_string()]);
}

#[test]
fn test_list_flag() {
    assert!(parse(&["--list"]).list);
    assert!(!parse(&[]).list);
}
