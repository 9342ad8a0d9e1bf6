use clap::{CommandFactory, FromArgMatches, Parser};
use playforge::config::Config;
use playforge::optimizer::MoveKind;
use std::fs;

#[derive(Parser, Debug)]
struct Harness {
    #[command(flatten)]
    config: Config,
}

fn parse(args: &[&str]) -> (Config, clap::ArgMatches) {
    let matches = Harness::command()
        .try_get_matches_from(std::iter::once("playforge").chain(args.iter().copied()))
        .unwrap();
    let harness = Harness::from_arg_matches(&matches).unwrap();
    (harness.config, matches)
}

#[test]
fn test_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.search.cycles, 0);
    assert_eq!(cfg.search.inner_steps, 200_000);
    assert_eq!(cfg.search.churn_factor, 20);
    assert!(cfg.search.discard_same_plaintexts);
    assert_eq!(cfg.cipher.dim, 5);
    assert_eq!(cfg.cipher.separator, 'X');
    assert_eq!(cfg.cipher.separator_replacement, 'Z');

    let kinds = cfg.transforms.enabled_kinds();
    assert_eq!(kinds.len(), 7);
    assert!(!kinds.contains(&MoveKind::Swap3));
}

#[test]
fn test_cli_defaults_match_struct_defaults() {
    let (cli, _) = parse(&[]);
    let plain = Config::default();
    assert_eq!(
        serde_json::to_value(&cli).unwrap(),
        serde_json::to_value(&plain).unwrap()
    );
}

#[test]
fn test_partial_json_fills_defaults() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{ "search": { "cycles": 5, "threads": 2 }, "transforms": { "move_swap3": true } }"#,
    )
    .unwrap();

    let cfg = Config::load_from_file(&path).unwrap();
    assert_eq!(cfg.search.cycles, 5);
    assert_eq!(cfg.search.threads, 2);
    assert_eq!(cfg.search.inner_steps, 200_000);
    assert!(cfg.transforms.enabled_kinds().contains(&MoveKind::Swap3));
}

#[test]
fn test_explicit_flags_override_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{ "search": { "cycles": 5, "inner_steps": 1000, "seed": 1 } }"#,
    )
    .unwrap();

    let (cli, matches) = parse(&["--inner-steps", "50", "--move-swap2", "false"]);
    let mut cfg = Config::load_from_file(&path).unwrap();
    cfg.merge_from_cli(&cli, &matches);

    assert_eq!(cfg.search.inner_steps, 50);
    assert_eq!(cfg.search.cycles, 5, "default flag must not clobber the file");
    assert_eq!(cfg.search.seed, Some(1));
    assert!(!cfg.transforms.move_swap2);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(Config::load_from_file(&path).is_err());
}
