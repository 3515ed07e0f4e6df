//! Runs the `kinship` binary against temporary files

use kinship_cli::{KinshipConfig, cli};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const FAMILY: &str = "\
F\tP40\tA
F\tP40\tB
F\tP21\tQ6581097
F\tP570\t1950-03-01
broken
";

fn kinship(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kinship"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("KINSHIP_CONFIG_PATH")
        .env_remove("KINSHIP_LOG_FORMAT")
        .env_remove("KINSHIP_MAX_MALFORMED_REPORTS")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_complete_command_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("people.nt"), FAMILY).unwrap();

    let output = kinship(
        dir.path(),
        &["complete", "people.nt", "facts.tsv", "card.tsv", "--report", "run.json"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Wrote 6 facts to facts.tsv"), "{stdout}");
    assert!(stdout.contains("Wrote 7 cardinality assertions for 1 people"), "{stdout}");
    assert!(stdout.contains("Skipped 1 malformed lines"), "{stdout}");

    let cardinalities = fs::read_to_string(dir.path().join("card.tsv")).unwrap();
    assert!(cardinalities.contains("F|P20\thasExactCardinality\t1\n"));
    assert!(dir.path().join("run.json").exists());
}

#[test]
fn test_report_path_from_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("people.nt"), FAMILY).unwrap();
    fs::write(
        dir.path().join("kinship.toml"),
        "[output]\nwrite_report_path = \"configured.json\"\n[logging]\nformat = \"json\"\n",
    )
    .unwrap();

    let output = kinship(
        dir.path(),
        &["complete", "people.nt", "facts.tsv", "card.tsv"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.path().join("configured.json").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"message\":\"Loaded configuration\""), "{stderr}");
}

#[test]
fn test_invalid_config_fails_the_run() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.toml"), "[loader\n").unwrap();

    let output = kinship(dir.path(), &["--config", "bad.toml", "explain"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"), "{stderr}");
}

#[test]
fn test_missing_input_fails_with_context() {
    let dir = TempDir::new().unwrap();
    let output = kinship(
        dir.path(),
        &["complete", "absent.nt", "facts.tsv", "card.tsv"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to complete facts from absent.nt"), "{stderr}");
}

#[test]
fn test_filter_command() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("people.nt"), FAMILY).unwrap();

    let output = kinship(dir.path(), &["filter", "people.nt", "filtered.tsv"]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("filtered.tsv")).unwrap(),
        "F\tP40\tA\nF\tP40\tB\n"
    );
}

#[test]
fn test_explain_command() {
    let dir = TempDir::new().unwrap();
    let output = kinship(dir.path(), &["explain"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), cli::explain());
}

#[test]
fn test_complete_without_report() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("people.nt"), FAMILY).unwrap();

    let report = cli::complete(
        &KinshipConfig::default(),
        &dir.path().join("people.nt"),
        &dir.path().join("facts.tsv"),
        &dir.path().join("card.tsv"),
        None,
    )
    .unwrap();

    assert_eq!(report.people, 1);
    assert_eq!(report.load.malformed, 1);
    let summary = cli::format_summary(&report, Path::new("facts.tsv"), Path::new("card.tsv"));
    assert!(summary.contains("P3373  sibling-of     2"), "{summary}");
}
