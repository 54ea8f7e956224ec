use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;

const TEST_SHA256: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

fn hashcrack(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hashcrack"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to execute hashcrack")
}

fn write_config(dir: &Path, target: Option<&str>, chunk_size: usize) -> PathBuf {
    fs::create_dir_all(dir.join("data")).unwrap();
    fs::write(
        dir.join("data").join("sample_data.csv"),
        "test1\ntest2\ntest3\nhello\nworld\npassword\n123456\nadmin\nuser\ntest\n",
    )
    .unwrap();

    let target = match target {
        Some(hash) => format!("\"{}\"", hash),
        None => "null".to_string(),
    };
    let config = format!(
        r#"{{
  "general": {{ "worker_count": 2, "max_workers": 8, "chunk_size": {} }},
  "hash": {{ "algorithm": "SHA256" }},
  "input": {{ "csv_path": "data/sample_data.csv" }},
  "output": {{ "log_path": "logs/pipeline.log", "results_path": "logs/results.json" }},
  "target": {{ "hash_to_find": {} }}
}}"#,
        chunk_size, target
    );
    let path = dir.join("config.json");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn test_run_finds_match_and_writes_results() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), Some(TEST_SHA256), 3);

    let output = hashcrack(&["run", "config.json"], dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Match: test ->"));
    assert!(stdout.contains("Matches found: 1"));

    let results = fs::read_to_string(dir.path().join("logs").join("results.json")).unwrap();
    assert!(results.contains("\"original\": \"test\""));
    assert!(dir.path().join("logs").join("pipeline.log").exists());
}

#[test]
fn test_run_without_target_succeeds() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), None, 1000);

    let output = hashcrack(&["run", "config.json", "-j", "3"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Matches found: 0"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No target hash specified"));
}

#[test]
fn test_run_target_override() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), None, 2);
    let admin = "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918";

    let output = hashcrack(&["run", "config.json", "--target", admin], dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Match: admin ->"));
}

#[test]
fn test_run_invalid_target_exits_nonzero() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), Some("abc123"), 3);

    let output = hashcrack(&["run", "config.json"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("validation error"));
    assert!(!dir.path().join("logs").join("results.json").exists());
}

#[test]
fn test_run_missing_config_exits_nonzero() {
    let dir = tempdir().unwrap();
    let output = hashcrack(&["run", "missing.json"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("configuration error"));
}

#[test]
fn test_run_zero_workers_exits_nonzero() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), Some(TEST_SHA256), 3);

    let output = hashcrack(&["run", "config.json", "-j", "0"], dir.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_hash_command() {
    let dir = tempdir().unwrap();
    let output = hashcrack(&["hash", "test"], dir.path());
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), TEST_SHA256);
}

#[test]
fn test_hash_command_pbkdf2_is_salted() {
    let dir = tempdir().unwrap();
    let args = [
        "hash",
        "test",
        "--algorithm",
        "pbkdf2",
        "--iterations",
        "10",
        "--salt-length",
        "8",
    ];
    let first = hashcrack(&args, dir.path());
    let second = hashcrack(&args, dir.path());

    let first = String::from_utf8_lossy(&first.stdout).trim().to_string();
    let second = String::from_utf8_lossy(&second.stdout).trim().to_string();
    assert_eq!(first.len(), 16 + 64);
    assert_ne!(first, second);

    let verify = hashcrack(
        &[
            "verify",
            "test",
            &first,
            "--algorithm",
            "pbkdf2",
            "--iterations",
            "10",
            "--salt-length",
            "8",
        ],
        dir.path(),
    );
    assert!(verify.status.success());
}

#[test]
fn test_verify_command() {
    let dir = tempdir().unwrap();

    let ok = hashcrack(&["verify", "test", TEST_SHA256], dir.path());
    assert!(ok.status.success());
    assert_eq!(String::from_utf8_lossy(&ok.stdout).trim(), "match");

    let upper = TEST_SHA256.to_uppercase();
    let ok = hashcrack(&["verify", "test", &upper], dir.path());
    assert!(ok.status.success());

    let miss = hashcrack(&["verify", "nope", TEST_SHA256], dir.path());
    assert_eq!(miss.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&miss.stdout).trim(), "no match");
}

#[test]
fn test_hash_rejects_zero_pbkdf2_parameters() {
    let dir = tempdir().unwrap();

    for args in [
        ["hash", "x", "--algorithm", "pbkdf2", "--iterations", "0"],
        ["hash", "x", "--algorithm", "pbkdf2", "--salt-length", "0"],
    ] {
        let output = hashcrack(&args, dir.path());
        assert_eq!(output.status.code(), Some(2), "args: {:?}", args);
        assert!(output.stdout.is_empty());
    }

    let output = hashcrack(&["verify", "x", TEST_SHA256, "--iterations", "0"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}
