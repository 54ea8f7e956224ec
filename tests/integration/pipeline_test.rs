use hashcrack::search::parallel::CancelToken;
use hashcrack::{Algorithm, Hasher, Logger, MatchRecord, Pipeline, PipelineConfig, PipelineError};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

const TEST_SHA256: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

fn write_corpus(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.join("sample_data.csv");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn sample_lines() -> Vec<&'static str> {
    vec![
        "test1", "test2", "test3", "hello", "world", "password", "123456", "admin", "user", "test",
    ]
}

fn run(config: PipelineConfig, dir: &Path) -> hashcrack::Result<hashcrack::PipelineReport> {
    let logger = Logger::new(Some(&dir.join("pipeline.log")), false)?;
    Pipeline::new(config, logger)?.run()
}

#[test]
fn test_file_pipeline_finds_single_match() {
    let dir = tempdir().unwrap();
    let csv = write_corpus(dir.path(), &sample_lines());
    let results_path = dir.path().join("logs").join("results.json");
    let config = PipelineConfig::default()
        .with_workers(2)
        .with_chunk_size(3)
        .with_input(&csv)
        .with_results_path(&results_path)
        .with_target(TEST_SHA256);

    let report = run(config, dir.path()).unwrap();

    assert_eq!(report.match_count(), 1);
    assert_eq!(report.matches[0].original, "test");
    assert_eq!(report.valid_lines, 10);
    assert_eq!(report.chunks_loaded, 4);

    let persisted: Vec<MatchRecord> =
        serde_json::from_str(&fs::read_to_string(&results_path).unwrap()).unwrap();
    assert_eq!(persisted, report.matches);

    let log = fs::read_to_string(dir.path().join("pipeline.log")).unwrap();
    assert!(log.contains("Lines processed: 10"));
    assert!(log.contains("Matches found: 1"));
}

#[test]
fn test_blank_and_multi_column_lines() {
    let dir = tempdir().unwrap();
    let csv = write_corpus(
        dir.path(),
        &["", "test,first-column-wins", "   ", "  hello  ", "world,x,y"],
    );
    let config = PipelineConfig::default()
        .with_workers(3)
        .with_chunk_size(2)
        .with_input(&csv)
        .with_results_path(dir.path().join("results.json"))
        .with_target(TEST_SHA256);

    let report = run(config, dir.path()).unwrap();

    assert_eq!(report.valid_lines, 3);
    assert_eq!(report.match_count(), 1);
    assert_eq!(report.matches[0].original, "test");
}

#[test]
fn test_every_duplicate_is_recorded() {
    let dir = tempdir().unwrap();
    let mut lines = sample_lines();
    lines.extend(["test"; 5]);
    let csv = write_corpus(dir.path(), &lines);
    let config = PipelineConfig::default()
        .with_workers(4)
        .with_max_workers(2)
        .with_chunk_size(1)
        .with_input(&csv)
        .with_results_path(dir.path().join("results.json"))
        .with_target(TEST_SHA256);

    let report = run(config, dir.path()).unwrap();
    assert_eq!(report.match_count(), 6);
    assert!(report.matches.iter().all(|m| m.original == "test"));
}

#[test]
fn test_sha512_pipeline() {
    let dir = tempdir().unwrap();
    let csv = write_corpus(dir.path(), &sample_lines());
    let target = Hasher::quick_hash("password", Algorithm::Sha512);
    let config = PipelineConfig::default()
        .with_workers(2)
        .with_algorithm(Algorithm::Sha512)
        .with_input(&csv)
        .with_results_path(dir.path().join("results.json"))
        .with_target(target);

    let report = run(config, dir.path()).unwrap();
    assert_eq!(report.match_count(), 1);
    assert_eq!(report.matches[0].original, "password");
    assert_eq!(report.matches[0].algorithm, Algorithm::Sha512);
}

#[test]
fn test_wrong_length_target_is_rejected() {
    let dir = tempdir().unwrap();
    let csv = write_corpus(dir.path(), &sample_lines());
    let config = PipelineConfig::default()
        .with_algorithm(Algorithm::Sha384)
        .with_input(&csv)
        .with_results_path(dir.path().join("results.json"))
        .with_target(TEST_SHA256);

    let err = run(config, dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
}

#[test]
fn test_invalid_config_rejected_before_run() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig::default().with_chunk_size(0);
    let logger = Logger::new(Some(&dir.path().join("pipeline.log")), false).unwrap();

    let err = Pipeline::new(config, logger).unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
}

#[test]
fn test_cancel_during_run() {
    let dir = tempdir().unwrap();
    let lines: Vec<String> = (0..200).map(|i| format!("candidate-{}", i)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let csv = write_corpus(dir.path(), &refs);

    // PBKDF2 with a high iteration count keeps workers busy long enough to cancel.
    let target = Hasher::new(Algorithm::Pbkdf2, 1, 16).hash("absent", None);
    let config = PipelineConfig::default()
        .with_workers(2)
        .with_chunk_size(1)
        .with_algorithm(Algorithm::Pbkdf2)
        .with_pbkdf2(200_000, 16)
        .with_input(&csv)
        .with_results_path(dir.path().join("results.json"))
        .with_target(target);
    let logger = Logger::new(Some(&dir.path().join("pipeline.log")), false).unwrap();
    let pipeline = Pipeline::new(config, logger)
        .unwrap()
        .with_grace_period(Duration::from_secs(30));
    let cancel: CancelToken = pipeline.cancel_token();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        cancel.cancel();
    });
    let err = pipeline.run().unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, PipelineError::Interrupted));
    assert!(!dir.path().join("results.json").exists());
}
