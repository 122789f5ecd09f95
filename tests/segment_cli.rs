// Drives the `segment` subcommand of the compiled binary. It needs no TTY, so
// unlike the interactive smoke test it runs by default.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::tempdir;

fn keystride(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("keystride").unwrap();
    cmd.env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("KEYSTRIDE_LOG");
    cmd
}

fn stdout_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

fn sample_book() -> String {
    [
        "The lamp was lit and the room was quiet. ".repeat(8),
        "Is it late? Yes, it's nearly midnight! ".repeat(8),
        "Cost: $40 (approx.) & rising; see p. 12. ".repeat(8),
        "Too short to keep.".to_string(),
    ]
    .join("\r\n\r\n")
}

#[test]
fn segment_writes_tiered_corpus() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    let input = work.path().join("book.txt");
    let output = work.path().join("corpus").join("passages.json");
    fs::write(&input, sample_book()).unwrap();

    let stdout = stdout_of(
        keystride(home.path())
            .arg("segment")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .assert()
            .success(),
    );
    assert!(stdout.contains("wrote 3 passages"), "{stdout}");

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["passages"]["easy"].as_array().unwrap().len(), 1);
    assert_eq!(json["passages"]["medium"].as_array().unwrap().len(), 1);
    assert_eq!(json["passages"]["hard"].as_array().unwrap().len(), 1);
}

#[test]
fn segment_respects_length_bounds() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    let input = work.path().join("book.txt");
    let output = work.path().join("passages.json");
    fs::write(&input, sample_book()).unwrap();

    let stdout = stdout_of(
        keystride(home.path())
            .args(["segment", "--min-length", "400"])
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .assert()
            .success(),
    );
    assert!(stdout.contains("wrote 0 passages"), "{stdout}");
}

#[test]
fn segment_missing_input_fails() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();

    let assert = keystride(home.path())
        .arg("segment")
        .arg(work.path().join("missing.txt"))
        .arg("-o")
        .arg(work.path().join("out.json"))
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("CorpusRead"), "{stderr}");
    assert!(!work.path().join("out.json").exists());
}

// Config location follows the XDG layout only on Linux
#[cfg(target_os = "linux")]
#[test]
fn save_config_persists_overrides() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    let input = work.path().join("book.txt");
    fs::write(&input, sample_book()).unwrap();

    keystride(home.path())
        .args(["-d", "hard", "-n", "4", "--save-config", "segment"])
        .arg(&input)
        .arg("-o")
        .arg(work.path().join("passages.json"))
        .assert()
        .success();

    let config_path = home
        .path()
        .join(".config")
        .join("keystride")
        .join("config.json");
    let json: Value = serde_json::from_str(&fs::read_to_string(config_path).unwrap()).unwrap();
    assert_eq!(json["difficulty"], "hard");
    assert_eq!(json["passages_per_test"], 4);
}
