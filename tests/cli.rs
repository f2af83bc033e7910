use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn feed_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    for line in lines {
        writeln!(file, "{}", line).expect("write");
    }
    file
}

fn fluxview() -> Command {
    Command::cargo_bin("fluxview").expect("binary built")
}

#[test]
fn headless_replay_prints_each_sample() {
    let file = feed_file(&[
        r#"{"magneticField":12.5,"rpm":1200,"peakRpm":1500}"#,
        r#"{"rpm":1300}"#,
        "garbage 42.3 text",
        "no number here",
    ]);

    fluxview()
        .args(["--headless", "--interval-ms", "0", "--replay"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Mag: 12.50 mT, RPM: 1200, Peak RPM: 1500",
        ))
        .stdout(predicate::str::contains(
            "Mag: 42.30 mT, RPM: 1300, Peak RPM: 1500",
        ))
        .stdout(predicate::str::contains("2 samples from replay"));
}

#[test]
fn headless_replay_converts_raw_sensor_frames() {
    let file = feed_file(&[r#"{"analog":0,"hall_mT":4095}"#, r#"{"analog":0,"hall_mT":0}"#]);

    fluxview()
        .args(["--headless", "--interval-ms", "0", "--replay"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Mag: 100.00 mT"))
        .stdout(predicate::str::contains("Mag: -100.00 mT"))
        .stdout(predicate::str::contains("2 samples"));
}

#[test]
fn replay_from_stdin() {
    fluxview()
        .args(["--headless", "--interval-ms", "0", "--replay", "-"])
        .write_stdin("v 1.5\n\nv 2.5\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mag: 1.50 mT"))
        .stdout(predicate::str::contains("Mag: 2.50 mT"))
        .stdout(predicate::str::contains("2 samples"));
}

#[test]
fn json_without_field_is_not_plotted() {
    let file = feed_file(&["42.3", "[7, 8]", r#"{"rpm":"1200"}"#, "v 9.5"]);

    fluxview()
        .args(["--headless", "--interval-ms", "0", "--replay"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Mag: 9.50 mT, RPM: 0, Peak RPM: 0"))
        .stdout(predicate::str::contains("1 samples from replay"));
}

#[test]
fn malformed_url_fails_to_connect() {
    fluxview()
        .args(["--headless", "--url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to connect to not a url"));
}

#[test]
fn missing_replay_file_fails() {
    fluxview()
        .args(["--headless", "--replay", "/no/such/feed.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open file"));
}

#[test]
fn invalid_window_is_rejected() {
    let file = feed_file(&["1.0"]);
    fluxview()
        .args(["--headless", "--window", "0", "--replay"])
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("window must be at least 1"));
}

#[test]
fn url_and_replay_conflict() {
    fluxview()
        .args(["--headless", "--url", "ws://localhost:1", "--replay", "x.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
