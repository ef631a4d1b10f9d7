//! Tests for process startup: required configuration and refusal paths.

use std::process::{Command, Output, Stdio};
use std::time::Duration;

const SECRET: &str = "startup-test-secret-that-is-long-enough";

fn snippetbox() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_snippetbox"));
    cmd.env_remove("JWT_SECRET")
        .args(["--database", ":memory:", "--port", "0"]);
    cmd
}

fn combined_output(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_missing_secret_refuses_to_start() {
    let output = snippetbox().output().unwrap();

    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("JWT_SECRET"), "output: {}", text);
    assert!(text.contains("required"), "output: {}", text);
}

#[test]
fn test_short_secret_refuses_to_start() {
    let output = snippetbox().env("JWT_SECRET", "short").output().unwrap();

    assert!(!output.status.success());
    assert!(combined_output(&output).contains("shorter than 32"));
}

#[test]
fn test_plain_http_origin_refuses_to_start() {
    let output = snippetbox()
        .env("JWT_SECRET", SECRET)
        .args(["--origin", "http://snippets.example.com"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(combined_output(&output).contains("HTTPS"));
}

#[test]
fn test_secret_file_is_accepted() {
    let path = std::env::temp_dir().join(format!("snippetbox-secret-{}", std::process::id()));
    std::fs::write(&path, format!("{}\n", SECRET)).unwrap();

    let mut child = snippetbox()
        .args(["--jwt-secret-file", path.to_str().unwrap()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    std::thread::sleep(Duration::from_millis(500));
    let still_running = child.try_wait().unwrap().is_none();
    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_file(&path);

    assert!(still_running, "server should keep running with a valid secret file");
}

#[test]
fn test_localhost_origin_starts() {
    let mut child = snippetbox()
        .env("JWT_SECRET", SECRET)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    std::thread::sleep(Duration::from_millis(500));
    let still_running = child.try_wait().unwrap().is_none();
    let _ = child.kill();
    let _ = child.wait();

    assert!(still_running, "server should keep running");
}
