//! End-to-end tests for the `cx` binary against a canned HTTP server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};

use assert_cmd::Command;
use predicates::prelude::*;

const STACKS: &str = r#"{"response":[{"uid":"s-1","name":"shop","environment":"staging","status":1,"health":3}]}"#;

/// Serves `responses` in order, one connection each, and returns the
/// request lines it saw.
fn canned_server(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}/api/3", listener.local_addr().expect("addr"));
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).expect("header");
                if header.trim().is_empty() {
                    break;
                }
                if let Some((_, value)) = header
                    .split_once(':')
                    .filter(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                {
                    content_length = value.trim().parse().expect("content length");
                }
            }
            let mut body_in = vec![0; content_length];
            reader.read_exact(&mut body_in).expect("body");
            seen.push(request_line.trim_end().to_string());

            let reply = format!(
                "HTTP/1.1 {status} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(reply.as_bytes()).expect("write");
        }
        seen
    });
    (url, handle)
}

fn cx(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cx").expect("binary");
    cmd.env("CX_CONFIG", config)
        .env_remove("CX_PROFILE")
        .env_remove("CX_API_URL")
        .env_remove("CX_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn usage_error_exits_with_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    cx(&dir.path().join("profiles.toml"))
        .args(["stacks", "frobnicate"])
        .assert()
        .code(2);
}

#[test]
fn missing_credentials_exit_with_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    cx(&dir.path().join("profiles.toml"))
        .args(["stacks", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: configuration error"));
}

#[test]
fn lists_stacks_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (url, server) = canned_server(vec![(200, STACKS)]);

    let output = cx(&dir.path().join("profiles.toml"))
        .args(["--api-url", &url, "--token", "t", "-f", "json", "stacks", "list"])
        .output()
        .expect("run cx");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["stacks"][0]["name"], "shop");
    let seen = server.join().expect("server thread");
    assert!(seen[0].starts_with("GET /api/3/stacks?page=1"));
}

#[test]
fn successful_action_exits_with_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (url, server) = canned_server(vec![
        (200, STACKS),
        (
            200,
            r#"{"response":{"id":1,"resource_type":"stack","resource_id":"s-1","action":"restart","started_at":"2026-01-01T00:00:00Z","finished_at":"2026-01-01T00:00:05Z","finished_success":true}}"#,
        ),
    ]);

    cx(&dir.path().join("profiles.toml"))
        .args(["--api-url", &url, "--token", "t", "stacks", "restart", "-s", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restarting shop (staging) done!"))
        .stdout(predicate::str::ends_with("Success!\n"));

    let seen = server.join().expect("server thread");
    assert_eq!(seen[1], "POST /api/3/stacks/s-1/actions HTTP/1.1");
}

#[test]
fn failed_action_is_reported_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (url, server) = canned_server(vec![
        (200, STACKS),
        (
            200,
            r#"{"response":{"id":2,"resource_type":"stack","resource_id":"s-1","action":"redeploy","started_at":"2026-01-01T00:00:00Z","finished_at":"2026-01-01T00:00:05Z","finished_success":false}}"#,
        ),
    ]);

    let output = cx(&dir.path().join("profiles.toml"))
        .args(["--api-url", &url, "--token", "t", "stacks", "redeploy", "-s", "shop"])
        .output()
        .expect("run cx");
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).expect("utf-8");
    let stderr = String::from_utf8(output.stderr).expect("utf-8");
    assert_eq!(stdout.matches("Failed!").count(), 1);
    assert!(!stderr.contains("Failed!"));
    server.join().expect("server thread");
}

#[test]
fn ambiguous_stack_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (url, server) = canned_server(vec![(
        200,
        r#"{"response":[{"uid":"s-1","name":"shop","environment":"staging","status":1,"health":3},{"uid":"s-2","name":"shopfront","environment":"staging","status":1,"health":3}]}"#,
    )]);

    cx(&dir.path().join("profiles.toml"))
        .args(["--api-url", &url, "--token", "t", "stacks", "restart", "-s", "sho"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
    server.join().expect("server thread");
}

#[test]
fn profiles_add_then_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("profiles.toml");

    cx(&config)
        .args(["profiles", "add", "work", "--api-url", "https://app.example.com/api/3", "--token", "secret"])
        .assert()
        .success();

    cx(&config)
        .args(["profiles", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* work"))
        .stdout(predicate::str::contains("secret").not());
}

const BUILDING: &str = r#"{"response":{"uid":"s-1","name":"shop","environment":"staging","status":6,"health":1}}"#;

#[test]
fn create_reports_failed_build() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (url, server) = canned_server(vec![
        (200, BUILDING),
        (
            200,
            r#"{"response":{"uid":"s-1","name":"shop","environment":"staging","status":2,"health":4}}"#,
        ),
    ]);

    cx(&dir.path().join("profiles.toml"))
        .args(["--api-url", &url, "--token", "t", "stacks", "create", "--name", "shop", "-e", "staging"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("Building shop (staging)"))
        .stdout(predicate::str::ends_with("\n"))
        .stderr(predicate::str::contains("Error: build failed"));

    let seen = server.join().expect("server thread");
    assert_eq!(seen[0], "POST /api/3/stacks HTTP/1.1");
    assert_eq!(seen[1], "GET /api/3/stacks/s-1 HTTP/1.1");
}

#[test]
fn create_gives_up_after_timeout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (url, server) = canned_server(vec![(200, BUILDING), (200, BUILDING)]);

    cx(&dir.path().join("profiles.toml"))
        .args([
            "--api-url", &url, "--token", "t", "stacks", "create", "--name", "shop", "-e", "staging",
            "--timeout", "1",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timed-out after 1 second(s)"));
    server.join().expect("server thread");
}

#[test]
fn listing_named_stacks_resolves_each_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (url, server) = canned_server(vec![(200, STACKS), (200, STACKS)]);

    cx(&dir.path().join("profiles.toml"))
        .args(["--api-url", &url, "--token", "t", "stacks", "list", "shop", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shop").count(2));
    assert_eq!(server.join().expect("server thread").len(), 2);
}

#[test]
fn listing_unknown_stack_name_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (url, server) = canned_server(vec![(200, STACKS), (200, STACKS)]);

    cx(&dir.path().join("profiles.toml"))
        .args(["--api-url", &url, "--token", "t", "stacks", "list", "shop", "nosuch"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nosuch not found"));
    assert_eq!(server.join().expect("server thread").len(), 2);
}
