//! End-to-end tests for the bootstrap binary's fast paths.
//!
//! Only paths that terminate quickly are exercised here: configuration
//! failures and the HTTP probe. The full local and remote sequences need a
//! container image around them and live in the ignored tests.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;

fn bootstrap() -> Command {
    let mut cmd = Command::cargo_bin("ficha-bootstrap").unwrap();
    // Drop ambient configuration so tests control the whole environment.
    for key in ["DB_HOST", "DB_PORT", "DB_USER", "DB_PASS", "DB_NAME", "DB_SSL_CA"] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn remote_mode_fails_fast_without_connection_coordinates() {
    bootstrap()
        .arg("remote")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DB_HOST"));
}

#[test]
fn remote_mode_rejects_malformed_port() {
    bootstrap()
        .arg("remote")
        .env("DB_HOST", "db.example.com")
        .env("DB_PORT", "silly")
        .env("DB_USER", "app")
        .env("DB_PASS", "pw")
        .env("DB_NAME", "clinic")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DB_PORT"));
}

#[test]
fn probe_succeeds_against_listening_server() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    // Minimal single-request responder standing in for the application.
    let responder = std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0_u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            );
        }
    });

    bootstrap()
        .arg("probe")
        .arg("--port")
        .arg(port.to_string())
        .timeout(Duration::from_secs(30))
        .assert()
        .success();

    responder.join().unwrap();
}

#[test]
fn probe_fails_when_nothing_listens() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    bootstrap()
        .arg("probe")
        .arg("--port")
        .arg(port.to_string())
        .timeout(Duration::from_secs(30))
        .assert()
        .failure();
}

/// Takes around a minute by design: twenty connection attempts three seconds
/// apart against a port that refuses immediately.
///
/// ```sh
/// cargo test --test cli_tests -- --ignored
/// ```
#[test]
#[ignore]
fn remote_mode_gives_up_after_bounded_attempts() {
    // Reserve a port, then free it so connections are refused.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    bootstrap()
        .arg("remote")
        .env("DB_HOST", "127.0.0.1")
        .env("DB_PORT", port.to_string())
        .env("DB_USER", "app")
        .env("DB_PASS", "pw")
        .env("DB_NAME", "clinic")
        .timeout(Duration::from_secs(120))
        .assert()
        .failure()
        .stdout(predicate::str::contains("after 20 attempts"));
}
