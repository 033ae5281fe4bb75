use serial_test::serial;
use std::process::Command;

const BINARY: &str = env!("CARGO_BIN_EXE_mm-rating-processor");
const EVENT: &str = "0d3c5d4e-3f3a-4c3b-9a43-1f4a3c58e001";

/// The application exits with status 1 when the database is unreachable
#[test]
#[serial]
fn test_application_exits_on_connection_failure() {
    let output = Command::new(BINARY)
        .args(["--event-id", EVENT, "--rollback"])
        .env("CONNECTION_STRING", "host=127.0.0.1 port=1 user=postgres password=wrong dbname=nonexistent")
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to execute processor");

    assert_eq!(output.status.code(), Some(1), "Process should fail with invalid connection");
}

/// The application refuses to start without a connection string
#[test]
#[serial]
fn test_application_exits_on_missing_connection_string() {
    // Run outside the crate so no .env file is picked up
    let temp_dir = std::env::temp_dir().join("mm_rating_processor_test");
    std::fs::create_dir_all(&temp_dir).unwrap();

    let output = Command::new(BINARY)
        .current_dir(&temp_dir)
        .args(["--event-id", EVENT, "--rollback"])
        .env_remove("CONNECTION_STRING")
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to execute processor");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("connection-string"), "Should name the missing argument");
}
