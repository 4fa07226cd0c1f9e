//! Integration tests for CLI argument handling
//!
//! Only paths that exit before any network access are exercised here.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_zipcast"))
        .args(args)
        .output()
        .expect("Failed to execute zipcast")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("zipcast"), "Help should mention zipcast");
    assert!(stdout.contains("--days"), "Help should mention --days");
    assert!(stdout.contains("--cache"), "Help should mention --cache");
}

#[test]
fn test_help_suggests_a_place_name() {
    let output = run_cli(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("e.g. \"San Francisco\""), "{}", stdout);
    assert!(stdout.contains("street addresses do not resolve"), "{}", stdout);
    assert!(!stdout.contains("Market St"));
}

#[test]
fn test_missing_address_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ADDRESS"), "Should name the missing argument: {}", stderr);
}

#[test]
fn test_blank_address_prints_error_and_exits() {
    let output = run_cli(&["   "]);
    assert!(!output.status.success(), "Expected blank address to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Please enter a valid address."),
        "Should print error message about the address: {}",
        stderr
    );
}

#[test]
fn test_invalid_days_is_rejected() {
    let output = run_cli(&["--days", "30", "Paris"]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_cache_mode_is_rejected() {
    let output = run_cli(&["--cache", "redis", "Paris"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("disk") && stderr.contains("memory"), "{}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use zipcast::cli::{CacheMode, Cli, LookupRequest};
    use zipcast::DEFAULT_FORECAST_DAYS;

    #[test]
    fn test_request_from_defaults() {
        let cli = Cli::parse_from(["zipcast", "San", "Francisco"]);
        let request = LookupRequest::from_cli(&cli).unwrap();

        assert_eq!(request.address, "San Francisco");
        assert_eq!(request.days, DEFAULT_FORECAST_DAYS);
        assert_eq!(request.cache, CacheMode::Disk);
        assert!(!request.json);
    }

    #[test]
    fn test_request_with_memory_cache_and_json() {
        let cli = Cli::parse_from(["zipcast", "--cache", "memory", "--json", "-d", "2", "Oslo"]);
        let request = LookupRequest::from_cli(&cli).unwrap();

        assert_eq!(request.cache, CacheMode::Memory);
        assert!(request.json);
        assert_eq!(request.days, 2);
    }
}
