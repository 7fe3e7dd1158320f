//! CLI interface tests
//!
//! Only offline commands are exercised here.

#![cfg(feature = "cli")]

use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stock-fx-report"));
    cmd.env_remove("EXCHANGERATE_API_KEY");
    cmd
}

#[test]
fn test_cli_help() {
    let output = binary().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stock-fx-report"));
    assert!(stdout.contains("tickers"));
    assert!(stdout.contains("rates"));
}

#[test]
fn test_tickers_command_uses_config() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "tickers = [\"7011.T\", \"WISE.L\", \"TSM\", \"EQNR.OL\"]").unwrap();
    writeln!(config, "[[suffixes]]").unwrap();
    writeln!(config, "suffix = \".OL\"").unwrap();
    writeln!(config, "currency = \"NOK\"").unwrap();

    let output = binary()
        .arg("--config")
        .arg(config.path())
        .arg("tickers")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = |ticker: &str| {
        stdout
            .lines()
            .find(|l| l.trim_start().starts_with(ticker))
            .unwrap_or_default()
            .to_string()
    };
    assert!(line("7011.T").contains("JPY"));
    assert!(line("WISE.L").contains("GBP"));
    assert!(line("WISE.L").contains("1/100"));
    assert!(line("TSM").contains("USD"));
    assert!(line("EQNR.OL").contains("NOK"));
}

#[test]
fn test_missing_config_file_fails() {
    let output = binary()
        .args(["--config", "/definitely/not/here.toml", "tickers"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config file not found"));
}

#[test]
fn test_unknown_format_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "tickers = []").unwrap();

    let output = binary()
        .arg("--config")
        .arg(config.path())
        .args(["run", "--format", "parquet", "--no-progress", "--output-dir"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown output format"));
}
