//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// Catalog with a fully populated SHIRT and a PEN whose Engraving is optional
pub const STORE_CATALOG: &str = r#"
attributes:
  - name: Size
    values: [XS, S, M, L]
  - name: Color
    values: [Green, Red, Blue]
  - name: Engraving
    values: [Silver, Gold]
templates:
  - code: SHIRT
    attributes: [Size, Color]
  - code: PEN
    attributes: [Size, Engraving]
variants:
  - { code: SHIRT-S-RED, variant_of: SHIRT, attributes: { Size: S, Color: Red } }
  - { code: SHIRT-S-BLUE, variant_of: SHIRT, attributes: { Size: S, Color: Blue } }
  - { code: SHIRT-M-RED, variant_of: SHIRT, attributes: { Size: M, Color: Red } }
  - { code: SHIRT-L-GREEN, variant_of: SHIRT, disabled: true, attributes: { Size: L, Color: Green } }
  - { code: PEN-M, variant_of: PEN, attributes: { Size: M } }
  - { code: PEN-M-GOLD, variant_of: PEN, attributes: { Size: M, Engraving: Gold } }
"#;

/// Helper to get a varsel command
pub fn varsel() -> Command {
    Command::new(cargo::cargo_bin!("varsel"))
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    varsel().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to create a project whose only catalog file is [`STORE_CATALOG`]
pub fn setup_store_project() -> TempDir {
    let tmp = setup_test_project();
    write_catalog(&tmp, "example.yaml", STORE_CATALOG);
    tmp
}

/// Helper to write a file into the project's catalog directory
pub fn write_catalog(tmp: &TempDir, name: &str, content: &str) {
    let dir = tmp.path().join("catalog");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

/// Run a command in the project and return trimmed stdout lines
pub fn stdout_lines(tmp: &TempDir, args: &[&str]) -> Vec<String> {
    let output = varsel().current_dir(tmp.path()).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "varsel {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
