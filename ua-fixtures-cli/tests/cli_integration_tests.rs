//! Integration tests for the ua-fixtures CLI
//!
//! Tests command-line interface functionality including:
//! - Fixture generation, rule selection and the manifest
//! - Listing, inspecting and diffing generated files
//! - Error reporting and exit status

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

fn run_cli_command(args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_ua-fixtures"))
        .args(args)
        .env_remove("UA_FIXTURES_FONT")
        .env_remove("RUST_LOG")
        .output()?;
    Ok(output)
}

/// A font file the loader accepts: TrueType magic and an empty table directory.
fn write_test_font(dir: &Path) -> PathBuf {
    let path = dir.join("test.ttf");
    let mut bytes = vec![0x00, 0x01, 0x00, 0x00];
    bytes.extend_from_slice(&[0x00; 12]);
    fs::write(&path, bytes).unwrap();
    path
}

fn generate(dir: &TempDir, extra: &[&str]) -> Output {
    let out = dir.path().join("out");
    let font = write_test_font(dir.path());
    let mut args = vec![
        "generate",
        "--output",
        out.to_str().unwrap(),
        "--font",
        font.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);
    run_cli_command(&args).unwrap()
}

fn assert_pdf(path: &Path) {
    assert!(path.is_file(), "missing fixture {}", path.display());
    let content = fs::read(path).unwrap();
    assert!(content.starts_with(b"%PDF-1.7"));
    assert!(content.ends_with(b"%%EOF\n"));
}

#[test]
fn test_cli_help() {
    let output = run_cli_command(&["--help"]).unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["generate", "list", "inspect", "diff"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

#[test]
fn test_cli_list() {
    let output = run_cli_command(&["list"]).unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 9);
    assert!(stdout.contains("ocproperties_ua1_7_10_1_default"));
    assert!(stdout.contains("structure_ua1_7_9_2"));
}

#[test]
fn test_cli_generate_all() {
    let dir = tempdir().unwrap();
    let output = generate(&dir, &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let out = dir.path().join("out");
    assert_pdf(&out.join("structure_ua1_7_1_3/mh_ua1-7.1-3_fail__A_circular_mapping_exists.pdf"));
    assert_pdf(&out.join("structure_ua1_7_9_2/mh_ua1-7.9-2_pass__Note_ID_unique.pdf"));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["generated"].as_array().unwrap().len(), 18);
    assert!(manifest["failures"].as_array().unwrap().is_empty());
}

#[test]
fn test_cli_generate_selected_rule() {
    let dir = tempdir().unwrap();
    let output = generate(&dir, &["--rule", "7.1-3"]);
    assert!(output.status.success());

    let out = dir.path().join("out");
    assert!(out.join("structure_ua1_7_1_3").is_dir());
    assert!(!out.join("notes_ua1_7_9_2").exists());
}

#[test]
fn test_cli_generate_is_deterministic() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    assert!(generate(&first, &["--rule", "7.10-1"]).status.success());
    assert!(generate(&second, &["--rule", "7.10-1"]).status.success());

    let file = "ocproperties_ua1_7_10_1_default/mh_ua1-7.10-1_fail__OCProperties_Config_Name_missing_default.pdf";
    let a = fs::read(first.path().join("out").join(file)).unwrap();
    let b = fs::read(second.path().join("out").join(file)).unwrap();
    assert!(a == b, "identical runs should produce identical bytes");
}

#[test]
fn test_cli_generate_unknown_rule() {
    let dir = tempdir().unwrap();
    let output = generate(&dir, &["--rule", "9.9-9"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No fixture matches"));
}

#[test]
fn test_cli_generate_reports_missing_font() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let missing = dir.path().join("nope.ttf");
    let output = run_cli_command(&[
        "generate",
        "--output",
        out.to_str().unwrap(),
        "--rule",
        "fonts_ua1_7_21_3_1",
        "--font",
        missing.to_str().unwrap(),
    ])
    .unwrap();

    // An explicit font never falls back to system fonts.
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 of 2 fixtures failed"));
    assert!(stderr.contains("nope.ttf"));
    assert!(!out.join("fonts_ua1_7_21_3_1").exists());
    assert!(out.join("manifest.json").is_file());
}

#[test]
fn test_cli_inspect() {
    let dir = tempdir().unwrap();
    assert!(generate(&dir, &["--rule", "7.1-3"]).status.success());

    let file = dir
        .path()
        .join("out/structure_ua1_7_1_3/mh_ua1-7.1-3_fail__A_circular_mapping_exists.pdf");
    let output = run_cli_command(&["inspect", file.to_str().unwrap()]).unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("/RoleMap"));
    assert!(stdout.contains("trailer"));
    assert!(stdout.contains("/Root"));
}

#[test]
fn test_cli_diff_pair() {
    let dir = tempdir().unwrap();
    assert!(generate(&dir, &["--rule", "7.1-3"]).status.success());

    let base = dir.path().join("out/structure_ua1_7_1_3");
    let fail = base.join("mh_ua1-7.1-3_fail__A_circular_mapping_exists.pdf");
    let pass = base.join("mh_ua1-7.1-3_pass__A_circular_mapping_exists.pdf");

    let output = run_cli_command(&["diff", fail.to_str().unwrap(), pass.to_str().unwrap()]).unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("/Root/StructTreeRoot/RoleMap/Div"));

    let output = run_cli_command(&[
        "diff",
        "--json",
        fail.to_str().unwrap(),
        pass.to_str().unwrap(),
    ])
    .unwrap();
    let differences: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(differences[0]["kind"], "only_in_left");

    let output = run_cli_command(&["diff", fail.to_str().unwrap(), fail.to_str().unwrap()]).unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No structural differences"));
}

#[test]
fn test_cli_inspect_rejects_non_pdf() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("not.pdf");
    fs::write(&path, b"hello").unwrap();

    let output = run_cli_command(&["inspect", path.to_str().unwrap()]).unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse"));
}
