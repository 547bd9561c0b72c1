//! Integration tests for the filmtk CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CATALOG_CSV: &str = "품명,품번,품명\n원단,P-200,무광 필름\n원단,P-100,투명 필름\n원단,,빈 품번\n";

/// Helper to get a filmtk command isolated from the user's global config
fn filmtk(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("filmtk").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir.join(".home"))
        .env("XDG_CONFIG_HOME", dir.join(".home/.config"))
        .env_remove("FILMTK_CATALOG")
        .env_remove("FILMTK_SHEET")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a project without a catalog
fn setup_empty_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to create a project whose catalog is a CSV export of the BOM
fn setup_test_project() -> TempDir {
    let tmp = setup_empty_project();
    fs::write(tmp.path().join("bom.csv"), CATALOG_CSV).unwrap();
    fs::write(
        tmp.path().join(".filmtk/config.yaml"),
        "catalog_file: bom.csv\n",
    )
    .unwrap();
    tmp
}

fn read_table(tmp: &TempDir, name: &str) -> String {
    fs::read_to_string(tmp.path().join(name))
        .unwrap()
        .trim_start_matches('\u{feff}')
        .to_string()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    Command::cargo_bin("filmtk")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Film Roll Toolkit"));
}

#[test]
fn test_version_displays() {
    Command::cargo_bin("filmtk")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("filmtk"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("filmtk"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project() {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized filmtk project"));

    assert!(tmp.path().join(".filmtk/config.yaml").exists());
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_empty_project();
    filmtk(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path())
        .args(["parts", "list"])
        .assert()
        .failure();
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_parts_list_sorted_and_skips_blank_part_numbers() {
    let tmp = setup_test_project();
    let output = filmtk(tmp.path())
        .args(["parts", "list", "-f", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "part_number,part_name,film_config,thickness");
    assert_eq!(lines[1], "P-100,투명 필름,,");
    assert_eq!(lines[2], "P-200,무광 필름,,");
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_parts_list_table_shows_full_part_numbers() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["parts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P-100"))
        .stdout(predicate::str::contains("투명 필름"));
}

#[test]
fn test_parts_list_reads_workbook_sheet() {
    let tmp = setup_empty_project();
    fs::copy(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/bom.xlsx"),
        tmp.path().join("BOM.xlsx"),
    )
    .unwrap();
    filmtk(tmp.path())
        .args(["config", "set", "catalog_sheet", "Parts"])
        .assert()
        .success();

    filmtk(tmp.path())
        .args(["parts", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("1001\nP-100\n");
}

#[test]
fn test_parts_list_search() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["parts", "list", "--search", "무광", "-f", "id"])
        .assert()
        .success()
        .stdout("P-200\n");
}

#[test]
fn test_missing_catalog_reports_reason() {
    let tmp = setup_empty_project();
    filmtk(tmp.path())
        .args(["parts", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no parts catalog available"))
        .stderr(predicate::str::contains("BOM.xlsx"));
}

#[test]
fn test_missing_catalog_column_is_named() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("bom.csv"), "품번,규격\nP-1,A\n").unwrap();
    filmtk(tmp.path())
        .args(["parts", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("품명.1"));
}

// ============================================================================
// Film Config Tests
// ============================================================================

#[test]
fn test_cfg_set_twice_keeps_one_row() {
    let tmp = setup_test_project();

    filmtk(tmp.path())
        .args(["cfg", "set", "P-100", "--thickness", "0.135", "--core", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved film parameters"));

    filmtk(tmp.path())
        .args(["cfg", "set", "P-100", "--labels-per-set", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated film parameters"));

    let table = read_table(&tmp, "film_config.csv");
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(
        lines[0],
        "part_number,part_name,film_thickness_mm,core_outer_diameter_cm,eye_mark_set_length_cm,labels_per_set"
    );
    assert_eq!(lines[1], "P-100,투명 필름,0.135,9,11.45,4");
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_cfg_written_with_bom() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["cfg", "set", "P-200"])
        .assert()
        .success();

    let bytes = fs::read(tmp.path().join("film_config.csv")).unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
}

#[test]
fn test_cfg_rejects_unknown_part() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["cfg", "set", "P-999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the catalog"));
    assert!(!tmp.path().join("film_config.csv").exists());
}

#[test]
fn test_cfg_rejects_value_below_minimum() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["cfg", "set", "P-100", "--thickness", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("below the minimum"));
}

#[test]
fn test_cfg_show_defaults_when_unsaved() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["cfg", "show", "P-100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.135"))
        .stdout(predicate::str::contains("11.45"))
        .stdout(predicate::str::contains("not saved yet"));
}

#[test]
fn test_cfg_list_keeps_file_order() {
    let tmp = setup_test_project();
    for pn in ["P-200", "P-100"] {
        filmtk(tmp.path()).args(["cfg", "set", pn]).assert().success();
    }

    filmtk(tmp.path())
        .args(["cfg", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("P-200\nP-100\n");
}

#[test]
fn test_cfg_set_requires_part_number_without_interactive() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["cfg", "set", "--thickness", "0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("part number is required"));
    assert!(!tmp.path().join("film_config.csv").exists());
}

// ============================================================================
// Thickness Tests
// ============================================================================

#[test]
fn test_thk_set_shows_stats() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args([
            "thk", "set", "P-100", "--vendor", "Acme", "--values", "0.14,0.135,0.133",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mean: 0.136 mm"))
        .stdout(predicate::str::contains("Stdev: 0.003606 mm"));
}

#[test]
fn test_thk_blank_vendor_keeps_previous() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["thk", "set", "P-100", "--vendor", "Acme", "--values", "0.14,0.135,0.133"])
        .assert()
        .success();

    filmtk(tmp.path())
        .args(["thk", "set", "P-100", "--vendor", "", "--set", "4=0.137"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated thickness measurements"));

    let table = read_table(&tmp, "film_thickness.csv");
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("P-100,투명 필름,Acme,0.14,0.135,0.133,0.137,0,"));
}

#[test]
fn test_thk_rejects_out_of_range_position() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["thk", "set", "P-100", "--set", "10=0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_thk_list_keeps_file_order() {
    let tmp = setup_test_project();
    for pn in ["P-200", "P-100"] {
        filmtk(tmp.path())
            .args(["thk", "set", pn, "--values", "0.1"])
            .assert()
            .success();
    }

    filmtk(tmp.path())
        .args(["thk", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("P-200\nP-100\n");
}

#[test]
fn test_thk_set_requires_part_number_without_interactive() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["thk", "set", "--values", "0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("part number is required"));
}

#[test]
fn test_parts_list_marks_saved_records() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["thk", "set", "P-200", "--values", "0.1"])
        .assert()
        .success();

    filmtk(tmp.path())
        .args(["parts", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P-200,무광 필름,,✓"));
}

// ============================================================================
// Roll Yield Tests
// ============================================================================

#[test]
fn test_roll_defaults_and_invalid_token_warning() {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path())
        .args(["roll", "--diameters", "29.9, abc 26.8", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("29.9,20650"))
        .stdout(predicate::str::contains("26.8,16185"))
        .stderr(predicate::str::contains("'abc' is not a number"));
}

#[test]
fn test_roll_table_shows_full_counts() {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path())
        .args(["roll", "--diameters", "29.9, 26.8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20650"))
        .stdout(predicate::str::contains("16185"))
        .stdout(predicate::str::contains("...").not());
}

#[test]
fn test_roll_nan_diameter_yields_zero() {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path())
        .args(["roll", "--diameters", "29.9 nan", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("29.9,20650"))
        .stdout(predicate::str::contains("NaN,0"))
        .stderr(predicate::str::contains("not a number").not());
}

#[test]
fn test_roll_uses_saved_parameters() {
    let tmp = setup_test_project();
    filmtk(tmp.path())
        .args(["cfg", "set", "P-100", "--labels-per-set", "4"])
        .assert()
        .success();

    filmtk(tmp.path())
        .args(["roll", "P-100", "--diameters", "29.9", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("29.9,16520"));
}

#[test]
fn test_roll_core_not_smaller_than_roll_yields_zero() {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path())
        .args(["roll", "--diameters", "9", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9,0"));
}

#[test]
fn test_roll_without_valid_diameters_fails() {
    let tmp = TempDir::new().unwrap();
    filmtk(tmp.path())
        .args(["roll", "--diameters", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid roll diameters"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_set_and_show() {
    let tmp = setup_empty_project();
    filmtk(tmp.path())
        .args(["config", "set", "catalog_sheet", "Parts"])
        .assert()
        .success();

    filmtk(tmp.path())
        .args(["config", "show", "catalog_sheet"])
        .assert()
        .success()
        .stdout("Parts\n");

    filmtk(tmp.path())
        .args(["config", "unset", "catalog_sheet"])
        .assert()
        .success();

    filmtk(tmp.path())
        .args(["config", "show", "catalog_sheet"])
        .assert()
        .success()
        .stdout("Sheet1\n");
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = setup_empty_project();
    filmtk(tmp.path())
        .args(["config", "set", "author", "someone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"));
}

#[test]
fn test_env_overrides_catalog_file() {
    let tmp = setup_empty_project();
    fs::write(tmp.path().join("other.csv"), CATALOG_CSV).unwrap();
    filmtk(tmp.path())
        .env("FILMTK_CATALOG", "other.csv")
        .args(["parts", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("P-100\nP-200\n");
}
