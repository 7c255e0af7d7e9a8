//! Integration tests for the labdesk CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use chrono::Datelike;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a labdesk command
fn labdesk() -> Command {
    Command::cargo_bin("labdesk").unwrap()
}

/// Helper to create a lab in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    labdesk().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a `new` command with `--format id` and return the printed ID
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = labdesk()
        .current_dir(tmp.path())
        .args(args)
        .args(["--format", "id"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn create_doctor(tmp: &TempDir, name: &str) -> String {
    create(tmp, &["doctor", "new", "--name", name])
}

fn create_crown(tmp: &TempDir) -> String {
    create(
        tmp,
        &[
            "pros",
            "new",
            "--name",
            "Crown",
            "--gmlc",
            "GMLC-100",
            "--min-days",
            "7",
            "--price",
            "450",
            "--stages",
            "Casting, Grinding, Porcelain",
        ],
    )
}

/// Doctor, catalog item and a three-tooth order
fn create_order(tmp: &TempDir) -> String {
    let doctor = create_doctor(tmp, "Dr Nowak");
    let crown = create_crown(tmp);
    create(
        tmp,
        &[
            "order",
            "new",
            "--doctor",
            &doctor,
            "--prosthetic",
            &crown,
            "--patient",
            "P-001",
            "--teeth",
            "14, 15, 16",
            "--material",
            "zirconia",
            "--deadline",
            "2030-01-15",
        ],
    )
}

fn complete_order(tmp: &TempDir, order: &str) {
    labdesk()
        .current_dir(tmp.path())
        .args(["order", "status", order, "completed"])
        .assert()
        .success();
}

fn order_json(tmp: &TempDir, order: &str) -> serde_json::Value {
    let output = labdesk()
        .current_dir(tmp.path())
        .args(["order", "show", order, "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    labdesk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dental prosthetics lab records"));
}

#[test]
fn test_version_displays() {
    labdesk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("labdesk"));
}

#[test]
fn test_completions_bash() {
    labdesk()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("labdesk"));
}

#[test]
fn test_command_outside_lab_fails() {
    let tmp = TempDir::new().unwrap();
    labdesk()
        .current_dir(tmp.path())
        .args(["order", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("init"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_structure() {
    let tmp = setup_test_project();
    assert!(tmp.path().join(".labdesk").is_dir());
    assert!(tmp.path().join(".labdesk/config.yaml").is_file());
    assert!(tmp.path().join(".labdesk/data").is_dir());
}

#[test]
fn test_init_twice_reports_existing() {
    let tmp = setup_test_project();
    labdesk()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_project_flag_from_other_directory() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();
    labdesk()
        .current_dir(elsewhere.path())
        .args(["--project"])
        .arg(tmp.path())
        .args(["pros", "list", "--count"])
        .assert()
        .success()
        .stdout("3\n");
}

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_starter_catalog_seeded() {
    let tmp = setup_test_project();
    labdesk()
        .current_dir(tmp.path())
        .args(["pros", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Korona porcelanowa"))
        .stdout(predicate::str::contains("Proteza akrylowa"));
    assert!(tmp.path().join(".labdesk/data/prosthetics.json").is_file());
}

#[test]
fn test_doctor_new_and_list() {
    let tmp = setup_test_project();
    let id = create_doctor(&tmp, "Dr Kowalska");
    assert!(id.starts_with("DOC-"));

    labdesk()
        .current_dir(tmp.path())
        .args(["doctor", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dr Kowalska"))
        .stdout(predicate::str::contains("DOC@1"));
}

#[test]
fn test_doctor_blank_name_rejected() {
    let tmp = setup_test_project();
    labdesk()
        .current_dir(tmp.path())
        .args(["doctor", "new", "--name", "  "])
        .assert()
        .failure();
    labdesk()
        .current_dir(tmp.path())
        .args(["doctor", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_prosthetic_negative_price_rejected() {
    let tmp = setup_test_project();
    labdesk()
        .current_dir(tmp.path())
        .args(["pros", "new", "--name", "Inlay", "--price=-5"])
        .assert()
        .failure();
}

#[test]
fn test_employee_and_supplier_registries() {
    let tmp = setup_test_project();
    let emp = create(
        &tmp,
        &["emp", "new", "--name", "Anna", "--skills", "porcelain, casting"],
    );
    let sup = create(
        &tmp,
        &["sup", "new", "--name", "MillCenter", "--service", "milling", "--cost", "120"],
    );
    assert!(emp.starts_with("EMP-"));
    assert!(sup.starts_with("SUP-"));

    labdesk()
        .current_dir(tmp.path())
        .args(["emp", "list", "--skill", "porcelain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Anna"));
    labdesk()
        .current_dir(tmp.path())
        .args(["sup", "delete", &sup, "--yes"])
        .assert()
        .success();
    labdesk()
        .current_dir(tmp.path())
        .args(["sup", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_doctor_delete_rejected_while_referenced() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);
    let doctor = order_json(&tmp, &order)["doctorId"]
        .as_str()
        .unwrap()
        .to_string();

    labdesk()
        .current_dir(tmp.path())
        .args(["doctor", "delete", &doctor, "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("referenced"));
    labdesk()
        .current_dir(tmp.path())
        .args(["doctor", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

// ============================================================================
// Order Tests
// ============================================================================

#[test]
fn test_order_total_from_teeth_count() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);
    let json = order_json(&tmp, &order);

    assert_eq!(json["teethCount"], 3);
    assert_eq!(json["totalPrice"].as_f64(), Some(1350.0));
    assert_eq!(json["status"], "new");
    assert_eq!(json["stages"].as_array().unwrap().len(), 3);
    assert_eq!(json["stageProgress"][0]["status"], "not-started");
}

#[test]
fn test_order_unknown_doctor_fails() {
    let tmp = setup_test_project();
    labdesk()
        .current_dir(tmp.path())
        .args([
            "order",
            "new",
            "--doctor",
            "DOC@7",
            "--prosthetic",
            "PROS@1",
            "--patient",
            "P-9",
        ])
        .assert()
        .failure();
}

#[test]
fn test_order_stage_progress() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);

    labdesk()
        .current_dir(tmp.path())
        .args([
            "order",
            "stage",
            &order,
            "2",
            "--status",
            "in-progress",
            "--assignee",
            "Anna",
        ])
        .assert()
        .success();

    let json = order_json(&tmp, &order);
    let stage = &json["stageProgress"][1];
    assert_eq!(stage["status"], "in-progress");
    assert_eq!(stage["assignee"], "Anna");
    assert!(stage["startedAt"].is_string());

    labdesk()
        .current_dir(tmp.path())
        .args(["order", "stage", &order, "9", "--status", "done"])
        .assert()
        .failure();
}

#[test]
fn test_order_status_completed_sets_timestamp() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);
    complete_order(&tmp, &order);

    let json = order_json(&tmp, &order);
    assert_eq!(json["status"], "completed");
    assert!(json["completedAt"].is_string());

    labdesk()
        .current_dir(tmp.path())
        .args(["order", "list", "--status", "active", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_order_edit_recomputes_total() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);

    labdesk()
        .current_dir(tmp.path())
        .args(["order", "edit", &order, "--teeth", "11"])
        .assert()
        .success();

    let json = order_json(&tmp, &order);
    assert_eq!(json["teethCount"], 1);
    assert_eq!(json["totalPrice"].as_f64(), Some(450.0));
}

#[test]
fn test_order_delete() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);

    labdesk()
        .current_dir(tmp.path())
        .args(["order", "delete", &order, "--yes"])
        .assert()
        .success();
    labdesk()
        .current_dir(tmp.path())
        .args(["order", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

fn list_ids(tmp: &TempDir, args: &[&str]) -> Vec<String> {
    let output = labdesk()
        .current_dir(tmp.path())
        .args(["order", "list", "--format", "id"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_order_search_matches_doctor_and_prosthetic_names() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);

    assert_eq!(list_ids(&tmp, &["--search", "nowak"]), vec![order.clone()]);
    assert_eq!(list_ids(&tmp, &["--search", "crown"]), vec![order.clone()]);
    assert_eq!(list_ids(&tmp, &["--search", "p-001"]), vec![order]);
    assert!(list_ids(&tmp, &["--search", "kowalski"]).is_empty());
}

#[test]
fn test_order_sort_by_status_follows_lifecycle() {
    let tmp = setup_test_project();
    let done = create_order(&tmp);
    complete_order(&tmp, &done);
    let doctor = create_doctor(&tmp, "Dr Lis");
    let crown = create_crown(&tmp);
    let fresh = create(
        &tmp,
        &[
            "order",
            "new",
            "--doctor",
            &doctor,
            "--prosthetic",
            &crown,
            "--patient",
            "P-002",
            "--teeth",
            "21",
        ],
    );
    labdesk()
        .current_dir(tmp.path())
        .args(["order", "status", &fresh, "in-progress"])
        .assert()
        .success();

    assert_eq!(list_ids(&tmp, &["--sort", "status"]), vec![fresh, done]);
}

// ============================================================================
// Document Tests
// ============================================================================

#[test]
fn test_invoice_requires_completed_order() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);

    labdesk()
        .current_dir(tmp.path())
        .args(["inv", "new", &order])
        .assert()
        .failure()
        .stderr(predicate::str::contains("completed"));
}

#[test]
fn test_invoice_numbering_and_duplicate() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);
    complete_order(&tmp, &order);

    labdesk()
        .current_dir(tmp.path())
        .args(["inv", "new", &order])
        .assert()
        .success();

    let year = chrono::Local::now().year();
    labdesk()
        .current_dir(tmp.path())
        .args(["inv", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("FV/{}/0001", year)));

    labdesk()
        .current_dir(tmp.path())
        .args(["inv", "new", &order])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already"));
}

#[test]
fn test_invoice_show_renders_document() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);
    complete_order(&tmp, &order);
    labdesk()
        .current_dir(tmp.path())
        .args(["inv", "new", &order])
        .assert()
        .success();

    labdesk()
        .current_dir(tmp.path())
        .args(["inv", "show", &order])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Invoice FV/"))
        .stdout(predicate::str::contains("1350.00"));
}

#[test]
fn test_declaration_numbering() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);
    complete_order(&tmp, &order);

    labdesk()
        .current_dir(tmp.path())
        .args(["decl", "new", &order])
        .assert()
        .success();

    let year = chrono::Local::now().year();
    labdesk()
        .current_dir(tmp.path())
        .args(["decl", "show", &format!("OSW/{}/1", year)])
        .assert()
        .success()
        .stdout(predicate::str::contains("GMLC-100"))
        .stdout(predicate::str::contains("P-001"));
}

// ============================================================================
// Dashboard Tests
// ============================================================================

#[test]
fn test_status_dashboard_json() {
    let tmp = setup_test_project();
    let order = create_order(&tmp);
    complete_order(&tmp, &order);
    labdesk()
        .current_dir(tmp.path())
        .args(["inv", "new", &order])
        .assert()
        .success();

    let output = labdesk()
        .current_dir(tmp.path())
        .args(["status", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["active_orders"], 0);
    assert_eq!(json["completed_this_month"], 1);
    assert_eq!(json["revenue_this_month"].as_f64(), Some(1350.0));
}

// ============================================================================
// Backup Tests
// ============================================================================

#[test]
fn test_export_import_round_trip() {
    let source = setup_test_project();
    create_order(&source);
    let backup = source.path().join("backup.json");

    labdesk()
        .current_dir(source.path())
        .arg("export")
        .arg(&backup)
        .assert()
        .success();
    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(exported["version"], "2.0.0");
    assert!(exported["exportDate"].is_string());

    let target = setup_test_project();
    labdesk()
        .current_dir(target.path())
        .arg("import")
        .arg(&backup)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("orders"));

    labdesk()
        .current_dir(target.path())
        .args(["order", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
    labdesk()
        .current_dir(target.path())
        .args(["pros", "list", "--count"])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_import_malformed_changes_nothing() {
    let tmp = setup_test_project();
    create_doctor(&tmp, "Dr Nowak");
    let bad = tmp.path().join("bad.json");
    fs::write(&bad, "{ \"doctors\": [ }").unwrap();

    labdesk()
        .current_dir(tmp.path())
        .arg("import")
        .arg(&bad)
        .arg("--yes")
        .assert()
        .failure();
    labdesk()
        .current_dir(tmp.path())
        .args(["doctor", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_import_subset_keeps_other_collections() {
    let tmp = setup_test_project();
    create_doctor(&tmp, "Dr Nowak");
    let partial = tmp.path().join("partial.json");
    fs::write(&partial, r#"{ "employees": [] }"#).unwrap();

    labdesk()
        .current_dir(tmp.path())
        .arg("import")
        .arg(&partial)
        .arg("--yes")
        .assert()
        .success();
    labdesk()
        .current_dir(tmp.path())
        .args(["doctor", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_set_and_show() {
    let tmp = setup_test_project();
    labdesk()
        .current_dir(tmp.path())
        .args(["config", "set", "urgent_days", "5"])
        .assert()
        .success();
    labdesk()
        .current_dir(tmp.path())
        .args(["config", "show", "urgent_days"])
        .env_remove("LABDESK_URGENT_DAYS")
        .assert()
        .success()
        .stdout("5\n");
}

#[test]
fn test_config_unknown_key_rejected() {
    let tmp = setup_test_project();
    labdesk()
        .current_dir(tmp.path())
        .args(["config", "set", "author", "me"])
        .assert()
        .failure();
}
