use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn copy_vehicle_sheets(target: &Path) {
    let source = manifest_dir().join("data").join("vehicles");
    fs::create_dir_all(target).unwrap();
    for sheet in ["brands.csv", "models.csv", "trims.csv"] {
        fs::copy(source.join(sheet), target.join(sheet)).unwrap();
    }
}

#[test]
fn validate_json_accepts_shipped_assets() {
    let root = manifest_dir();
    Command::cargo_bin("validate_json")
        .unwrap()
        .env("APP__DATA_DIR", root.join("data"))
        .env("APP__SCHEMAS_DIR", root.join("schemas"))
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ categories valid"))
        .stdout(predicate::str::contains("✅ listings valid"))
        .stdout(predicate::str::contains("All JSON assets validated successfully."));
}

#[test]
fn validate_json_reports_every_broken_target() {
    let root = manifest_dir();
    let data = TempDir::new().unwrap();
    fs::create_dir_all(data.path().join("vehicles")).unwrap();
    fs::write(data.path().join("categories.json"), r#"{ "version": "2024-06-01", "categories": [{ "slug": "Bad Slug" }] }"#).unwrap();
    fs::copy(root.join("data/filters.json"), data.path().join("filters.json")).unwrap();
    fs::copy(root.join("data/vehicles/vehicles.json"), data.path().join("vehicles/vehicles.json")).unwrap();
    // listings.json is missing on purpose

    Command::cargo_bin("validate_json")
        .unwrap()
        .env("APP__DATA_DIR", data.path())
        .env("APP__SCHEMAS_DIR", root.join("schemas"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("❌ categories invalid"))
        .stdout(predicate::str::contains("root.categories.0.label: Missing required property"))
        .stdout(predicate::str::contains("✅ filters valid"))
        .stdout(predicate::str::contains("❌ Failed to validate listings"))
        .stdout(predicate::str::contains("All JSON assets validated successfully.").not());
}

#[test]
fn generate_vehicles_writes_taxonomy() {
    let data = TempDir::new().unwrap();
    let vehicles_dir = data.path().join("vehicles");
    copy_vehicle_sheets(&vehicles_dir);

    Command::cargo_bin("generate_vehicles")
        .unwrap()
        .env("APP__DATA_DIR", data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Generated vehicles.json with 4 brands."));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(vehicles_dir.join("vehicles.json")).unwrap()).unwrap();
    assert_eq!(written["version"], "2024-06-01");
    assert_eq!(written["brands"][0]["models"][0]["label"], "Camry");
}

#[test]
fn generate_vehicles_fails_on_model_without_trims() {
    let data = TempDir::new().unwrap();
    let vehicles_dir = data.path().join("vehicles");
    copy_vehicle_sheets(&vehicles_dir);
    let mut models = fs::read_to_string(vehicles_dir.join("models.csv")).unwrap();
    models.push_str("toyota,supra,Supra,Coupe,2020,2024\n");
    fs::write(vehicles_dir.join("models.csv"), models).unwrap();

    Command::cargo_bin("generate_vehicles")
        .unwrap()
        .env("APP__DATA_DIR", data.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to generate vehicles.json"))
        .stderr(predicate::str::contains("Model toyota/supra is missing trims in trims.csv"));

    assert!(!vehicles_dir.join("vehicles.json").exists());
}
