use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const SUM_CONFIG: &str = r#"
root:
  kind: sum
  of: [first, second]
suppliers:
  first: { kind: value, value: 10 }
  second: { kind: value, value: 32 }
  where: { kind: path }
"#;

#[test]
fn run_prints_root_result() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("supplydemand.yml"), SUM_CONFIG)?;

    #[allow(deprecated)]
    Command::cargo_bin("supplydemand")?
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout("42\n");

    Ok(())
}

#[test]
fn run_with_payload_and_stats() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("custom.yml");
    fs::write(
        &config,
        r#"
root:
  kind: demand
  type: echo
  key: mirror
suppliers:
  echo: { kind: payload }
"#,
    )?;

    #[allow(deprecated)]
    let assert = Command::cargo_bin("supplydemand")?
        .args(["--config", config.to_str().unwrap()])
        .args(["run", "--payload", r#"{"answer": 42}"#, "--stats"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Capability: echo"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(value["answer"], 42);

    Ok(())
}

#[test]
fn run_missing_supplier_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("supplydemand.yml"),
        "root: { kind: demand, type: missing }\n",
    )?;

    #[allow(deprecated)]
    Command::cargo_bin("supplydemand")?
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Supplier not found for type: missing"));

    Ok(())
}

#[test]
fn list_prints_declared_names() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("supplydemand.yml"), SUM_CONFIG)?;

    #[allow(deprecated)]
    Command::cargo_bin("supplydemand")?
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout("first\tvalue\nsecond\tvalue\nwhere\tpath\n");

    Ok(())
}

#[test]
fn init_then_run_sample() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    #[allow(deprecated)]
    Command::cargo_bin("supplydemand")?
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    assert!(dir.path().join("supplydemand.yml").exists());

    #[allow(deprecated)]
    Command::cargo_bin("supplydemand")?
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout("\"First result\"\n");

    Ok(())
}
