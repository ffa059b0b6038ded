//! End-to-end tests of the csvdelta binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn csvdelta() -> Command {
    let mut cmd = Command::cargo_bin("csvdelta").expect("binary is built");
    cmd.arg("--quiet");
    cmd
}

#[test]
fn test_sort_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let src = write_file(temp_dir.path(), "in.csv", "id,name\n3,c\n1,a\n2,b\n");
    let dest = temp_dir.path().join("out.csv");

    csvdelta()
        .args(["sort", "-k", "id", "--numeric", "-b", "1"])
        .arg(&src)
        .arg(&dest)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&dest).unwrap(), "id,name\n1,a\n2,b\n3,c\n");
}

#[test]
fn test_sort_unknown_key_column_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let src = write_file(temp_dir.path(), "in.csv", "id,name\n1,a\n");
    let dest = temp_dir.path().join("out.csv");

    csvdelta()
        .args(["sort", "-k", "sku"])
        .arg(&src)
        .arg(&dest)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("column 'sku' not found in source header"));

    assert!(!dest.exists());
}

#[test]
fn test_compare_text_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = write_file(temp_dir.path(), "a.csv", "id,v\n1,x\n2,y\n");
    let b = write_file(temp_dir.path(), "b.csv", "id,v\n2,z\n3,w\n");

    csvdelta()
        .args(["compare", "-k", "id", "-c", "v"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("+ 1,x"))
        .stdout(predicate::str::contains("~ 2,y"))
        .stdout(predicate::str::contains("- 3,w"))
        .stdout(predicate::str::contains("1 creates, 1 updates, 1 deletes (0 unchanged)"));
}

#[test]
fn test_compare_csv_output_to_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = write_file(temp_dir.path(), "a.csv", "id,v\n1,x\n");
    let b = write_file(temp_dir.path(), "b.csv", "v,id\nq,0\n");
    let out = temp_dir.path().join("changes.csv");

    csvdelta()
        .args(["compare", "-k", "id", "--format", "csv", "-o"])
        .arg(&out)
        .arg(&a)
        .arg(&b)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "action,id,v\ndelete,0,q\ncreate,1,x\n"
    );
}

#[test]
fn test_diff_sorts_unsorted_inputs() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = write_file(temp_dir.path(), "a.csv", "id,v\n9,i\n1,a\n5,e\n");
    let b = write_file(temp_dir.path(), "b.csv", "id,v\n5,E\n7,g\n1,a\n");

    let assert = csvdelta()
        .args(["diff", "-k", "id", "--numeric", "-c", "v", "-f", "json", "-b", "1"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    let actions: Vec<(&str, &str)> = lines
        .iter()
        .map(|v| {
            (
                v["action"].as_str().unwrap_or_default(),
                v["record"]["id"].as_str().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        actions,
        vec![("update", "5"), ("delete", "7"), ("create", "9")]
    );
}

#[test]
fn test_diff_keeps_sorted_copies_in_work_dir() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let work = temp_dir.path().join("work");
    fs::create_dir(&work).unwrap();
    let a = write_file(temp_dir.path(), "a.csv", "id\nb\na\n");
    let b = write_file(temp_dir.path(), "b.csv", "id\na\n");

    csvdelta()
        .args(["diff", "-k", "id", "--work-dir"])
        .arg(&work)
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("+ b"));

    assert_eq!(
        fs::read_to_string(work.join("primary.sorted.csv")).unwrap(),
        "id\na\nb\n"
    );
}

#[test]
fn test_config_file_supplies_key() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = write_file(temp_dir.path(), "a.csv", "id;v\n1;x\n");
    let b = write_file(temp_dir.path(), "b.csv", "id;v\n1;y\n");
    let config = write_file(
        temp_dir.path(),
        "csvdelta.toml",
        "key = [\"id\"]\nchange_columns = [\"v\"]\ndelimiter = \";\"\n",
    );

    csvdelta()
        .arg("--config")
        .arg(&config)
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("~ 1;x"));
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let b = write_file(temp_dir.path(), "b.csv", "id\n1\n");

    csvdelta()
        .args(["compare", "-k", "id"])
        .arg(temp_dir.path().join("missing.csv"))
        .arg(&b)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
