use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const SLOT_FILE: &str = "slots/docker-wizard-entries-v1.json";

fn home() -> TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("settings.yaml"),
        "registry:\n  enabled: false\n",
    )
    .unwrap();
    dir
}

fn wizard(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docker-wizard").unwrap();
    cmd.env("DOCKER_WIZARD_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn list_json(home: &Path) -> Vec<Value> {
    let output = wizard(home).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice::<Value>(&output.stdout)
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

fn create_web(home: &Path) {
    wizard(home)
        .args([
            "new", "--name", "web", "--image", "nginx", "--tag", "latest", "--rm", "-d", "-p",
            "8080:80",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "docker run --rm -d --name web -p 8080:80 nginx:latest",
        ));
}

#[test]
fn test_new_saves_entry() {
    let home = home();
    create_web(home.path());

    let entries = list_json(home.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0]["commandLine"],
        "docker run --rm -d --name web -p 8080:80 nginx:latest"
    );
    assert_eq!(entries[0]["envVars"], serde_json::json!([{"key": "", "value": ""}]));
    assert!(home.path().join(SLOT_FILE).exists());
}

#[test]
fn test_preview_does_not_save() {
    let home = home();
    wizard(home.path())
        .args(["preview", "--image", "redis:7", "-e", "A=1", "--", "redis-server", "--save", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker run -it -e A=1 redis:7 redis-server --save"));

    assert!(list_json(home.path()).is_empty());
}

#[test]
fn test_empty_list_message() {
    let home = home();
    wizard(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved commands"));
}

#[test]
fn test_legacy_slot_is_migrated() {
    let home = home();
    std::fs::create_dir_all(home.path().join("slots")).unwrap();
    std::fs::write(
        home.path().join(SLOT_FILE),
        r#"[{"id":"legacy-1","imageName":"x","hostPort":"8080","containerPort":"80","publishPorts":true}]"#,
    )
    .unwrap();

    let entries = list_json(home.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], "legacy-1");
    assert_eq!(entries[0]["tagName"], "latest");
    assert_eq!(
        entries[0]["portBindings"],
        serde_json::json!([{"hostPort": "8080", "containerPort": "80"}])
    );
    assert_eq!(entries[0]["commandLine"], "docker run -it -p 8080:80 x:latest");
}

#[test]
fn test_corrupt_slot_reads_empty() {
    let home = home();
    std::fs::create_dir_all(home.path().join("slots")).unwrap();
    std::fs::write(home.path().join(SLOT_FILE), "{oops").unwrap();

    assert!(list_json(home.path()).is_empty());
}

#[test]
fn test_duplicate_then_delete() {
    let home = home();
    create_web(home.path());
    let source_id = list_json(home.path())[0]["id"].as_str().unwrap().to_string();

    wizard(home.path())
        .args(["duplicate", &source_id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("--name web-copy"));

    let entries = list_json(home.path());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["containerName"], "web-copy");
    assert_ne!(entries[0]["id"], entries[1]["id"]);
    assert_eq!(entries[1]["id"], source_id.as_str());

    wizard(home.path())
        .args(["delete", &source_id, "--yes"])
        .assert()
        .success();

    let entries = list_json(home.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["containerName"], "web-copy");
}

#[test]
fn test_edit_with_flags_keeps_id() {
    let home = home();
    create_web(home.path());
    let id = list_json(home.path())[0]["id"].as_str().unwrap().to_string();

    wizard(home.path())
        .args(["edit", &id, "-i", "--no-rm", "--memo", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker run -it --name web -p 8080:80 nginx:latest"));

    let entries = list_json(home.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], id.as_str());
    assert_eq!(entries[0]["memo"], "dev");
    assert_eq!(entries[0]["runMode"], "interactive");
}

#[test]
fn test_unknown_id_fails() {
    let home = home();
    create_web(home.path());

    wizard(home.path())
        .args(["show", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved entry"));

    wizard(home.path())
        .args(["delete", "does-not-exist", "--yes"])
        .assert()
        .failure();

    assert_eq!(list_json(home.path()).len(), 1);
}

#[test]
fn test_show_json_matches_list() {
    let home = home();
    create_web(home.path());
    let entry = list_json(home.path())[0].clone();
    let id = entry["id"].as_str().unwrap();

    let output = wizard(home.path()).args(["show", id, "--json"]).output().unwrap();
    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown, entry);
}

#[test]
fn test_entry_without_id_keeps_its_new_id() {
    let home = home();
    std::fs::create_dir_all(home.path().join("slots")).unwrap();
    std::fs::write(home.path().join(SLOT_FILE), r#"[{"imageName":"x"}]"#).unwrap();

    let id = list_json(home.path())[0]["id"].as_str().unwrap().to_string();
    assert_eq!(list_json(home.path())[0]["id"], id.as_str());

    wizard(home.path())
        .args(["delete", &id, "--yes"])
        .assert()
        .success();
    assert!(list_json(home.path()).is_empty());
}
