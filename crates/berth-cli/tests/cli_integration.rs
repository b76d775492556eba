//! CLI subprocess integration tests.
//!
//! These tests invoke the `berth` binary as a subprocess and verify
//! exit codes, stdout content, and JSON output stability.

use std::path::Path;
use std::process::{Command, Output};

fn berth_bin(store: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_berth"));
    cmd.arg("--store").arg(store);
    cmd.env_remove("BERTH_LOG");
    cmd
}

fn temp_store() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn create_json(store: &Path, args: &[&str]) -> serde_json::Value {
    let output = berth_bin(store)
        .args(["--json", "create"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "create failed: {}", stderr(&output));
    serde_json::from_str(&stdout(&output)).unwrap()
}

#[test]
fn cli_version_exits_zero() {
    let store = temp_store();
    let output = berth_bin(store.path()).arg("--version").output().unwrap();
    assert!(output.status.success(), "berth --version must exit 0");
    assert!(stdout(&output).contains("berth"));
}

#[test]
fn cli_help_lists_commands() {
    let store = temp_store();
    let output = berth_bin(store.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    for cmd in ["create", "list", "inspect", "rm", "update", "top", "completions"] {
        assert!(text.contains(cmd), "help must list '{cmd}': {text}");
    }
}

#[test]
fn cli_create_from_flags_assigns_short_name() {
    let store = temp_store();
    let created = create_json(
        store.path(),
        &["--image", "busybox", "--env", "A=1 ", "--security-opt", "seccomp=unconfined"],
    );
    let id = created["id"].as_str().unwrap();
    let name = created["name"].as_str().unwrap();
    assert_eq!(id.len(), 64);
    assert_eq!(name, &id[..6]);
    assert_eq!(created["status"], "created");

    let output = berth_bin(store.path())
        .args(["--json", "inspect", name])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let meta: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(meta["id"], id);
    assert_eq!(meta["env"], serde_json::json!(["A=1"]));
    assert_eq!(meta["security"]["seccomp"], "unconfined");
}

#[test]
fn cli_create_from_spec_file() {
    let store = temp_store();
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("berth.toml");
    std::fs::write(
        &spec,
        r#"spec_version = 1
image = "nginx:1.27"
name = "web"
env = ["PORT=80"]
security_opt = ["apparmor=docker-default"]
"#,
    )
    .unwrap();

    let created = create_json(store.path(), &[spec.to_str().unwrap(), "--env", "DEBUG=1"]);
    assert_eq!(created["name"], "web");
    assert_eq!(created["image"], "nginx:1.27");

    let output = berth_bin(store.path())
        .args(["--json", "inspect", "web"])
        .output()
        .unwrap();
    let meta: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(meta["env"], serde_json::json!(["PORT=80", "DEBUG=1"]));
    assert_eq!(meta["security"]["apparmor"], "docker-default");
}

#[test]
fn cli_create_duplicate_name_fails() {
    let store = temp_store();
    create_json(store.path(), &["--image", "busybox", "--name", "dup"]);
    let output = berth_bin(store.path())
        .args(["create", "--image", "busybox", "--name", "dup"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1), "{}", stderr(&output));
    assert!(stderr(&output).contains("dup"), "{}", stderr(&output));
}

#[test]
fn cli_invalid_spec_file_exits_2() {
    let store = temp_store();
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("berth.toml");
    std::fs::write(&spec, "image = \"busybox\"\nbogus = true\n").unwrap();

    let output = berth_bin(store.path())
        .args(["create", spec.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", stderr(&output));
}

#[test]
fn cli_create_without_image_exits_2() {
    let store = temp_store();
    let output = berth_bin(store.path()).arg("create").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_bad_security_opt_fails_without_creating() {
    let store = temp_store();
    let output = berth_bin(store.path())
        .args(["create", "--image", "busybox", "--security-opt", "apparmor:/tmp/file"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("apparmor:/tmp/file"));

    let output = berth_bin(store.path())
        .args(["--json", "list"])
        .output()
        .unwrap();
    let list: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[test]
fn cli_create_keeps_bare_env_key() {
    let store = temp_store();
    create_json(
        store.path(),
        &["--image", "busybox", "--name", "bare", "--env", "FOO", "--env", "A=1"],
    );
    let output = berth_bin(store.path())
        .args(["--json", "inspect", "bare"])
        .output()
        .unwrap();
    let meta: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(meta["env"], serde_json::json!(["FOO", "A=1"]));
}

#[test]
fn cli_list_empty_store() {
    let store = temp_store();
    let output = berth_bin(store.path()).arg("list").output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("no containers found"));
}

#[test]
fn cli_list_json_contains_created() {
    let store = temp_store();
    create_json(store.path(), &["--image", "busybox", "--name", "one"]);
    create_json(store.path(), &["--image", "busybox", "--name", "two"]);

    let output = berth_bin(store.path())
        .args(["--json", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let list: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"one"));
    assert!(names.contains(&"two"));
}

#[test]
fn cli_update_env_and_security() {
    let store = temp_store();
    create_json(
        store.path(),
        &["--image", "busybox", "--name", "box", "--env", "c=d", "--env", "JUST_KEY=VALUE"],
    );

    let output = berth_bin(store.path())
        .args([
            "--json",
            "update",
            "box",
            "--env",
            "JUST_KEY",
            "--env",
            "a=b c d ",
            "--env",
            "c=e",
            "--security-opt",
            "no-new-privileges=true",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let meta: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(meta["env"], serde_json::json!(["c=e", "a=b c d"]));
    assert_eq!(meta["security"]["no_new_privileges"], true);
}

#[test]
fn cli_update_rejects_invalid_env_entry() {
    let store = temp_store();
    create_json(store.path(), &["--image", "busybox", "--name", "box", "--env", "a=b"]);

    let output = berth_bin(store.path())
        .args(["update", "box", "--env", "=oops"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let output = berth_bin(store.path())
        .args(["--json", "inspect", "box"])
        .output()
        .unwrap();
    let meta: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(meta["env"], serde_json::json!(["a=b"]));
}

#[test]
fn cli_rm_frees_name() {
    let store = temp_store();
    let first = create_json(store.path(), &["--image", "busybox", "--name", "gone"]);

    let output = berth_bin(store.path()).args(["rm", "gone"]).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("removed"));

    let output = berth_bin(store.path())
        .args(["inspect", "gone"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let second = create_json(store.path(), &["--image", "busybox", "--name", "gone"]);
    assert_ne!(first["id"], second["id"]);
}

#[test]
fn cli_inspect_unknown_container_fails() {
    let store = temp_store();
    let output = berth_bin(store.path())
        .args(["inspect", "nonexistent"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no container matching"));
}

#[test]
fn cli_top_with_captured_listing() {
    let store = temp_store();
    create_json(store.path(), &["--image", "busybox", "--name", "proc"]);
    let dir = tempfile::tempdir().unwrap();
    let listing = dir.path().join("ps.txt");
    std::fs::write(
        &listing,
        "UID PID PPID C STIME TTY TIME CMD\n\
         root 1 0 0 3月12 ? 00:00:44 /usr/lib/systemd/systemd --switched-root --system --deserialize 21\n\
         root 88 1 0 10:00 ? 00:00:00 sleep 100\n",
    )
    .unwrap();

    let output = berth_bin(store.path())
        .args(["--json", "top", "proc", "--pid", "1", "--input"])
        .arg(&listing)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let table: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(table["titles"].as_array().unwrap().len(), 8);
    let rows = table["processes"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][4], "3月12");
    assert_eq!(
        rows[0][7],
        "/usr/lib/systemd/systemd --switched-root --system --deserialize 21"
    );
}

#[test]
fn cli_top_missing_pid_fails() {
    let store = temp_store();
    create_json(store.path(), &["--image", "busybox", "--name", "proc"]);
    let dir = tempfile::tempdir().unwrap();
    let listing = dir.path().join("ps.txt");
    std::fs::write(&listing, "PID CMD\n1 init\n").unwrap();

    let output = berth_bin(store.path())
        .args(["top", "proc", "--pid", "1", "--pid", "4242", "--input"])
        .arg(&listing)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("4242"));
}

#[test]
fn cli_completions_bash() {
    let store = temp_store();
    let output = berth_bin(store.path())
        .args(["completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("berth"));
}

#[test]
fn cli_store_that_is_a_file_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("not-a-dir");
    std::fs::write(&bogus, "x").unwrap();
    let output = berth_bin(&bogus).arg("list").output().unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", stderr(&output));
}
