mod common;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

fn labdesk() -> Command {
    Command::cargo_bin("labdesk").expect("binary exists")
}

const SEED_CSV: &str = "\
Client,Month,Year,Status\n\
Acme,jan,2025,pending\n\
Acme,mar,2025,pending\n";

fn seeded_store(ws: &TestWorkspace) -> std::path::PathBuf {
    let csv_path = ws.write("seed.csv", SEED_CSV);
    let store_path = ws.path().join("store.json");
    labdesk()
        .args([
            "import",
            "-i",
            csv_path.to_str().unwrap(),
            "-s",
            store_path.to_str().unwrap(),
        ])
        .assert()
        .success();
    store_path
}

#[test]
fn parsed_update_normalizes_and_reports_affected_count() {
    let ws = TestWorkspace::new();
    let store_path = seeded_store(&ws);
    let parsed = ws.write(
        "parsed.json",
        r#"{"action":"update","filters":{"month":"jan","year":2025},"updates":{"status":"completed"}}"#,
    );

    labdesk()
        .args([
            "edit",
            "-s",
            store_path.to_str().unwrap(),
            "-n",
            "mark all January 2025 deliveries as completed",
            "--parsed",
            parsed.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(
            contains("\"success\": true")
                .and(contains("\"affectedCount\": 1"))
                .and(contains("\"month\": \"January\""))
                .and(contains("\"labStatus\": \"Completed\"")),
        );

    labdesk()
        .args(["export", "-s", store_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("\"Completed\"").and(contains("\"Pending\"")));
}

#[test]
fn delete_instructions_are_refused_and_leave_the_store_alone() {
    let ws = TestWorkspace::new();
    let store_path = seeded_store(&ws);
    let parsed = ws.write(
        "parsed.json",
        r#"{"action":"delete","filters":{"month":"January"}}"#,
    );

    labdesk()
        .args([
            "edit",
            "-s",
            store_path.to_str().unwrap(),
            "-n",
            "delete all January records",
            "--parsed",
            parsed.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(
            contains("\"success\": false").and(contains("\"requiresConfirmation\": true")),
        );

    labdesk()
        .args(["export", "-s", store_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("\"January\"").and(contains("\"March\"")));
}

#[test]
fn zero_match_filters_report_without_updating() {
    let ws = TestWorkspace::new();
    let store_path = seeded_store(&ws);
    let parsed = ws.write(
        "parsed.json",
        r#"{"action":"update","filters":{"month":"December"},"updates":{"status":"completed"}}"#,
    );

    labdesk()
        .args([
            "edit",
            "-s",
            store_path.to_str().unwrap(),
            "-n",
            "complete everything from December",
            "--parsed",
            parsed.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(
            contains("\"success\": false").and(contains("No records match")),
        );

    labdesk()
        .args(["export", "-s", store_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("\"Pending\"").count(2));
}

#[test]
fn edit_requires_a_parser_or_a_parsed_file() {
    let ws = TestWorkspace::new();
    let store_path = seeded_store(&ws);

    labdesk()
        .args([
            "edit",
            "-s",
            store_path.to_str().unwrap(),
            "-n",
            "do something",
        ])
        .assert()
        .failure()
        .stderr(contains("--parser or --parsed"));
}

#[cfg(unix)]
#[test]
fn external_parser_command_drives_the_edit() {
    let ws = TestWorkspace::new();
    let store_path = seeded_store(&ws);
    let script = ws.write(
        "parser.sh",
        "#!/bin/sh\ncat >/dev/null\nprintf '%s' '{\"action\":\"update\",\"filters\":{\"month\":\"mar\"},\"updates\":{\"status\":\"wip\"}}'\n",
    );
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();

    labdesk()
        .args([
            "edit",
            "-s",
            store_path.to_str().unwrap(),
            "-n",
            "move March to work in progress",
            "--parser",
            script.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(
            contains("\"affectedCount\": 1").and(contains("\"labStatus\": \"Work-in-Progress\"")),
        );
}
