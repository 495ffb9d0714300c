use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn script_mode_authors_a_world() {
    let home = TempDir::new().unwrap();
    let input = "world new Demo\n\
                 category add Regions\n\
                 category add Coastline Regions\n\
                 category tree\n\
                 world save demo\n\
                 exit\n";

    let mut cmd = Command::cargo_bin("codex_core_cli").unwrap();
    cmd.env("CODEX_CORE_CLI_SCRIPT", "1")
        .env("CODEX_CORE_HOME", home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("New world created"))
        .stdout(contains("Coastline"))
        .stdout(contains("World saved"));

    let saved = home.path().join("worlds").join("demo.json");
    let json = std::fs::read_to_string(saved).unwrap();
    assert!(json.contains("\"Regions\""));
    assert!(json.contains("\"Coastline\""));
}

#[test]
fn script_mode_delete_orphans_children() {
    let home = TempDir::new().unwrap();
    let input = "world new Demo\n\
                 category add Regions\n\
                 category add Coastline Regions\n\
                 category rm Regions\n\
                 category tree\n\
                 exit\n";

    let mut cmd = Command::cargo_bin("codex_core_cli").unwrap();
    cmd.env("CODEX_CORE_CLI_SCRIPT", "1")
        .env("CODEX_CORE_HOME", home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("removed"))
        .stdout(contains("Orphaned"))
        .stdout(contains("unreachable"));
}

#[test]
fn script_mode_reports_unknown_commands() {
    let home = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("codex_core_cli").unwrap();
    cmd.env("CODEX_CORE_CLI_SCRIPT", "1")
        .env("CODEX_CORE_HOME", home.path())
        .write_stdin("wrold list\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command"))
        .stdout(contains("Suggestion"));
}
