//! Smoke test for the `complete` subcommand.

use assert_cmd::Command;

#[test]
fn complete_lists_matches_with_usage_hints() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("report.sql"),
        "-- usage: @report <month>\nselect 1 from dual;\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("Report2.sql"), "select 2 from dual;\n").unwrap();
    std::fs::write(dir.path().join("other.txt"), "").unwrap();

    let assert = Command::cargo_bin("tabsh")
        .unwrap()
        .args([
            "--config",
            "/no/such/tabsh.toml",
            "--workdir",
            dir.path().to_str().unwrap(),
            "complete",
            "rep",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout, "report.sql\t@report <month>\nReport2.sql\n");
}

#[test]
fn complete_with_no_match_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("report.sql"), "").unwrap();

    let assert = Command::cargo_bin("tabsh")
        .unwrap()
        .args([
            "--config",
            "/no/such/tabsh.toml",
            "--workdir",
            dir.path().to_str().unwrap(),
            "complete",
            "zzz",
        ])
        .assert()
        .success();

    assert!(assert.get_output().stdout.is_empty());
}
