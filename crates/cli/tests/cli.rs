use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("libris-cli").unwrap();
    // Nothing listens here; commands that reach the network fail fast
    cmd.env("LIBRIS_SERVER_URL", "http://127.0.0.1:9");
    cmd
}

#[test]
fn help_lists_every_command() {
    let output = cli().arg("--help").output().unwrap();
    assert!(output.status.success());

    let help = String::from_utf8(output.stdout).unwrap();
    for command in ["list", "show", "delete", "create", "categories", "add-category"] {
        assert!(help.contains(command), "missing {command} in help");
    }
}

#[test]
fn future_publication_date_is_refused_before_any_request() {
    let output = cli()
        .args([
            "create", "--title", "Dune", "--author", "Herbert", "--isbn", "9780441013593", "--date",
            "2999-01-01",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("cannot be in the future"), "{stderr}");
}

#[test]
fn malformed_date_explains_the_format() {
    let output = cli()
        .args(["create", "--title", "Dune", "--author", "Herbert", "--isbn", "1", "--date", "01/08/1965"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("YYYY-MM-DD"));
}

#[test]
fn delete_against_missing_server_reports_failure() {
    cli()
        .args(["delete", "3"])
        .assert()
        .success()
        .stdout("Could not delete book 3\n");
}
