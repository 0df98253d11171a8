mod common;

use assert_cmd::Command;
use predicates::str::contains;

use common::temp_base;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("asset_tracker_cli").expect("binary built");
    cmd.env("ASSET_TRACKER_CLI_SCRIPT", "1")
        .env("ASSET_TRACKER_HOME", temp_base())
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_creates_and_lists_records() {
    let home = temp_base();
    let input = "new cash\n\
                 submit cash \"name=Rainy day\" platform=ICBC balance=1200\n\
                 list cash\n\
                 exit\n";

    cli()
        .env("ASSET_TRACKER_HOME", &home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Saved cash account #1"))
        .stdout(contains("Rainy day @ ICBC"));

    let json = std::fs::read_to_string(home.join("assets.json")).expect("store written");
    assert!(json.contains("\"Rainy day\""));
}

#[test]
fn script_mode_reports_errors_and_keeps_going() {
    cli()
        .write_stdin("lisst cash\nsubmit cash name=Wallet\nnew holdings\nsubmit holdings symbol=AAPL name=Apple quantity=0\nstatus\n")
        .assert()
        .success()
        .stdout(contains("Suggestion: `list`?"))
        .stdout(contains("No cash account editor is open."))
        .stdout(contains("quantity must be greater than 0."))
        .stdout(contains("holdings     : 0 record(s), editor creating"));
}

#[test]
fn version_prints_build_metadata() {
    cli()
        .write_stdin("version\n")
        .assert()
        .success()
        .stdout(contains("Asset Tracker 0.0.1"));
}
