use std::io::Write;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;

fn demo(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../demos")
        .join(file)
}

#[test]
fn prints_home_rows_from_fixture() {
    let mut cmd = cargo_bin_cmd!("fishit-player");
    let output = cmd
        .arg("--config")
        .arg(demo("fishit.toml"))
        .arg("--fixture")
        .arg(demo("home_fixture.json"))
        .arg("--logs")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);

    assert!(text.contains("Continue Watching (1)"), "{text}");
    assert!(text.contains("Recently Added"), "{text}");
    assert!(text.contains("Loaded config from"), "log export missing: {text}");
}

#[test]
fn invalid_config_fails_with_logged_warnings() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(file, "[home]\ncatalog_limit = 0\nnew_item_window_days = 99999")
        .unwrap();

    let mut cmd = cargo_bin_cmd!("fishit-player");
    let output = cmd
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let text = String::from_utf8_lossy(&output);

    assert!(text.contains("Invalid player config"), "{text}");
    assert!(text.contains("home.catalog_limit"), "{text}");
    assert!(text.contains("new_item_window_days"), "{text}");
}
