use std::fs;
use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_callbook")
}

fn callbook() -> Command {
    let mut cmd = Command::new(bin());
    cmd.env_remove("CALLBOOK_OUT_DIR")
        .env_remove("CALLBOOK_SOURCES")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn missing_command_returns_usage() {
    let output = callbook().output().expect("callbook should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: callbook"));
}

#[test]
fn import_command_returns_usage_without_source() {
    let output = callbook()
        .arg("import")
        .output()
        .expect("import should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: callbook import"));
}

#[test]
fn import_command_rejects_unknown_source() {
    let output = callbook()
        .args(["import", "uls"])
        .output()
        .expect("import should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown source 'uls'"));
    assert!(stderr.contains("lotw-file"));
}

#[test]
fn import_command_creates_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("EN.dat");
    fs::write(
        &input,
        "EN|1|||W1AW|L|1|ARRL INC||||||||225 MAIN ST|NEWINGTON|CT|06111\n",
    )
    .expect("fixture should be written");
    let out = dir.path().join("out");

    let output = callbook()
        .args(["import", "en", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .output()
        .expect("import should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("import complete: source=en rows=1 created=1"));
    assert!(out.join("W1").join("W1AW.json").is_file());
}

#[test]
fn import_command_emits_json_report_and_fails_on_corrupt_record() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir_all(out.join("W1")).unwrap();
    fs::write(out.join("W1").join("W1AW.json"), "{not json").unwrap();
    let input = dir.path().join("AM.dat");
    fs::write(&input, "AM|1|||W1AW|E\n").unwrap();

    let output = callbook()
        .env("CALLBOOK_OUT_DIR", &out)
        .args(["import", "am", "--json", "--input"])
        .arg(&input)
        .output()
        .expect("import should run");

    assert_eq!(output.status.code(), Some(1));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("import should emit json");
    assert_eq!(payload["corrupt_records"], 1);
    assert_eq!(payload["failures"][0]["kind"], "corrupt_record");
    assert_eq!(payload["failures"][0]["callsign"], "W1AW");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("critical failure"));
}

#[test]
fn import_command_fails_on_record_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("W1"), "not a directory").unwrap();
    let input = dir.path().join("EN.dat");
    fs::write(
        &input,
        "EN|1|||W1AW|L|1|ARRL INC||||||||225 MAIN ST|NEWINGTON|CT|06111\n\
         EN|2|||N0CALL|L|2|OP||||||||ADDR|CITY|MO|63101\n",
    )
    .unwrap();

    let output = callbook()
        .args(["import", "en", "--json", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .output()
        .expect("import should run");

    assert_eq!(output.status.code(), Some(1));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("import should emit json");
    assert_eq!(payload["io_failures"], 1);
    assert_eq!(payload["created"], 1);
    assert_eq!(payload["failures"][0]["kind"], "io");
    assert_eq!(payload["failures"][0]["callsign"], "W1AW");
    assert!(out.join("N0").join("N0CALL.json").is_file());
}

#[test]
fn import_command_fails_on_missing_input() {
    let dir = tempfile::tempdir().unwrap();

    let output = callbook()
        .args(["import", "am", "--input"])
        .arg(dir.path().join("absent.dat"))
        .arg("--out")
        .arg(dir.path())
        .output()
        .expect("import should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("import failed"));
}

#[test]
fn sources_command_lists_custom_sources() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("sources.yaml");
    fs::write(
        &sources,
        "sources:\n  - name: hd\n    input: HD.dat\n    delimiter: \"|\"\n    callsign_column: 4\n    action: skip_if_missing\n    fields:\n      - { name: status, column: 5 }\n",
    )
    .unwrap();

    let output = callbook()
        .arg("sources")
        .arg("--sources")
        .arg(&sources)
        .output()
        .expect("sources should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("en\tcreate\tEN.dat"));
    assert!(stdout.contains("lotw-file\tlist_missing"));
    assert!(stdout.contains("hd\tskip_if_missing\tHD.dat"));
}

#[test]
fn check_command_returns_non_zero_on_corrupt_store() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("W1")).unwrap();
    fs::write(dir.path().join("W1").join("W1AW.json"), "[").unwrap();

    let output = callbook()
        .args(["check", "--out"])
        .arg(dir.path())
        .output()
        .expect("check should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("check failed: 1 issue(s)"));
}
