use std::{fs, path::PathBuf, process::Command};

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("zoo-tycoon-{}-{name}", std::process::id()))
}

#[test]
fn demo_scenario_runs_and_reports_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_zoo-tycoon"))
        .args(["--log-level", "off", "run"])
        .output()
        .expect("binary launches");

    assert!(output.status.success(), "demo run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("actions"), "summary missing: {stdout}");
    assert!(stdout.contains("habitats"), "zoo line missing: {stdout}");
}

#[test]
fn saved_zoo_can_be_resumed() {
    let script = scratch("script.txt");
    let save = scratch("save.txt");
    let config = scratch("config.toml");
    fs::write(&config, "columns = 12\nrows = 10\n[terrain]\ntrees = 0\n").expect("temp dir");
    fs::write(&script, "habitat Aviary 2 2\nanimal Parrot 2 2\n").expect("temp dir");

    let first = Command::new(env!("CARGO_BIN_EXE_zoo-tycoon"))
        .arg("--log-level")
        .arg("off")
        .arg("--config")
        .arg(&config)
        .arg("--save")
        .arg(&save)
        .arg("run")
        .arg(&script)
        .output()
        .expect("binary launches");
    assert!(first.status.success(), "first run should succeed");
    let saved = fs::read_to_string(&save).expect("save written");
    assert!(saved.starts_with("zoo:v1:12x10:"), "unexpected save {saved}");

    fs::write(&script, "animal Toucan 3 3\n").expect("temp dir");
    let second = Command::new(env!("CARGO_BIN_EXE_zoo-tycoon"))
        .arg("--log-level")
        .arg("off")
        .arg("--config")
        .arg(&config)
        .arg("--load")
        .arg(&save)
        .arg("run")
        .arg(&script)
        .output()
        .expect("binary launches");
    assert!(second.status.success(), "resumed run should succeed");
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("1 habitats, 0 shops, 2 animals"), "{stdout}");

    for path in [script, save, config] {
        let _ = fs::remove_file(path);
    }
}

#[test]
fn malformed_script_fails_with_line_number() {
    let script = scratch("broken.txt");
    fs::write(&script, "undo\nhabitat\n").expect("temp dir");

    let output = Command::new(env!("CARGO_BIN_EXE_zoo-tycoon"))
        .args(["--log-level", "off", "run"])
        .arg(&script)
        .output()
        .expect("binary launches");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
    let _ = fs::remove_file(script);
}

#[test]
fn script_cells_outside_the_grid_are_rejected_before_running() {
    let script = scratch("outside.txt");
    let config = scratch("outside.toml");
    fs::write(&config, "columns = 12\nrows = 8\n").expect("temp dir");
    fs::write(&script, "visitor 1 1\nhabitat Aviary 11 7\n").expect("temp dir");

    let output = Command::new(env!("CARGO_BIN_EXE_zoo-tycoon"))
        .args(["--log-level", "off", "--config"])
        .arg(&config)
        .arg("run")
        .arg(&script)
        .output()
        .expect("binary launches");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
    assert!(stderr.contains("does not fit the 12x8 grid"), "{stderr}");
    for path in [script, config] {
        let _ = fs::remove_file(path);
    }
}
