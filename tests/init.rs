use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_shiftmap"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "shiftmap init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".shiftmap.toml");
    assert!(config_path.exists(), ".shiftmap.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[expertise]"));
    assert!(content.contains("[slots]"));

    // Must round-trip through the same loader the commands use
    let config = shiftmap_core::ShiftmapConfig::from_toml(&content).unwrap();
    assert_eq!(config.expertise, shiftmap_core::ExpertiseWeights::standard());
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".shiftmap.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_shiftmap"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".shiftmap.toml")).unwrap();
    assert_eq!(content, "# existing");
}
