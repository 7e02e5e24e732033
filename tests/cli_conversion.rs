//! End-to-end conversions through the command line entry point

use clap::Parser;
use gcodeview::cli::{run, Cli};
use std::fs;
use std::path::Path;

const PRINT: &str = "\
T0
G1 X0 Y0 Z0.2
;TYPE:SKIRT
G1 X-5 Y-5 E1
G1 X15 Y-5 E2
;TYPE:WALL-OUTER
G0 X0 Y0
G1 X10 Y0 E3
G1 X10 Y10 E4
G1 X0 Y10 E5
G1 X0 Y0 E6
";

fn write_print(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, PRINT).unwrap();
    path.to_string_lossy().into_owned()
}

/// Config file next to the inputs, so the user's own config is never read.
fn write_config(dir: &Path, content: &str) -> String {
    let path = dir.join("gcodeview.toml");
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn cli(args: &[&str], config: &str) -> Cli {
    let mut argv = vec!["gcodeview", "--config", config];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

#[tokio::test]
async fn test_json_with_default_name() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_print(dir.path(), "cube.gcode");
    let config = write_config(dir.path(), "");

    // support is hidden unless requested
    run(cli(&[input.as_str()], &config)).await.unwrap();

    let json = fs::read_to_string(dir.path().join("cube.json")).unwrap();
    assert_eq!(
        json,
        r#"{"layers":[[{"z":0.1,"height":0.2,"lines":[[[0.0,0.0],[10.0,0.0],[10.0,10.0],[0.0,10.0],[0.0,0.0]]]}]]}"#
    );
}

#[tokio::test]
async fn test_support_and_obj_naming() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_print(dir.path(), "cube.gcode");
    let config = write_config(dir.path(), "");

    run(cli(
        &[input.as_str(), "--format", "obj", "--support", "yes", "--infill", "off"],
        &config,
    ))
    .await
    .unwrap();

    let obj = fs::read_to_string(dir.path().join("cube_no_infill_support.obj")).unwrap();
    // skirt segment with a corner plus the square loop
    assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 4 * 3 + 4 * 5);
}

#[tokio::test]
async fn test_multiple_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_print(dir.path(), "a.gcode");
    let second = write_print(dir.path(), "b.gcode");
    let config = write_config(dir.path(), "");

    run(cli(&[first.as_str(), second.as_str(), "--jobs", "2"], &config))
        .await
        .unwrap();

    assert!(dir.path().join("a.json").is_file());
    assert!(dir.path().join("b.json").is_file());
}

#[tokio::test]
async fn test_config_file_settings_apply() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_print(dir.path(), "cube.gcode");
    let config = write_config(dir.path(), "[filter]\nignore_infill = true\n");

    run(cli(&[input.as_str()], &config)).await.unwrap();

    assert!(dir.path().join("cube_no_infill.json").is_file());
    assert!(!dir.path().join("cube.json").exists());
}

#[tokio::test]
async fn test_explicit_output_and_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("preview.json");
    let input = dir.path().join("broken.gcode");
    fs::write(&input, "G1 X0 Y0\nG1 Xabc E1\n").unwrap();
    let config = write_config(dir.path(), "");

    let result = run(cli(
        &[input.to_str().unwrap(), "-o", output.to_str().unwrap()],
        &config,
    ))
    .await;

    assert!(result.is_err());
    assert!(!output.exists());
}
