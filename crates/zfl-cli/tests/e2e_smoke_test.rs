use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::{TempDir, tempdir};

use zfl::ZflError;
use zfl_cli::{Args, CliError, Emit, run};

/// Demo flows live at the workspace root.
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn collect_zfl_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("zfl"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

/// Temp dir holding an empty config, so no local or user config is picked up.
fn workspace() -> (TempDir, String) {
    let dir = tempdir().expect("Failed to create temp directory");
    let config = dir.path().join("config.toml");
    fs::write(&config, "").unwrap();
    let config = config.to_string_lossy().to_string();
    (dir, config)
}

fn args(input: &Path, output: &Path, config: &str, emit: Emit) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        config: Some(config.to_string()),
        emit,
        pretty: false,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_demos() {
    let (dir, config) = workspace();
    let demos = collect_zfl_files(demos_dir());
    assert!(!demos.is_empty(), "No demos found");

    let mut failed = Vec::new();
    for demo in &demos {
        let output = dir.path().join(format!(
            "{}.json",
            demo.file_stem().unwrap().to_string_lossy()
        ));
        match run(&args(demo, &output, &config, Emit::View)) {
            Ok(()) => {
                let json = fs::read_to_string(&output).unwrap();
                assert!(json.starts_with(r#"{"schema":"zfl.eventflow.view@1","#));
                assert!(json.ends_with('\n'));
            }
            Err(err) => failed.push((demo.clone(), err)),
        }
    }

    if !failed.is_empty() {
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn emits_each_stage() {
    let (dir, config) = workspace();
    let input = demos_dir().join("simple.zfl");

    for (emit, needle) in [
        (Emit::Raw, r#""className":"SimpleFlow""#),
        (Emit::Semantic, r#""name":"doSomething""#),
        (Emit::Ir, r#""id":"policy:UserAction:doSomething""#),
        (Emit::View, r#""systemGroups":[{"systemName":"TestSystem""#),
    ] {
        let output = dir.path().join(format!("{emit:?}.json"));
        run(&args(&input, &output, &config, emit)).unwrap();
        let json = fs::read_to_string(&output).unwrap();
        assert!(json.contains(needle), "{emit:?} output lacks {needle}");
    }
}

#[test]
fn source_refs_name_the_input_file() {
    let (dir, config) = workspace();
    let input = dir.path().join("one.zfl");
    fs::write(&input, "flow One {\n  start Go\n}\n").unwrap();
    let output = dir.path().join("ir.json");

    run(&args(&input, &output, &config, Emit::Ir)).unwrap();

    let json = fs::read_to_string(&output).unwrap();
    let expected = format!(r#""file":"{}","line":2"#, input.to_string_lossy());
    assert!(json.contains(&expected), "{json}");
}

#[test]
fn layout_config_is_applied() {
    let (dir, _) = workspace();
    let config = dir.path().join("wide.toml");
    fs::write(&config, "[layout]\nrank_spacing = 300.0\n").unwrap();
    let output = dir.path().join("view.json");

    let mut args = args(
        &demos_dir().join("simple.zfl"),
        &output,
        &config.to_string_lossy(),
        Emit::View,
    );
    args.pretty = true;
    run(&args).unwrap();

    let json = fs::read_to_string(&output).unwrap();
    assert!(json.contains(r#""rankSpacing": 300.0"#));
    assert!(json.contains(r#""nodeSpacing": 80.0"#));
}

#[test]
fn errors_are_reported_after_output_is_written() {
    let (dir, config) = workspace();
    let input = dir.path().join("broken.zfl");
    fs::write(&input, "flow Broken {\n  start Go\n  when Go { event Lost }\n}\n").unwrap();
    let output = dir.path().join("view.json");

    let err = run(&args(&input, &output, &config, Emit::View)).unwrap_err();
    match err {
        CliError::Diagnostics {
            diagnostics, src, ..
        } => {
            assert!(diagnostics.iter().any(|d| d.severity().is_error()));
            assert!(src.starts_with("flow Broken"));
        }
        other => panic!("Expected diagnostics, got {other}"),
    }
    assert!(output.exists());
}

#[test]
fn missing_explicit_config_fails() {
    let (dir, _) = workspace();
    let output = dir.path().join("view.json");
    let missing = dir.path().join("missing.toml");

    let err = run(&args(
        &demos_dir().join("simple.zfl"),
        &output,
        &missing.to_string_lossy(),
        Emit::View,
    ))
    .unwrap_err();
    assert!(matches!(err, CliError::Zfl(ZflError::Config(_))));
    assert!(!output.exists());
}

#[test]
fn missing_input_fails() {
    let (dir, config) = workspace();
    let err = run(&args(
        &dir.path().join("nope.zfl"),
        &dir.path().join("out.json"),
        &config,
        Emit::View,
    ))
    .unwrap_err();
    assert!(matches!(err, CliError::Zfl(ZflError::Io(_))));
}
