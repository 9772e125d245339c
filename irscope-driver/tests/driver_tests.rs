//! Driver tests: module files in, reports out

use irscope_driver::{demos, inspect_to, load_module};
use irscope_inspect::{render_text, OptimizationLevel, PreservedAnalyses, ReportFormat};
use irscope_ir::Module;
use pretty_assertions::assert_eq;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn irscope() -> Command {
    Command::new(env!("CARGO_BIN_EXE_irscope"))
}

fn write_module(dir: &TempDir, module: &Module) -> std::path::PathBuf {
    let path = dir.path().join(format!("{}.json", module.name));
    fs::write(&path, module.to_json().unwrap()).unwrap();
    path
}

#[test]
fn test_load_module_round_trip() {
    let dir = TempDir::new().unwrap();
    let module = demos::build("memory").unwrap();
    let path = write_module(&dir, &module);

    assert_eq!(load_module(&path).unwrap(), module);
}

#[test]
fn test_load_module_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = load_module(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));
    assert!(load_module(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_inspect_to_matches_library_report() {
    for name in demos::NAMES {
        let module = demos::build(name).unwrap();
        let mut sink = Vec::new();
        let preserved = inspect_to(&module, ReportFormat::Text, OptimizationLevel::O3, &mut sink).unwrap();
        assert_eq!(preserved, PreservedAnalyses::All);
        assert_eq!(String::from_utf8(sink).unwrap(), render_text(&module));
    }
}

#[test]
fn test_inspect_json_output() {
    let module = demos::build("calls").unwrap();
    let mut sink = Vec::new();
    inspect_to(&module, ReportFormat::Json, OptimizationLevel::O0, &mut sink).unwrap();

    let report: serde_json::Value = serde_json::from_slice(&sink).unwrap();
    let main = &report["functions"][2];
    assert_eq!(main["name"], "main");
    let categories: Vec<&str> = main["blocks"][0]["instructions"].as_array().unwrap().iter()
        .map(|inst| inst["facts"]["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["direct_call", "direct_call", "indirect_call", "indirect_call", "return"]);
}

#[test]
fn test_cli_demo_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.txt");

    let status = irscope().args(["demo", "scenario", "-o"]).arg(&out).status().unwrap();
    assert!(status.success());
    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text, render_text(&demos::build("scenario").unwrap()));
}

#[test]
fn test_cli_inspect_with_layout_override() {
    let dir = TempDir::new().unwrap();
    let path = write_module(&dir, &demos::build("memory").unwrap());
    let out = dir.path().join("report.json");

    let status = irscope()
        .arg("inspect")
        .arg(&path)
        .args(["--format", "json", "--data-layout", "e-p:32:32-i64:32:64", "-o"])
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let scratch = &report["functions"][0]["blocks"][0]["instructions"][3]["facts"];
    assert_eq!(scratch["category"], "stack_allocation");
    assert_eq!(scratch["size"], serde_json::json!({ "kind": "bytes", "bytes": 32 }));
    assert_eq!(scratch["align"], 8);
}

#[test]
fn test_cli_dump_is_loadable() {
    let output = irscope().args(["dump", "control"]).output().unwrap();
    assert!(output.status.success());
    let module = Module::from_json(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(module, demos::build("control").unwrap());
}

#[test]
fn test_cli_errors_exit_nonzero() {
    let output = irscope().args(["demo", "nope"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown demo 'nope'"));

    let output = irscope().args(["inspect", "/nonexistent/module.json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}
