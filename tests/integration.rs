use std::path::Path;
use std::process::Command;

fn codefence_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_codefence"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

#[test]
fn extract_materializes_multi_file_response() {
    let output = codefence_cmd("basic")
        .args(["extract", "response.md", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "extract failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = stdout_json(&output);
    assert_eq!(report["entry_path"], "/App.tsx");
    assert_eq!(report["is_multi_file"], true);
    assert_eq!(report["layout"], "tabbed");
    assert_eq!(report["status"][0], "Planning components");

    let paths: Vec<&str> = report["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["/App.tsx", "/components/Button.tsx"]);
    assert_eq!(report["fingerprint"].as_str().unwrap().len(), 64);
}

#[test]
fn extract_text_output_lists_files() {
    let output = codefence_cmd("basic").args(["extract", "response.md"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ENTRY   /App.tsx"), "stdout: {stdout}");
    assert!(stdout.contains("FILE    /components/Button.tsx (3 lines)"), "stdout: {stdout}");
    assert!(stdout.contains("STATUS  Planning components"), "stdout: {stdout}");
}

#[test]
fn split_reports_streaming_fence() {
    let output = codefence_cmd("basic")
        .args(["split", "streaming.md", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let segments = stdout_json(&output);
    let segments = segments.as_array().unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0]["kind"], "text");
    assert_eq!(segments[1]["kind"], "code_streaming");
    assert_eq!(segments[1]["language"], "jsx");
    assert!(segments[1]["content"].as_str().unwrap().contains("return <div>"));
}

#[test]
fn diff_reports_changes_with_exit_one() {
    let output = codefence_cmd("basic").args(["diff", "v1.md", "v2.md"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "CREATE  /lib/theme.ts",
            "MODIFY  /components/Button.tsx  (imported by /App.tsx)",
        ]
    );
}

#[test]
fn diff_without_dependents_as_json() {
    let output = codefence_cmd("basic")
        .args(["diff", "v1.md", "v2.md", "--json", "--no-dependents"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let changes = stdout_json(&output);
    let changes = changes.as_array().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0]["change_type"], "create");
    assert_eq!(changes[1]["change_type"], "modify");
    assert!(changes[1].get("dependents").is_none());
}

#[test]
fn diff_of_identical_files_exits_zero() {
    let output = codefence_cmd("basic").args(["diff", "v1.md", "v1.md"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "No changes");
}

#[test]
fn history_points_at_latest_turn() {
    let output = codefence_cmd("basic")
        .args(["history", "chat.json", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "history failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = stdout_json(&output);
    assert_eq!(report["label"], "Version 2 of 2");
    assert_eq!(report["current"], "a2");
    assert_eq!(report["previous"], "a1");
    assert!(report["next"].is_null());

    let second = &report["versions"][1]["changes"];
    assert_eq!(second[0]["change_type"], "create");
    assert_eq!(second[0]["path"], "/Button.tsx");
    assert_eq!(second[0]["dependents"][0], "/App.tsx");
    assert_eq!(second[1]["change_type"], "modify");
    assert_eq!(second[1]["path"], "/App.tsx");
}

#[test]
fn history_selects_an_earlier_turn() {
    let output = codefence_cmd("basic")
        .args(["history", "chat.json", "--select", "a1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["label"], "Version 1 of 2");
    assert_eq!(report["next"], "a2");
    assert!(report["previous"].is_null());
}

#[test]
fn history_live_without_stream_shows_newest_turn() {
    let output = codefence_cmd("basic")
        .args(["history", "chat.json", "--select", "live", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["label"], "Version 2 of 2");
    assert_eq!(report["current"], "a2");
    assert_eq!(report["cursor"]["live"], false);
}

#[test]
fn history_reads_a_turn_directory() {
    let output = codefence_cmd("basic").args(["history", "turns"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Version 2 of 2  (02)"), "stdout: {stdout}");
    assert!(stdout.contains("MODIFY  /index.js"), "stdout: {stdout}");
}

#[test]
fn export_writes_a_vite_app() {
    let out = tempfile::tempdir().unwrap();
    let output = codefence_cmd("basic")
        .args(["export", "response.md", "--framework", "vite", "--name", "counter", "--out"])
        .arg(out.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "export failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert!(out.path().join("src/App.tsx").exists());
    assert!(out.path().join("src/components/Button.tsx").exists());
    assert!(out.path().join("vite.config.ts").exists());
    assert!(out.path().join("tsconfig.json").exists());
    let html = std::fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(html.contains("<script type=\"module\" src=\"/src/main.tsx\"></script>"));
    let shim = std::fs::read_to_string(out.path().join("src/main.tsx")).unwrap();
    assert!(shim.contains("import App from './App';"));
    let manifest = std::fs::read_to_string(out.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"name\": \"counter\""));
}

#[test]
fn config_template_sets_the_entry_file() {
    let output = codefence_cmd("configured")
        .args(["extract", "plain.md", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["entry_path"], "/index.js");
    assert_eq!(report["files"][0]["path"], "/index.js");
    assert!(report["files"][0]["content"].as_str().unwrap().contains("textContent"));
}

#[test]
fn blank_response_gets_the_configured_placeholder() {
    let output = codefence_cmd("configured")
        .args(["extract", "blank.md", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["is_multi_file"], false);
    assert_eq!(report["files"][0]["path"], "/index.js");
    assert_eq!(report["files"][0]["content"], "// nothing yet");
}

#[test]
fn cli_template_overrides_config() {
    let output = codefence_cmd("configured")
        .args(["extract", "plain.md", "--json", "--template", "vue"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["entry_path"], "/src/App.vue");
}

#[test]
fn unknown_template_in_config_exits_two() {
    let output = codefence_cmd("broken").args(["extract", "one.md"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown Template"), "stderr: {stderr}");
    assert!(stderr.contains("Did you mean `react`?"), "stderr: {stderr}");
}

#[test]
fn missing_file_exits_two() {
    let output = codefence_cmd("basic").args(["extract", "nope.md"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("`nope.md` does not exist."));
}
