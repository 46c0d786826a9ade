use std::fs;
use std::process::{Command, Output};

const CONFIG: &str = r#"{
    "name": "demo",
    "description": "Demo program",
    "prefix": "DEMO_",
    "args": [
        {"label": "a", "description": "First value"},
        {"label": "b"},
        {"label": "count", "names": ["-c", "--count"], "nargs": {"fixed": 1}}
    ]
}"#;

fn argsmith() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argsmith"))
}

fn run_parse(args: &[&str]) -> (Output, String) {
    let out = argsmith()
        .args(["parse", "--config", CONFIG, "--"])
        .args(args)
        .output()
        .expect("failed to run argsmith parse");
    assert!(
        out.status.success(),
        "argsmith parse failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );

    let path = String::from_utf8_lossy(&out.stdout).trim().to_string();
    let content = fs::read_to_string(&path).expect("output file missing");
    let _ = fs::remove_file(&path);
    (out, content)
}

#[test]
fn parse_writes_exports() {
    let (_, content) = run_parse(&["x", "y", "--count", "5"]);
    assert_eq!(
        content,
        "export DEMO_A=\"x\"\nexport DEMO_B=\"y\"\nexport DEMO_COUNT=\"5\"\n"
    );
}

#[test]
fn parse_help_writes_heredoc() {
    let (_, content) = run_parse(&["--help"]);
    assert!(content.starts_with("cat <<'ARGSMITH_HELP'\nUsage:\n\tdemo [-h|--help] <a> <b> [-c|--count]\n"));
    assert!(content.contains("Demo program"));
    assert!(content.ends_with("exit 0\n"));
}

#[test]
fn parse_error_writes_failure() {
    let (_, content) = run_parse(&["--count"]);
    assert!(
        content.contains("expects 1 values but only 0 were provided"),
        "unexpected output:\n{content}"
    );
    assert!(content.ends_with("exit 1\n"));
}

#[test]
fn help_prints_usage() {
    let out = argsmith()
        .args(["help", "--config", CONFIG, "--name", "renamed"])
        .output()
        .expect("failed to run argsmith help");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Usage:\n\trenamed "), "{stdout}");
    assert!(stdout.contains("First value"));
}

#[test]
fn check_accepts_valid_declaration() {
    let out = argsmith()
        .args(["check", "--config", CONFIG])
        .output()
        .expect("failed to run argsmith check");
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "ok");
}

#[test]
fn check_rejects_ordering_mistake() {
    let config = r#"{"args": [{"label": "a", "optional": true}, {"label": "b"}]}"#;
    let out = argsmith()
        .args(["check", "--config", config])
        .output()
        .expect("failed to run argsmith check");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("must be optional as it follows an optional positional argument"),
        "{stderr}"
    );
}

#[test]
fn parse_rejects_bad_option_name() {
    let config = r#"{"args": [{"label": "verbose", "names": ["-verbose"]}]}"#;
    let out = argsmith()
        .args(["parse", "--config", config, "--"])
        .output()
        .expect("failed to run argsmith parse");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("-verbose"));
}
