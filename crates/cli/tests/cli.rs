use assert_cmd::Command;

fn inkwell() -> Command {
    let mut cmd = Command::cargo_bin("inkwell").unwrap();
    cmd.env("INKWELL_ENV", "local").env("RUST_LOG", "error");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = inkwell().arg("--help").assert().success().get_output().clone();
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["serve", "ping", "openapi"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn openapi_prints_posts_paths() {
    let output = inkwell().arg("openapi").assert().success().get_output().clone();
    let spec: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert!(spec["paths"]["/api/posts"]["post"].is_object());
    assert!(spec["paths"]["/api/posts/{id}"]["patch"].is_object());
    assert!(spec["components"]["schemas"]["Post"].is_object());
}

#[test]
fn unknown_environment_fails() {
    inkwell()
        .env("INKWELL_ENV", "qa")
        .arg("openapi")
        .assert()
        .failure();
}
