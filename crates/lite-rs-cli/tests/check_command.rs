use std::path::PathBuf;
use std::process::Command;

fn program_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("programs")
        .join(name)
}

fn lite_rs() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lite-rs"))
}

#[cfg(feature = "train")]
#[test]
fn check_prints_inferred_shapes() {
    let output = lite_rs()
        .arg("check")
        .arg(program_path("mean_backward.json"))
        .args(["-i", "x=3,4", "-i", "loss@GRAD=1"])
        .output()
        .expect("run lite-rs");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.contains(&"loss: [1]"), "{stdout}");
    assert!(lines.contains(&"x: [3, 4]"), "{stdout}");
    assert!(lines.contains(&"x@GRAD: [3, 4]"), "{stdout}");
}

#[cfg(feature = "train")]
#[test]
fn check_runs_reference_kernels() {
    let output = lite_rs()
        .arg("check")
        .arg(program_path("mean_backward.json"))
        .args(["-i", "x=2,2", "-i", "loss@GRAD=1", "--run", "--seed", "3"])
        .output()
        .expect("run lite-rs");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let grad_line = stdout
        .lines()
        .find(|line| line.starts_with("x@GRAD: [2, 2] ["))
        .unwrap_or_else(|| panic!("no gradient values in {stdout}"));
    assert!(grad_line.ends_with(']'));
}

#[cfg(feature = "train")]
#[test]
fn run_binds_kernels_even_when_env_disables_them() {
    let output = lite_rs()
        .env("LITE_RS_BIND_KERNELS", "0")
        .arg("check")
        .arg(program_path("mean_backward.json"))
        .args(["-i", "x=2,2", "-i", "loss@GRAD=1", "--run"])
        .output()
        .expect("run lite-rs");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.lines().any(|line| line.starts_with("loss: [1] [")),
        "{stdout}"
    );
}

#[cfg(feature = "train")]
#[test]
fn build_failure_reports_its_cause_once() {
    let output = lite_rs()
        .arg("check")
        .arg(program_path("mean_backward.json"))
        .args(["-i", "x=2,2"])
        .output()
        .expect("run lite-rs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr
            .matches("variable 'loss@GRAD' is not bound in scope")
            .count(),
        1,
        "{stderr}"
    );
}

#[test]
fn missing_input_fails_with_context() {
    let output = lite_rs()
        .arg("check")
        .arg(program_path("mean_backward.json"))
        .output()
        .expect("run lite-rs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to build program"), "{stderr}");
}

#[test]
fn ops_lists_builtin_types() {
    let output = lite_rs().arg("ops").output().expect("run lite-rs");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line == "mean"), "{stdout}");
    assert_eq!(
        stdout.lines().any(|line| line == "mean_grad"),
        cfg!(feature = "train")
    );
}
