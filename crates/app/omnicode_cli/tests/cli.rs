use predicates::prelude::*;
use assert_cmd::Command;
use tempfile::TempDir;

fn omnicode(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("omnicode").expect("binary built");
    cmd.env("OMNICODE_DATA_DIR", data_dir.path())
        .env_remove("OMNICODE_PASSWORD")
        .env_remove("AWS_COGNITO_APP_CLIENT_ID")
        .env("RUST_LOG", "info");
    cmd
}

#[test]
fn version_prints_package() {
    let dir = TempDir::new().unwrap();
    omnicode(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("omnicode_cli"));
}

#[test]
fn check_password_reports_first_violation() {
    let dir = TempDir::new().unwrap();
    omnicode(&dir)
        .arg("check-password")
        .write_stdin("abcdefgh\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Password must contain at least one uppercase letter.",
        ));
}

#[test]
fn check_password_accepts_valid_password() {
    let dir = TempDir::new().unwrap();
    omnicode(&dir)
        .arg("check-password")
        .write_stdin("Abcdef1!\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Password is valid."));
}

#[test]
fn whoami_without_session_fails() {
    let dir = TempDir::new().unwrap();
    omnicode(&dir)
        .arg("whoami")
        .assert()
        .failure()
        .stdout(predicate::str::contains("You must be logged in"));
}

#[test]
fn logout_without_session_is_fine() {
    let dir = TempDir::new().unwrap();
    omnicode(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session."));
}

#[test]
fn login_rejects_bad_email_before_any_request() {
    let dir = TempDir::new().unwrap();
    omnicode(&dir)
        .args(["login", "--email", "not-an-email"])
        .env("OMNICODE_PASSWORD", "Abcdef1!")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Please enter a valid email address."));
    assert!(!dir.path().join("session.json").exists());
}

#[test]
fn code_operations_require_login() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("m.py");
    std::fs::write(&file, "def add(a, b):\n").unwrap();

    omnicode(&dir)
        .args(["refactor", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("You must be logged in"));

    omnicode(&dir)
        .args(["complete", "--line", "1", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("You must be logged in"));
}

#[test]
fn corrupt_session_counts_as_logged_out() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("session.json"), "{\"AccessToken\": \"x\"}").unwrap();
    omnicode(&dir)
        .args(["dashboard", "--local"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("You must be logged in"));
}

#[test]
fn logout_clears_unreadable_session() {
    let dir = TempDir::new().unwrap();
    let session = dir.path().join("session.json");
    std::fs::write(&session, "{not json").unwrap();
    omnicode(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
    assert!(!session.exists());
}

#[test]
fn verbose_flag_is_accepted_after_the_subcommand() {
    let dir = TempDir::new().unwrap();
    omnicode(&dir)
        .env_remove("RUST_LOG")
        .args(["version", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("omnicode_cli"));
}
