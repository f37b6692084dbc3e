//! Integration tests for the adminhub binary.

mod common;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use common::{GOOD_PASSWORD, spawn_backend};

/// adminhub command isolated in `dir`, with no env leaking in.
fn adminhub(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("adminhub");
    cmd.current_dir(dir.path())
        .env_remove("ADMINHUB_API_URL")
        .env_remove("ADMINHUB_WITH_CREDENTIALS")
        .env_remove("ADMINHUB_TIMEOUT_SECS")
        .env_remove("ADMINHUB_PASSWORD")
        .env_remove("ADMINHUB_LOG")
        .env("ADMINHUB_STATE_DIR", dir.path().join(".adminhub"));
    cmd
}

/// Run a blocking command from inside an async test.
async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    output.assert()
}

/// Sign in against the fake backend so later commands find a session.
async fn sign_in(dir: &TempDir, base: &str) {
    let mut login = adminhub(dir);
    login.args([
        "--api-url",
        base,
        "login",
        "--email",
        "ana@example.com",
        "--password",
        GOOD_PASSWORD,
    ]);
    run(login).await.success();
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("clients"))
            .stdout(predicate::str::contains("dashboard"));
    }

    #[test]
    fn test_version() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_dashboard_needs_no_backend() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .arg("dashboard")
            .assert()
            .success()
            .stdout(predicate::str::contains("Recent orders"))
            .stdout(predicate::str::contains("R$ 1.250,00"));
    }

    #[test]
    fn test_whoami_without_session() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .arg("whoami")
            .assert()
            .success()
            .stdout(predicate::str::contains("Not signed in"));
    }

    #[test]
    fn test_can_with_empty_requirement_is_allowed() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .arg("can")
            .assert()
            .success()
            .stdout(predicate::str::contains("has access"));
    }

    #[test]
    fn test_can_without_session_is_denied() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .args(["can", "clients.read"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("lacks access"));
    }

    #[test]
    fn test_can_rejects_unknown_kind() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .args(["can", "x", "--kind", "group"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown permission kind"));
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No adminhub.toml found"))
            .stdout(predicate::str::contains("http://localhost:5000"));
    }

    #[test]
    fn test_config_init_then_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created adminhub.toml"));
        assert!(dir.path().join(".adminhub/adminhub.toml").exists());

        adminhub(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join(".adminhub");
        fs::create_dir_all(&state).unwrap();
        fs::write(
            state.join("adminhub.toml"),
            "[api]\nbase_url = \"ftp://example.com\"\n\n[list]\ndefault_page_size = 0\n",
        )
        .unwrap();

        adminhub(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration warnings"))
            .stdout(predicate::str::contains("unsupported scheme"))
            .stdout(predicate::str::contains("default_page_size"));
    }

    #[test]
    fn test_cli_api_url_overrides_file() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .args(["--api-url", "https://api.example.com", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("api_url = \"https://api.example.com\""));
    }
}

// =============================================================================
// Against a fake backend
// =============================================================================

mod backend {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_whoami_logout_round() {
        let (base, _backend) = spawn_backend().await;
        let dir = TempDir::new().unwrap();

        let mut login = adminhub(&dir);
        login.args([
            "--api-url",
            base.as_str(),
            "login",
            "--email",
            "ana@example.com",
            "--password",
            GOOD_PASSWORD,
        ]);
        run(login)
            .await
            .success()
            .stdout(predicate::str::contains("Ana Admin"));
        assert!(dir.path().join(".adminhub/user.json").exists());
        assert!(dir.path().join(".adminhub/cookies").exists());

        let mut whoami = adminhub(&dir);
        whoami.args(["--api-url", base.as_str(), "whoami"]);
        run(whoami)
            .await
            .success()
            .stdout(predicate::str::contains("clients.write"));

        let mut can = adminhub(&dir);
        can.args(["--api-url", base.as_str(), "can", "clients.read", "clients.write", "--mode", "all"]);
        run(can).await.success();

        let mut logout = adminhub(&dir);
        logout.args(["--api-url", base.as_str(), "logout"]);
        run(logout).await.success();
        assert!(!dir.path().join(".adminhub/cookies").exists());

        let mut whoami = adminhub(&dir);
        whoami.args(["--api-url", base.as_str(), "whoami"]);
        run(whoami)
            .await
            .success()
            .stdout(predicate::str::contains("Not signed in"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_login_exits_nonzero() {
        let (base, _backend) = spawn_backend().await;
        let dir = TempDir::new().unwrap();

        let mut login = adminhub(&dir);
        login.args([
            "--api-url",
            base.as_str(),
            "login",
            "--email",
            "ana@example.com",
            "--password",
            "wrong",
        ]);
        run(login)
            .await
            .code(1)
            .stderr(predicate::str::contains("Incorrect email or password"));
        assert!(!dir.path().join(".adminhub/user.json").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_clients_list_prints_table_and_location() {
        let (base, backend) = spawn_backend().await;
        let dir = TempDir::new().unwrap();
        sign_in(&dir, &base).await;

        let mut list = adminhub(&dir);
        list.args([
            "--api-url",
            base.as_str(),
            "clients",
            "list",
            "--at",
            "/pt-br/clients?page=3",
            "--search",
            "carla",
        ]);
        run(list)
            .await
            .success()
            .stdout(predicate::str::contains("Carla Dias"))
            .stdout(predicate::str::contains("Location: /pt-br/clients?search=carla"));

        let sent = backend.last("/tenant/api/v1/Client").unwrap();
        assert_eq!(sent.query.get("PageNumber").map(String::as_str), Some("1"));
        assert_eq!(sent.query.get("src").map(String::as_str), Some("carla"));

        // The next run without a query resumes from the session cache.
        let mut again = adminhub(&dir);
        again.args(["--api-url", base.as_str(), "clients", "list", "--at", "/pt-br/clients"]);
        run(again)
            .await
            .success()
            .stdout(predicate::str::contains("Carla Dias"))
            .stdout(predicate::str::contains("Bruno Lima").not());

        let mut reset = adminhub(&dir);
        reset.args(["--api-url", base.as_str(), "clients", "list", "--at", "/pt-br/clients", "--reset"]);
        run(reset)
            .await
            .success()
            .stdout(predicate::str::contains("Bruno Lima"))
            .stdout(predicate::str::contains("Location: /pt-br/clients\n"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_clients_delete_with_yes() {
        let (base, backend) = spawn_backend().await;
        let dir = TempDir::new().unwrap();
        sign_in(&dir, &base).await;

        let mut delete = adminhub(&dir);
        delete.args(["--api-url", base.as_str(), "--yes", "clients", "delete", "c-2"]);
        run(delete).await.success();

        assert!(backend.last("/tenant/api/v1/Client/Delete/c-2").is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_clients_require_a_session() {
        let (base, backend) = spawn_backend().await;
        let dir = TempDir::new().unwrap();

        let mut list = adminhub(&dir);
        list.args(["--api-url", base.as_str(), "clients", "list"]);
        run(list)
            .await
            .failure()
            .stderr(predicate::str::contains("Not signed in"));
        assert!(backend.last("/tenant/api/v1/Client").is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_logout_forgets_list_state() {
        let (base, backend) = spawn_backend().await;
        let dir = TempDir::new().unwrap();
        sign_in(&dir, &base).await;

        let mut list = adminhub(&dir);
        list.args([
            "--api-url",
            base.as_str(),
            "clients",
            "list",
            "--at",
            "/pt-br/clients",
            "--search",
            "carla",
            "--rows",
            "25",
        ]);
        run(list).await.success();
        assert!(dir.path().join(".adminhub/session.json").exists());

        let mut logout = adminhub(&dir);
        logout.args(["--api-url", base.as_str(), "logout"]);
        run(logout).await.success();
        assert!(!dir.path().join(".adminhub/session.json").exists());

        sign_in(&dir, &base).await;
        let mut again = adminhub(&dir);
        again.args(["--api-url", base.as_str(), "clients", "list", "--at", "/pt-br/clients"]);
        run(again)
            .await
            .success()
            .stdout(predicate::str::contains("Bruno Lima"))
            .stdout(predicate::str::contains("Location: /pt-br/clients\n"));

        let sent = backend.last("/tenant/api/v1/Client").unwrap();
        assert_eq!(sent.query.get("src"), None);
        assert_eq!(sent.query.get("PageNumber").map(String::as_str), Some("1"));
        assert_eq!(sent.query.get("PageSize").map(String::as_str), Some("10"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_google_login_prints_url_with_invite() {
        let (base, _backend) = spawn_backend().await;
        let dir = TempDir::new().unwrap();

        let mut google = adminhub(&dir);
        google.args(["--api-url", base.as_str(), "google-login", "--invite-code", "ABC"]);
        run(google)
            .await
            .success()
            .stdout(predicate::str::contains("state=ABC"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_health_reports_reachable_backend() {
        let (base, _backend) = spawn_backend().await;
        let dir = TempDir::new().unwrap();

        let mut health = adminhub(&dir);
        health.args(["--api-url", base.as_str(), "health"]);
        run(health)
            .await
            .success()
            .stdout(predicate::str::contains("is up"));
    }

    #[test]
    fn test_health_fails_when_backend_is_down() {
        let dir = TempDir::new().unwrap();
        adminhub(&dir)
            .args(["--api-url", "http://127.0.0.1:9", "health"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Backend unreachable"));
    }
}
