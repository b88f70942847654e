// Process exit codes of whole console invocations.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use library_versioning::cli::Cli;
use library_versioning::commands::execute;

async fn invoke(db_path: &Path, args: &[&str]) -> ExitCode {
    let db = db_path.to_string_lossy().into_owned();
    let argv = ["library_versioning"]
        .into_iter()
        .chain(args.iter().copied())
        .chain(["--db-path", db.as_str()]);
    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    execute(cli).await.expect("command should not error")
}

#[tokio::test]
async fn test_run_with_empty_site_list_exits_before_sign_in() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("console.db");
    let identity = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&identity)
        .await;

    let configured = invoke(
        &db_path,
        &["config", "set", "--tenant-url", "https://contoso.sharepoint.com"],
    )
    .await;
    assert_eq!(configured, ExitCode::SUCCESS);

    let authority = identity.uri();
    let code = invoke(
        &db_path,
        &[
            "run",
            "--client-id",
            "app-1",
            "--authority-host",
            authority.as_str(),
            "--delay-secs",
            "0",
        ],
    )
    .await;

    assert_eq!(code, ExitCode::from(2));
}

#[tokio::test]
async fn test_reports_list_on_fresh_database_succeeds() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let code = invoke(&temp_dir.path().join("console.db"), &["reports", "list"]).await;
    assert_eq!(code, ExitCode::SUCCESS);
}
