// Settings, site list and report history survive reopening the database file.

mod helpers;

use std::sync::Arc;

use tempfile::TempDir;

use helpers::site_list;
use library_versioning::storage::{
    init_db_pool_with_path, load_settings, load_site_list, run_migrations, save_settings,
    save_site_list, ConsoleSettings,
};
use library_versioning::{
    AccountInfo, BatchReport, ReportStore, SiteResult, SqliteReportStore, VersionPolicy,
};

#[tokio::test]
async fn test_settings_and_history_survive_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("nested").join("console.db");
    let sites = site_list(&[
        "https://contoso.sharepoint.com/sites/a",
        "https://contoso.sharepoint.com/sites/b",
    ]);
    let settings = ConsoleSettings {
        policy: VersionPolicy::new(100, 10),
        tenant_url: Some("https://contoso.sharepoint.com".to_string()),
        account: Some(AccountInfo::new("ops@contoso.com")),
    };

    {
        let pool = init_db_pool_with_path(&db_path)
            .await
            .expect("Failed to open database");
        run_migrations(&pool).await.expect("Failed to run migrations");
        save_settings(&pool, &settings).await.unwrap();
        save_site_list(&pool, &sites).await.unwrap();
        let store = SqliteReportStore::new(Arc::clone(&pool));
        let results = sites
            .iter()
            .map(|s| SiteResult::from_library_outcomes(s.clone(), 2, 0))
            .collect();
        store
            .save_report(&BatchReport::new(settings.policy, results))
            .await
            .unwrap();
        pool.close().await;
    }

    let pool = init_db_pool_with_path(&db_path)
        .await
        .expect("Failed to reopen database");
    run_migrations(&pool).await.expect("migrations are idempotent");

    assert_eq!(load_settings(&pool).await.unwrap(), settings);
    assert_eq!(load_site_list(&pool).await.unwrap(), sites);
    let store = SqliteReportStore::new(pool);
    let history = store.list_reports().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].summary.total_libraries_configured, 4);
}

#[tokio::test]
async fn test_fresh_database_has_defaults() {
    let pool = helpers::create_test_pool().await;

    let settings = load_settings(&pool).await.unwrap();
    assert_eq!(settings.policy, VersionPolicy::default());
    assert_eq!(settings.tenant_url, None);
    assert_eq!(settings.account, None);
    assert!(load_site_list(&pool).await.unwrap().is_empty());
}
