// storage/mod.rs
// Database operations module

pub mod migrations;
pub mod pool;
pub mod reports;
pub mod settings;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, DbPool};
pub use reports::{ReportStore, SqliteReportStore};
pub use settings::{
    load_settings, load_site_list, save_settings, save_site_list, ConsoleSettings,
};
