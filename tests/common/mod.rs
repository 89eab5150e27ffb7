use std::sync::Arc;

use partnerfolio_core::db;

/// Creates a fresh migrated SQLite database in a scratch directory.
/// The TempDir must stay alive for the duration of the test.
pub fn setup_test_db() -> (tempfile::TempDir, Arc<db::DbPool>) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = tmp_dir
        .path()
        .join("test.db")
        .to_str()
        .expect("Invalid temp path")
        .to_string();

    let pool = db::create_pool(&db_path).expect("Failed to create connection pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    (tmp_dir, pool)
}
