// ==========================================
// Test helpers: temporary database files
// ==========================================

use std::error::Error;
use tempfile::NamedTempFile;

/// Create a temporary database with schema and reference data
///
/// # Returns
/// - NamedTempFile: keeps the file alive for the test
/// - String: database path
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("temp path is not UTF-8")?
        .to_string();

    foundry_qc::db::open_and_prepare(&db_path)?;

    Ok((temp_file, db_path))
}
