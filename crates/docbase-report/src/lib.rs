use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use docbase_types::User;

/// Fixed artifact name; the exporter always writes to this file inside the
/// directory it is given.
pub const REPORT_FILE_NAME: &str = "users_report.csv";

#[derive(Debug, Error)]
pub enum ReportError {
    /// The user table is empty; refuse rather than emit an empty file.
    #[error("no users to export")]
    NoData,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serialize the full user table to `users_report.csv` in `dir`: a header
/// row, then one row per user in listing order. Returns the written path.
pub fn export_users(users: &[User], dir: &Path) -> Result<PathBuf, ReportError> {
    if users.is_empty() {
        return Err(ReportError::NoData);
    }

    let mut out = String::from("ID,FullName,Username,Role\n");
    for user in users {
        // write! to a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{}",
            user.id,
            csv_field(&user.full_name),
            csv_field(&user.username),
            csv_field(&user.role.to_string()),
        );
    }

    let path = dir.join(REPORT_FILE_NAME);
    fs::write(&path, out)?;

    info!("Exported {} users to {}", users.len(), path.display());
    Ok(path)
}

/// Minimal CSV quoting: fields with commas, quotes or newlines are wrapped
/// in double quotes with embedded quotes doubled.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbase_types::Role;

    fn jane() -> User {
        User {
            id: 1,
            full_name: "Jane Doe".into(),
            username: "jane".into(),
            role: Role::Administrator,
        }
    }

    #[test]
    fn empty_table_refuses_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let err = export_users(&[], dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::NoData));
        assert!(!dir.path().join(REPORT_FILE_NAME).exists());
    }

    #[test]
    fn single_user_produces_header_plus_row() {
        let dir = tempfile::tempdir().unwrap();

        let path = export_users(&[jane()], dir.path()).unwrap();
        let body = fs::read_to_string(path).unwrap();
        assert_eq!(body, "ID,FullName,Username,Role\n1,Jane Doe,jane,Administrator\n");
    }

    #[test]
    fn rows_follow_listing_order() {
        let dir = tempfile::tempdir().unwrap();
        let users = vec![
            jane(),
            User {
                id: 2,
                full_name: "John Roe".into(),
                username: "john".into(),
                role: Role::Regular,
            },
        ];

        let path = export_users(&users, dir.path()).unwrap();
        let body = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[1], "1,Jane Doe,jane,Administrator");
        assert_eq!(lines[2], "2,John Roe,john,Regular user");
    }

    #[test]
    fn fields_with_commas_and_quotes_are_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let users = vec![User {
            id: 7,
            full_name: "Doe, Jane \"JD\"".into(),
            username: "jane".into(),
            role: Role::Regular,
        }];

        let path = export_users(&users, dir.path()).unwrap();
        let body = fs::read_to_string(path).unwrap();
        assert!(body.contains("\"Doe, Jane \"\"JD\"\"\""));
    }
}
