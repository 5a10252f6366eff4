use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use rusqlite::{ErrorCode, OptionalExtension};
use tracing::info;

use docbase_types::{Role, User, UserSummary};

use crate::error::DbError;
use crate::Database;

/// Turns raw credentials into salted Argon2id records and answers
/// authentication queries. Registration is the only mutation.
pub struct CredentialStore {
    db: Arc<Database>,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new user. Field non-emptiness is the caller's job; the
    /// UNIQUE constraint on `username` is the store's. Returns the assigned
    /// row id.
    pub fn register(
        &self,
        full_name: &str,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<i64, DbError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DbError::PasswordHash(e.to_string()))?
            .to_string();

        let id = self.db.with_conn(|conn| {
            let res = conn.execute(
                "INSERT INTO users (full_name, username, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![full_name, username, password_hash, role.as_tag()],
            );
            match res {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(e) if is_unique_violation(&e) => Err(DbError::DuplicateUsername),
                Err(e) => Err(e.into()),
            }
        })?;

        info!(username, "registered user");
        Ok(id)
    }

    /// Verify a login attempt. Unknown username and wrong password are
    /// indistinguishable: both are `InvalidCredentials`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Role, DbError> {
        let row: Option<(String, String)> = self.db.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT password_hash, role FROM users WHERE username = ?1",
                    [username],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            Ok(row)
        })?;

        let (stored_hash, role_tag) = row.ok_or(DbError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| DbError::PasswordHash(e.to_string()))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(DbError::InvalidCredentials);
        }

        Role::from_tag(&role_tag).ok_or(DbError::RoleParse(role_tag))
    }

    /// `(username, role)` pairs in registration order, read fresh per call.
    pub fn list_users(&self) -> Result<Vec<UserSummary>, DbError> {
        let rows = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT username, role FROM users ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter()
            .map(|(username, tag)| {
                let role = Role::from_tag(&tag).ok_or(DbError::RoleParse(tag))?;
                Ok(UserSummary { username, role })
            })
            .collect()
    }

    /// The full user table in registration order. Feeds the report
    /// exporter; password hashes never leave the store.
    pub fn all_users(&self) -> Result<Vec<User>, DbError> {
        let rows = self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, full_name, username, role FROM users ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter()
            .map(|(id, full_name, username, tag)| {
                let role = Role::from_tag(&tag).ok_or(DbError::RoleParse(tag))?;
                Ok(User {
                    id,
                    full_name,
                    username,
                    role,
                })
            })
            .collect()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        let db = Arc::new(Database::open_in_memory().unwrap());
        CredentialStore::new(db)
    }

    #[test]
    fn register_then_authenticate() {
        let store = store();
        store
            .register("Jane Doe", "jane", "s3cret", Role::Administrator)
            .unwrap();

        let role = store.authenticate("jane", "s3cret").unwrap();
        assert_eq!(role, Role::Administrator);
    }

    #[test]
    fn duplicate_username_rejected_and_table_unchanged() {
        let store = store();
        store
            .register("Jane Doe", "jane", "s3cret", Role::Administrator)
            .unwrap();

        let err = store
            .register("Other Jane", "jane", "other", Role::Regular)
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateUsername));

        // Exactly one row survived; the failed insert wrote nothing.
        let users = store.all_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].full_name, "Jane Doe");
    }

    #[test]
    fn wrong_password_looks_like_unknown_user() {
        let store = store();
        store
            .register("Jane Doe", "jane", "s3cret", Role::Regular)
            .unwrap();

        let wrong_password = store.authenticate("jane", "nope").unwrap_err();
        let unknown_user = store.authenticate("nobody", "nope").unwrap_err();
        assert!(matches!(wrong_password, DbError::InvalidCredentials));
        assert!(matches!(unknown_user, DbError::InvalidCredentials));
    }

    #[test]
    fn listing_follows_registration_order() {
        let store = store();
        store
            .register("Jane Doe", "jane", "pw-one", Role::Administrator)
            .unwrap();
        store
            .register("John Roe", "john", "pw-two", Role::Regular)
            .unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "jane");
        assert_eq!(users[0].role, Role::Administrator);
        assert_eq!(users[1].username, "john");
        assert_eq!(users[1].role, Role::Regular);
    }

    #[test]
    fn ids_increase_with_registration() {
        let store = store();
        let first = store
            .register("Jane Doe", "jane", "pw", Role::Regular)
            .unwrap();
        let second = store
            .register("John Roe", "john", "pw", Role::Regular)
            .unwrap();
        assert!(second > first);
    }

    #[test]
    fn stored_hash_is_not_the_password() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let store = CredentialStore::new(db.clone());
        store
            .register("Jane Doe", "jane", "s3cret", Role::Regular)
            .unwrap();

        let hash: String = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT password_hash FROM users WHERE username = 'jane'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_ne!(hash, "s3cret");
        assert!(hash.starts_with("$argon2"));
    }
}
