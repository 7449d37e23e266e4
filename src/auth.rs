//! Collaborator interfaces for identity resolution and admin authorization.
//!
//! The rest of the crate treats the session mechanism as opaque: handlers
//! hand an `IdentityProvider` a bearer token and get back an [`Identity`]
//! or nothing. The default implementations resolve tokens through the
//! `sessions` table and the admin claim through the `role` column on the
//! profile record.

use crate::database::repositories::{ProfileRepository, SessionRepository};
use crate::database::Database;
use anyhow::Result;
use serde::Serialize;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
}

pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer token to the authenticated identity, if any.
    fn current_user(&self, token: &str) -> Result<Option<Identity>>;
}

pub trait AdminPolicy: Send + Sync {
    fn is_admin(&self, identity: &Identity) -> Result<bool>;
}

/// Token resolution backed by the `sessions` table.
#[derive(Clone)]
pub struct SqliteIdentityProvider {
    database: Database,
}

impl SqliteIdentityProvider {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl IdentityProvider for SqliteIdentityProvider {
    fn current_user(&self, token: &str) -> Result<Option<Identity>> {
        if token.is_empty() {
            return Ok(None);
        }
        self.database.with_repositories(|repos| {
            let Some(user_id) = repos.sessions().user_for_token(token)? else {
                return Ok(None);
            };
            Ok(repos.profiles().get(&user_id)?.map(|profile| Identity {
                id: profile.id,
                email: profile.email,
            }))
        })
    }
}

/// Admin authorization as a role claim on the profile record. Adding an
/// admin is an `UPDATE profiles SET role = 'admin'`, not a redeploy.
#[derive(Clone)]
pub struct RoleAdminPolicy {
    database: Database,
}

impl RoleAdminPolicy {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl AdminPolicy for RoleAdminPolicy {
    fn is_admin(&self, identity: &Identity) -> Result<bool> {
        self.database.with_repositories(|repos| {
            let role = repos.profiles().get(&identity.id)?.map(|p| p.role);
            Ok(role.as_deref() == Some(ROLE_ADMIN))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ProfileRecord, SessionRecord};
    use crate::database::repositories::{ProfileRepository, SessionRepository};
    use rusqlite::Connection;

    fn setup_database() -> Database {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        db
    }

    fn seed_user(db: &Database, id: &str, username: &str, role: &str, token: &str) {
        db.with_repositories(|repos| {
            repos.profiles().create(&ProfileRecord {
                id: id.into(),
                username: username.into(),
                display_name: None,
                bio: None,
                avatar_url: None,
                email: Some(format!("{username}@example.com")),
                role: role.into(),
                created_at: "2024-01-01T00:00:00Z".into(),
                updated_at: None,
            })?;
            repos.sessions().create(&SessionRecord {
                token: token.into(),
                user_id: id.into(),
                created_at: "2024-01-01T00:00:00Z".into(),
            })
        })
        .expect("seed user");
    }

    #[test]
    fn token_resolves_to_identity() {
        let db = setup_database();
        seed_user(&db, "user-1", "alice", ROLE_MEMBER, "token-1");
        let provider = SqliteIdentityProvider::new(db);

        let identity = provider.current_user("token-1").unwrap().unwrap();
        assert_eq!(identity.id, "user-1");
        assert_eq!(identity.email.as_deref(), Some("alice@example.com"));

        assert!(provider.current_user("bogus").unwrap().is_none());
        assert!(provider.current_user("").unwrap().is_none());
    }

    #[test]
    fn role_policy_gates_admins() {
        let db = setup_database();
        seed_user(&db, "user-1", "alice", ROLE_ADMIN, "token-1");
        seed_user(&db, "user-2", "bob", ROLE_MEMBER, "token-2");
        let policy = RoleAdminPolicy::new(db);

        let admin = Identity {
            id: "user-1".into(),
            email: None,
        };
        let member = Identity {
            id: "user-2".into(),
            email: None,
        };
        assert!(policy.is_admin(&admin).unwrap());
        assert!(!policy.is_admin(&member).unwrap());
    }
}
