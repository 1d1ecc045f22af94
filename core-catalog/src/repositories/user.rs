//! User account repository trait and implementation

use crate::error::Result;
use crate::models::UserAccount;
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// User account repository interface
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find an account by the identity provider's subject id.
    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserAccount>>;

    /// Insert a new account row.
    async fn insert(&self, user: &UserAccount) -> Result<()>;
}

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new SqliteUserRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserAccount>> {
        let user = query_as::<_, UserAccount>("SELECT * FROM users WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn insert(&self, user: &UserAccount) -> Result<()> {
        query(
            r#"
            INSERT INTO users (uid, email, display_name, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.uid)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteUserRepository::new(pool);

        let user = UserAccount {
            uid: "provider-uid-1".to_string(),
            email: "someone@example.com".to_string(),
            display_name: "Someone".to_string(),
            created_at: 1_700_000_000,
        };
        repo.insert(&user).await.unwrap();

        let found = repo.find_by_uid("provider-uid-1").await.unwrap();
        assert_eq!(found, Some(user));

        let missing = repo.find_by_uid("other").await.unwrap();
        assert!(missing.is_none());
    }
}
