use sqlx::sqlite::SqlitePool;

use crate::auth::{UserLookup, UserRecord};

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "admin" => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub refresh_token: Option<String>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    user_name: String,
    email: Option<String>,
    role: String,
    refresh_token: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            user_name: row.user_name,
            email: row.email,
            role: UserRole::from_str(&row.role),
            refresh_token: row.refresh_token,
        }
    }
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            refresh_token: user.refresh_token,
        }
    }
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a regular user. Returns the user ID.
    pub async fn create(&self, user_name: &str, email: Option<&str>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO users (user_name, email) VALUES (?, ?)")
            .bind(user_name)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Create an admin user. Returns the user ID.
    pub async fn create_admin(&self, user_name: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO users (user_name, role) VALUES (?, 'admin')")
            .bind(user_name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a user by ID. Soft-deleted users are not returned.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, user_name, email, role, refresh_token FROM users WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Get a user by user name. Soft-deleted users are not returned.
    pub async fn get_by_username(&self, user_name: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, user_name, email, role, refresh_token FROM users WHERE user_name = ? AND deleted_at IS NULL",
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Replace the stored refresh token, revoking the previous one.
    pub async fn set_refresh_token(&self, id: i64, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(token)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove the stored refresh token.
    pub async fn clear_refresh_token(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = NULL WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a user as deleted and drop its refresh token.
    pub async fn soft_delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = datetime('now'), refresh_token = NULL WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl UserLookup for UserStore {
    type Error = sqlx::Error;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, sqlx::Error> {
        Ok(self.get_by_id(id).await?.map(UserRecord::from))
    }
}
