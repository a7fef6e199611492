use async_trait::async_trait;
use sqlx::{error::ErrorKind, PgPool};
use tracing::{debug, error};

use crate::{
    auth::repo_types::{NewUser, User, UserRow},
    db::violation_kind,
    error::AppError,
};

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. A taken email yields `DuplicateUser`; any other
    /// integrity violation yields `InvalidRole`.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, AppError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_user(row: UserRow) -> Result<User, AppError> {
    User::try_from(row).map_err(|e| {
        error!(error = %e, "corrupt user row");
        AppError::InvalidRole
    })
}

/// Maps an integrity-constraint class from a user insert to its client error.
/// Anything else stays a storage failure.
fn user_constraint_error(kind: ErrorKind) -> Option<AppError> {
    match kind {
        ErrorKind::UniqueViolation => Some(AppError::DuplicateUser),
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation | ErrorKind::ForeignKeyViolation => {
            Some(AppError::InvalidRole)
        }
        _ => None,
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tx = self.db.begin().await?;
        let inserted = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (role, email, password, name, profile_image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            RETURNING user_id, role, email, password, name, profile_image, created_at, updated_at
            "#,
        )
        .bind(user.role.as_str())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.profile_image)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                tx.rollback().await?;
                return Err(match violation_kind(&e).and_then(user_constraint_error) {
                    Some(err) => {
                        debug!(error = %e, "user insert violated a constraint");
                        err
                    }
                    None => AppError::Database(e),
                });
            }
        };
        tx.commit().await?;

        debug!(user_id = row.user_id, role = %row.role, "user created");
        into_user(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, role, email, password, name, profile_image, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, role, email, password, name, profile_image, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_duplicate_user() {
        assert!(matches!(
            user_constraint_error(ErrorKind::UniqueViolation),
            Some(AppError::DuplicateUser)
        ));
    }

    #[test]
    fn other_integrity_violations_are_invalid_role() {
        for kind in [
            ErrorKind::CheckViolation,
            ErrorKind::NotNullViolation,
            ErrorKind::ForeignKeyViolation,
        ] {
            assert!(matches!(user_constraint_error(kind), Some(AppError::InvalidRole)));
        }
    }

    #[test]
    fn unclassified_database_errors_stay_internal() {
        assert!(user_constraint_error(ErrorKind::Other).is_none());
    }
}
