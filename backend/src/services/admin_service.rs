use sqlx::SqlitePool;
use uuid::Uuid;

use crate::utils::ApiResult;

/// Read-only view of the administrators set.
///
/// Membership is a single fact per principal: a row in `admins` keyed by
/// the auth service's user UUID. Rows are managed out of band; this
/// service never writes them, and nothing is cached across requests.
#[derive(Clone)]
pub struct AdminService {
    pool: SqlitePool,
}

impl AdminService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn is_admin(&self, principal_id: &Uuid) -> ApiResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM admins WHERE user_id = ?")
            .bind(principal_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }
}
