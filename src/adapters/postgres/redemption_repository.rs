//! PostgreSQL implementation of RedemptionRepository.
//!
//! Also hosts the row mapping and the lock/write-back statements shared with
//! [`super::PgRedemptionTransaction`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::domain::foundation::{
    DomainError, ErrorCode, PlanId, RedemptionId, Timestamp, UserId,
};
use crate::domain::redemption::{
    NewRedemption, Redemption, RedemptionKey, RedemptionStatus, RedemptionUpdate,
};
use crate::ports::RedemptionRepository;

/// Columns selected for every redemption read.
pub(super) const REDEMPTION_COLUMNS: &str = r#"id, "key", status, name, quota, plan_id,
    created_at, expires_at, redeemed_at, used_user_id, deleted_at"#;

/// Database row representation of a redemption.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct RedemptionRow {
    id: i64,
    key: String,
    status: i16,
    name: String,
    quota: i64,
    plan_id: i64,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    redeemed_at: Option<DateTime<Utc>>,
    used_user_id: Option<i64>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<RedemptionRow> for Redemption {
    type Error = DomainError;

    fn try_from(row: RedemptionRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid {} on redemption {}: {}", field, row.id, e),
            )
        };

        let key = RedemptionKey::new(&row.key).map_err(|e| corrupt("key", &e))?;
        let status = RedemptionStatus::from_i16(row.status).map_err(|e| corrupt("status", &e))?;
        let used_user_id = row
            .used_user_id
            .map(UserId::new)
            .transpose()
            .map_err(|e| corrupt("used_user_id", &e))?;

        Ok(Redemption {
            id: RedemptionId::from_i64(row.id),
            key,
            status,
            name: row.name,
            quota: row.quota,
            plan_id: PlanId::from_column(row.plan_id),
            created_at: Timestamp::from_datetime(row.created_at),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            redeemed_at: row.redeemed_at.map(Timestamp::from_datetime),
            used_user_id,
            deleted_at: row.deleted_at.map(Timestamp::from_datetime),
        })
    }
}

/// Plan id as stored: 0 means none.
fn plan_column(plan_id: Option<PlanId>) -> i64 {
    plan_id.map(|id| id.as_i64()).unwrap_or(0)
}

fn not_found(id: RedemptionId) -> DomainError {
    DomainError::new(
        ErrorCode::RedemptionNotFound,
        format!("Redemption {} not found", id),
    )
}

/// Locks the live row for `key` until the surrounding transaction ends.
pub(super) async fn lock_by_key(
    conn: &mut PgConnection,
    key: &RedemptionKey,
) -> Result<Option<Redemption>, DomainError> {
    let sql = format!(
        r#"SELECT {} FROM redemptions WHERE "key" = $1 AND deleted_at IS NULL FOR UPDATE"#,
        REDEMPTION_COLUMNS
    );
    let row: Option<RedemptionRow> = sqlx::query_as(&sql)
        .bind(key.as_str())
        .fetch_optional(conn)
        .await
        .map_err(|e| DomainError::database("Failed to lock redemption", e))?;

    row.map(Redemption::try_from).transpose()
}

/// Locks the live row with `id` until the surrounding transaction ends.
async fn lock_by_id(
    conn: &mut PgConnection,
    id: RedemptionId,
) -> Result<Option<Redemption>, DomainError> {
    let sql = format!(
        "SELECT {} FROM redemptions WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        REDEMPTION_COLUMNS
    );
    let row: Option<RedemptionRow> = sqlx::query_as(&sql)
        .bind(id.as_i64())
        .fetch_optional(conn)
        .await
        .map_err(|e| DomainError::database("Failed to lock redemption", e))?;

    row.map(Redemption::try_from).transpose()
}

/// Writes every mutable field of a live record back.
pub(super) async fn write_back(
    conn: &mut PgConnection,
    redemption: &Redemption,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE redemptions SET
            status = $2,
            name = $3,
            quota = $4,
            plan_id = $5,
            expires_at = $6,
            redeemed_at = $7,
            used_user_id = $8
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(redemption.id.as_i64())
    .bind(redemption.status.as_i16())
    .bind(&redemption.name)
    .bind(redemption.quota)
    .bind(plan_column(redemption.plan_id))
    .bind(redemption.expires_at.map(|t| *t.as_datetime()))
    .bind(redemption.redeemed_at.map(|t| *t.as_datetime()))
    .bind(redemption.used_user_id.map(|u| u.as_i64()))
    .execute(conn)
    .await
    .map_err(|e| DomainError::database("Failed to save redemption", e))?;

    if result.rows_affected() == 0 {
        return Err(not_found(redemption.id));
    }
    Ok(())
}

/// PostgreSQL implementation of the RedemptionRepository port.
pub struct PostgresRedemptionRepository {
    pool: PgPool,
}

impl PostgresRedemptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RedemptionRepository for PostgresRedemptionRepository {
    async fn create(&self, new: &NewRedemption) -> Result<Redemption, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO redemptions ("key", status, name, quota, plan_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            REDEMPTION_COLUMNS
        );
        let row: RedemptionRow = sqlx::query_as(&sql)
            .bind(new.key.as_str())
            .bind(RedemptionStatus::Enabled.as_i16())
            .bind(&new.name)
            .bind(new.quota)
            .bind(plan_column(new.plan_id))
            .bind(Timestamp::now().as_datetime())
            .bind(new.expires_at.map(|t| *t.as_datetime()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.constraint() == Some("redemptions_key_key") {
                        return DomainError::validation("key", "Redemption key already exists");
                    }
                }
                DomainError::database("Failed to create redemption", e)
            })?;

        Redemption::try_from(row)
    }

    async fn find_by_id(&self, id: RedemptionId) -> Result<Option<Redemption>, DomainError> {
        let sql = format!(
            "SELECT {} FROM redemptions WHERE id = $1 AND deleted_at IS NULL",
            REDEMPTION_COLUMNS
        );
        let row: Option<RedemptionRow> = sqlx::query_as(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to find redemption", e))?;

        row.map(Redemption::try_from).transpose()
    }

    async fn update(
        &self,
        id: RedemptionId,
        update: &RedemptionUpdate,
    ) -> Result<Redemption, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        let mut redemption = lock_by_id(&mut *tx, id).await?.ok_or_else(|| not_found(id))?;
        redemption.apply_update(update)?;
        write_back(&mut *tx, &redemption).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(redemption)
    }

    async fn soft_delete(&self, id: RedemptionId) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE redemptions SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to delete redemption", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn delete_invalid(&self, now: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE redemptions SET deleted_at = $1
            WHERE deleted_at IS NULL
              AND (
                status IN ($2, $3)
                OR (status = $4 AND expires_at IS NOT NULL AND expires_at < $1)
              )
            "#,
        )
        .bind(now.as_datetime())
        .bind(RedemptionStatus::Used.as_i16())
        .bind(RedemptionStatus::Disabled.as_i16())
        .bind(RedemptionStatus::Enabled.as_i16())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to delete invalid redemptions", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RedemptionRow {
        RedemptionRow {
            id: 12,
            key: "0123456789abcdef0123456789abcdef".to_string(),
            status: 1,
            name: "launch".to_string(),
            quota: 500,
            plan_id: 0,
            created_at: Utc::now(),
            expires_at: None,
            redeemed_at: None,
            used_user_id: None,
            deleted_at: None,
        }
    }

    #[test]
    fn row_maps_zero_plan_to_wallet() {
        let redemption = Redemption::try_from(row()).unwrap();
        assert_eq!(redemption.id, RedemptionId::from_i64(12));
        assert_eq!(redemption.plan_id, None);
        assert_eq!(redemption.status, RedemptionStatus::Enabled);
    }

    #[test]
    fn row_maps_used_redemption() {
        let mut used = row();
        used.status = 2;
        used.plan_id = 3;
        used.used_user_id = Some(9);
        used.redeemed_at = Some(Utc::now());

        let redemption = Redemption::try_from(used).unwrap();
        assert_eq!(redemption.status, RedemptionStatus::Used);
        assert_eq!(redemption.plan_id, Some(PlanId::new(3).unwrap()));
        assert_eq!(redemption.used_user_id, Some(UserId::new(9).unwrap()));
    }

    #[test]
    fn row_with_unknown_status_is_database_error() {
        let mut bad = row();
        bad.status = 7;
        let err = Redemption::try_from(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn plan_column_uses_zero_for_none() {
        assert_eq!(plan_column(None), 0);
        assert_eq!(plan_column(Some(PlanId::new(5).unwrap())), 5);
    }
}
