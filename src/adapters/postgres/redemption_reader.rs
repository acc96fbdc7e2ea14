//! PostgreSQL implementation of RedemptionReader.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::domain::redemption::{Redemption, SearchKeyword};
use crate::ports::{Page, PageRequest, RedemptionReader};

use super::redemption_repository::{RedemptionRow, REDEMPTION_COLUMNS};

/// PostgreSQL implementation of the RedemptionReader port.
pub struct PostgresRedemptionReader {
    pool: PgPool,
}

impl PostgresRedemptionReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_page(rows: Vec<RedemptionRow>, total: i64) -> Result<Page<Redemption>, DomainError> {
    let items = rows
        .into_iter()
        .map(Redemption::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page {
        items,
        total: u64::try_from(total).unwrap_or(0),
    })
}

#[async_trait]
impl RedemptionReader for PostgresRedemptionReader {
    async fn list(&self, page: PageRequest) -> Result<Page<Redemption>, DomainError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM redemptions WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::database("Failed to count redemptions", e))?;

        let sql = format!(
            r#"
            SELECT {} FROM redemptions
            WHERE deleted_at IS NULL
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
            REDEMPTION_COLUMNS
        );
        let rows: Vec<RedemptionRow> = sqlx::query_as(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to list redemptions", e))?;

        into_page(rows, total)
    }

    async fn search(
        &self,
        keyword: &SearchKeyword,
        page: PageRequest,
    ) -> Result<Page<Redemption>, DomainError> {
        // A NULL id never matches, so text keywords fall through to the name test.
        let filter = r#"deleted_at IS NULL AND (id = $1 OR name LIKE $2 ESCAPE '\')"#;
        let pattern = keyword.like_pattern();

        let count_sql = format!("SELECT COUNT(*) FROM redemptions WHERE {}", filter);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(keyword.id())
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to count redemptions", e))?;

        let sql = format!(
            "SELECT {} FROM redemptions WHERE {} ORDER BY id DESC LIMIT $3 OFFSET $4",
            REDEMPTION_COLUMNS, filter
        );
        let rows: Vec<RedemptionRow> = sqlx::query_as(&sql)
            .bind(keyword.id())
            .bind(&pattern)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to search redemptions", e))?;

        into_page(rows, total)
    }
}
