use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::models::{NewReport, Report, ReportId};
use crate::store::ReportStore;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const SELECT_ALL: &str = "SELECT id, generated_at, kind, generated_by, payload \
     FROM section_reports.reports ORDER BY seq";

pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn report_from_row(row: &PgRow) -> anyhow::Result<Report> {
    let kind: String = row.try_get("kind")?;
    Ok(Report {
        id: row.try_get("id")?,
        generated_at: row.try_get("generated_at")?,
        kind: kind.parse()?,
        generated_by: row.try_get("generated_by")?,
        payload: row.try_get("payload")?,
    })
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: NewReport) -> anyhow::Result<Report> {
        let row = sqlx::query(
            r#"
            INSERT INTO section_reports.reports (generated_at, kind, generated_by, payload)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(report.generated_at)
        .bind(report.kind.as_str())
        .bind(&report.generated_by)
        .bind(&report.payload)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert report")?;

        let id: ReportId = row.try_get("id")?;
        Ok(report.with_id(id))
    }

    async fn find_by_id(&self, id: ReportId) -> anyhow::Result<Option<Report>> {
        let row = sqlx::query(
            "SELECT id, generated_at, kind, generated_by, payload \
             FROM section_reports.reports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load report {id}"))?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Report>> {
        let rows = sqlx::query(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .context("failed to list reports")?;

        rows.iter().map(report_from_row).collect()
    }

    async fn exists_by_id(&self, id: ReportId) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM section_reports.reports WHERE id = $1) AS present",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to look up report {id}"))?
        .try_get("present")?;

        Ok(exists)
    }

    async fn delete_by_id(&self, id: ReportId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM section_reports.reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete report {id}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_follows_insertion_sequence() {
        assert!(SELECT_ALL.ends_with("ORDER BY seq"));
        assert!(!SELECT_ALL.contains("generated_at, id"));
    }
}
