use chrono::{SubsecRound, Utc};

use crate::aggregate;
use crate::codec;
use crate::error::{ReportError, Result};
use crate::models::{DecodedPayload, NewReport, Report, ReportId, ReportKind, ReportView};
use crate::store::ReportStore;

/// Runs raw input through aggregation and encoding into the store, and decodes on the way out.
pub struct ReportService<S> {
    store: S,
}

impl<S: ReportStore> ReportService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Computes a `kind` report from `raw_input` and persists it. Nothing is stored when the
    /// input does not parse.
    pub async fn generate(
        &self,
        kind: ReportKind,
        generated_by: &str,
        raw_input: &str,
    ) -> Result<ReportView> {
        let generated_at = Utc::now().trunc_subsecs(0);
        let payload = aggregate::aggregate(kind, raw_input, generated_at)?;
        let encoded = codec::encode(&payload).map_err(ReportError::Encode)?;

        let report = self
            .store
            .insert(NewReport {
                generated_at,
                kind,
                generated_by: generated_by.to_string(),
                payload: encoded,
            })
            .await
            .map_err(ReportError::store)?;

        tracing::info!("generated {} report {} for {}", kind, report.id, generated_by);
        Ok(view(report))
    }

    pub async fn generate_enrolled_students(
        &self,
        generated_by: &str,
        raw_input: &str,
    ) -> Result<ReportView> {
        self.generate(ReportKind::EnrolledStudents, generated_by, raw_input)
            .await
    }

    pub async fn generate_section_performance(
        &self,
        generated_by: &str,
        raw_input: &str,
    ) -> Result<ReportView> {
        self.generate(ReportKind::SectionPerformance, generated_by, raw_input)
            .await
    }

    pub async fn generate_student_progress(
        &self,
        generated_by: &str,
        raw_input: &str,
    ) -> Result<ReportView> {
        self.generate(ReportKind::StudentProgress, generated_by, raw_input)
            .await
    }

    pub async fn get_by_id(&self, id: ReportId) -> Result<ReportView> {
        self.store
            .find_by_id(id)
            .await
            .map_err(ReportError::store)?
            .map(view)
            .ok_or(ReportError::NotFound(id))
    }

    pub async fn list_all(&self) -> Result<Vec<ReportView>> {
        let reports = self.store.find_all().await.map_err(ReportError::store)?;
        Ok(reports.into_iter().map(view).collect())
    }

    pub async fn delete_by_id(&self, id: ReportId) -> Result<()> {
        if !self.store.exists_by_id(id).await.map_err(ReportError::store)? {
            tracing::debug!("delete skipped, report {} does not exist", id);
            return Err(ReportError::NotFound(id));
        }
        self.store
            .delete_by_id(id)
            .await
            .map_err(ReportError::store)?;
        tracing::info!("deleted report {}", id);
        Ok(())
    }
}

fn view(report: Report) -> ReportView {
    let payload = codec::decode(report.kind, &report.payload);
    if matches!(payload, DecodedPayload::Corrupted(_)) {
        tracing::warn!("report {} has an unreadable payload", report.id);
    }
    ReportView {
        id: report.id,
        generated_at: report.generated_at,
        kind: report.kind,
        generated_by: report.generated_by,
        payload,
    }
}
