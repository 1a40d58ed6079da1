use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewReport, Report, ReportId};

/// Durable keyed storage of reports.
///
/// Implemented by `PgReportStore` (postgres) and `MemoryReportStore` (demo and tests). Each call
/// is treated as atomic; consistency between concurrent callers is the implementation's concern.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a report and hand it back with its assigned id.
    async fn insert(&self, report: NewReport) -> Result<Report>;

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>>;

    /// Every stored report, oldest first.
    async fn find_all(&self) -> Result<Vec<Report>>;

    async fn exists_by_id(&self, id: ReportId) -> Result<bool>;

    async fn delete_by_id(&self, id: ReportId) -> Result<()>;
}

#[derive(Default)]
struct MemoryState {
    order: Vec<ReportId>,
    reports: HashMap<ReportId, Report>,
}

#[derive(Default)]
pub struct MemoryReportStore {
    state: RwLock<MemoryState>,
    inserts: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record as-is, bypassing the engine. Lets callers plant unreadable payloads.
    #[cfg(test)]
    pub async fn insert_raw(&self, report: Report) {
        let mut state = self.state.write().await;
        if state.reports.insert(report.id, report.clone()).is_none() {
            state.order.push(report.id);
        }
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: NewReport) -> Result<Report> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let report = report.with_id(Uuid::new_v4());
        let mut state = self.state.write().await;
        state.order.push(report.id);
        state.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>> {
        Ok(self.state.read().await.reports.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Report>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.reports.get(id).cloned())
            .collect())
    }

    async fn exists_by_id(&self, id: ReportId) -> Result<bool> {
        Ok(self.state.read().await.reports.contains_key(&id))
    }

    async fn delete_by_id(&self, id: ReportId) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        if state.reports.remove(&id).is_some() {
            state.order.retain(|existing| *existing != id);
        }
        Ok(())
    }
}
