//! In-memory report store.
//!
//! Process-lifetime mapping from report id to report. Reports are inserted
//! once and never mutated; ids are freshly generated UUIDs, so identical-key
//! writes cannot occur. There is no eviction and no persistence; unbounded
//! growth is an accepted limitation of the current scope.

use crate::models::ResearchReport;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct ReportStore {
    inner: Arc<RwLock<HashMap<String, ResearchReport>>>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a completed report, keyed by its `report_id`.
    pub fn insert(&self, report: ResearchReport) {
        let mut reports = self.inner.write().expect("report store lock poisoned");
        reports.insert(report.report_id.clone(), report);
    }

    /// Looks up a report by id. Unknown ids are `None`, never an error.
    pub fn get(&self, report_id: &str) -> Option<ResearchReport> {
        let reports = self.inner.read().expect("report store lock poisoned");
        reports.get(report_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("report store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
