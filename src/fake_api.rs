//! In-memory `ConsoleApi` used by component tests. Records every call.

use crate::api::{ApiError, ConsoleApi, ScanPayload};
use crate::domain::models::{
    DashboardSummary, RecordId, RiskOverview, RiskSummary, ScanRecord, ScanResult, SystemConfig,
    Violation,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

fn status(code: u16, detail: Option<&str>) -> ApiError {
    ApiError::Status {
        status: code,
        detail: detail.map(str::to_string),
    }
}

pub fn violation(id: i64, status: &str) -> Violation {
    Violation {
        id,
        table_name: "customers".to_string(),
        record_id: RecordId::Int(id * 10),
        severity: "high".to_string(),
        status: status.to_string(),
        message: format!("rule violated for record {}", id * 10),
        remediation: None,
        created_at: "2026-03-01T10:00:00".to_string(),
    }
}

struct Gate {
    entered: Sender<()>,
    release: Receiver<()>,
}

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    violations: Mutex<Vec<Violation>>,
    failing_resolves: Mutex<HashSet<i64>>,
    gates: Mutex<HashMap<i64, Gate>>,
    fail_fetches: Mutex<bool>,
    scan_outcome: Mutex<Option<Result<ScanResult, (u16, Option<String>)>>>,
    payloads: Mutex<Vec<ScanPayload>>,
    config: Mutex<Option<SystemConfig>>,
    config_failure: Mutex<Option<(u16, Option<String>)>>,
    patches: Mutex<Vec<SystemConfig>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_violations(self, list: Vec<Violation>) -> Self {
        *lock(&self.violations) = list;
        self
    }

    pub fn with_config(self, config: SystemConfig) -> Self {
        *lock(&self.config) = Some(config);
        self
    }

    pub fn with_scan_result(self, result: ScanResult) -> Self {
        *lock(&self.scan_outcome) = Some(Ok(result));
        self
    }

    pub fn with_scan_failure(self, code: u16, detail: Option<&str>) -> Self {
        self.set_scan_failure(code, detail);
        self
    }

    pub fn set_scan_failure(&self, code: u16, detail: Option<&str>) {
        *lock(&self.scan_outcome) = Some(Err((code, detail.map(str::to_string))));
    }

    pub fn fail_resolve(&self, id: i64) {
        lock(&self.failing_resolves).insert(id);
    }

    pub fn fail_fetches(&self, fail: bool) {
        *lock(&self.fail_fetches) = fail;
    }

    pub fn fail_config_save(&self, code: u16, detail: Option<&str>) {
        *lock(&self.config_failure) = Some((code, detail.map(str::to_string)));
    }

    /// Block the next resolve of `id` until the returned sender fires. The
    /// receiver signals once the call has reached the backend.
    pub fn hold_resolve(&self, id: i64) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = channel();
        let (release_tx, release_rx) = channel();
        lock(&self.gates).insert(
            id,
            Gate {
                entered: entered_tx,
                release: release_rx,
            },
        );
        (entered_rx, release_tx)
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn payloads(&self) -> Vec<ScanPayload> {
        lock(&self.payloads).clone()
    }

    pub fn patches(&self) -> Vec<SystemConfig> {
        lock(&self.patches).clone()
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }

    fn fetch_guard(&self) -> Result<(), ApiError> {
        if *lock(&self.fail_fetches) {
            return Err(status(500, Some("database unavailable")));
        }
        Ok(())
    }
}

impl ConsoleApi for FakeApi {
    fn dashboard(&self, scan_id: Option<i64>) -> Result<DashboardSummary, ApiError> {
        self.record(format!("GET /dashboard?scan_id={scan_id:?}"));
        self.fetch_guard()?;
        let list = lock(&self.violations);
        Ok(DashboardSummary {
            total_rules_triggered: 1,
            total_violations: list.len() as i64,
            total_risk_score: list.len() as i64 * 5,
            average_risk: 5.0,
            system_status: "HIGH".to_string(),
            top_risky_table: None,
        })
    }

    fn violations(&self, limit: u32) -> Result<Vec<Violation>, ApiError> {
        self.record(format!("GET /dashboard/violations?limit={limit}"));
        self.fetch_guard()?;
        Ok(lock(&self.violations)
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn resolve_violation(&self, id: i64) -> Result<(), ApiError> {
        self.record(format!("PUT /dashboard/resolve/{id}"));
        let gate = lock(&self.gates).remove(&id);
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.recv();
        }
        if lock(&self.failing_resolves).contains(&id) {
            return Err(status(404, Some("Violation not found")));
        }
        for v in lock(&self.violations).iter_mut() {
            if v.id == id {
                v.status = "resolved".to_string();
            }
        }
        Ok(())
    }

    fn history(&self) -> Result<Vec<ScanRecord>, ApiError> {
        self.record("GET /history".to_string());
        self.fetch_guard()?;
        Ok(Vec::new())
    }

    fn risk(&self) -> Result<RiskSummary, ApiError> {
        self.record("GET /risk".to_string());
        self.fetch_guard()?;
        Ok(RiskSummary {
            overview: RiskOverview {
                total_violations: 0,
                total_risk_score: 0,
                average_risk: 0.0,
                max_risk: 0,
                min_risk: 0,
            },
            distribution: BTreeMap::new(),
            high_risk_percentage: 0.0,
            top_risky_rules: Vec::new(),
            system_status: "LOW".to_string(),
        })
    }

    fn submit_scan(&self, payload: ScanPayload) -> Result<ScanResult, ApiError> {
        self.record("POST /scan".to_string());
        lock(&self.payloads).push(payload);
        match lock(&self.scan_outcome).clone() {
            Some(Ok(result)) => Ok(result),
            Some(Err((code, detail))) => Err(status(code, detail.as_deref())),
            None => Err(status(500, None)),
        }
    }

    fn system_config(&self) -> Result<SystemConfig, ApiError> {
        self.record("GET /system".to_string());
        self.fetch_guard()?;
        lock(&self.config)
            .as_ref()
            .copied()
            .ok_or_else(|| status(500, None))
    }

    fn update_system_config(&self, update: &SystemConfig) -> Result<SystemConfig, ApiError> {
        self.record("PATCH /system".to_string());
        lock(&self.patches).push(*update);
        if let Some((code, detail)) = lock(&self.config_failure).clone() {
            return Err(status(code, detail.as_deref()));
        }
        *lock(&self.config) = Some(*update);
        Ok(*update)
    }

    fn report(&self, scan_id: Option<i64>) -> Result<Vec<u8>, ApiError> {
        self.record(format!("POST /reports?scan_id={scan_id:?}"));
        Ok(b"%PDF-1.4 fake".to_vec())
    }
}
