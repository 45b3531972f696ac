use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct RedirectOut {
    pub ok: bool,
    pub redirect: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub email: String,
}

/// Backend record ids are integers today, but the console treats them as opaque.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(v) => write!(f, "{v}"),
            RecordId::Text(v) => f.write_str(v),
        }
    }
}

fn default_status() -> String {
    "open".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Violation {
    pub id: i64,
    pub table_name: String,
    pub record_id: RecordId,
    #[serde(default)]
    pub severity: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, alias = "explanation")]
    pub message: String,
    #[serde(default)]
    pub remediation: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Violation {
    pub fn is_open(&self) -> bool {
        self.status.eq_ignore_ascii_case("open")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScanResult {
    pub status: String,
    pub scan_id: i64,
    pub total_rules: i64,
    pub violations_found: i64,
    pub scan_mode: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScanRecord {
    pub id: i64,
    pub scanned_at: String,
    pub status: String,
    #[serde(default)]
    pub total_violations: Option<i64>,
    #[serde(default)]
    pub total_risk_score: Option<i64>,
    #[serde(default)]
    pub scan_mode: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub total_rules: Option<i64>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TopTable {
    pub table_name: String,
    pub total_risk: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DashboardSummary {
    #[serde(alias = "total_rules")]
    pub total_rules_triggered: i64,
    pub total_violations: i64,
    pub total_risk_score: i64,
    pub average_risk: f64,
    pub system_status: String,
    #[serde(default)]
    pub top_risky_table: Option<TopTable>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RiskOverview {
    pub total_violations: i64,
    pub total_risk_score: i64,
    pub average_risk: f64,
    pub max_risk: i64,
    pub min_risk: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuleRisk {
    pub rule_id: Option<i64>,
    pub total_risk: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RiskSummary {
    pub overview: RiskOverview,
    #[serde(default)]
    pub distribution: BTreeMap<String, i64>,
    pub high_risk_percentage: f64,
    #[serde(default)]
    pub top_risky_rules: Vec<RuleRisk>,
    pub system_status: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct SystemConfig {
    pub auto_scan_enabled: bool,
    pub scan_interval_minutes: i64,
}

#[derive(Serialize)]
pub struct ViolationListView {
    pub filter: String,
    pub fetched: usize,
    pub empty: bool,
    pub violations: Vec<Violation>,
}

#[derive(Serialize)]
pub struct ResolveReport {
    pub id: i64,
    pub status: String,
    pub detail: Option<String>,
}

#[derive(Serialize)]
pub struct ConfigView {
    pub state: String,
    pub auto_scan_enabled: bool,
    pub scan_interval_minutes: i64,
    pub message: Option<String>,
    pub rejected_draft: Option<SystemConfig>,
}

#[derive(Serialize)]
pub struct SessionStatus {
    pub logged_in: bool,
    pub routes: Vec<RouteEntry>,
}

#[derive(Serialize)]
pub struct RouteEntry {
    pub name: String,
    pub command: String,
}

#[derive(Serialize)]
pub struct ReportOut {
    pub path: String,
    pub bytes: usize,
    pub scan_id: Option<i64>,
}
