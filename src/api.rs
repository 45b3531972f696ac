use crate::domain::models::{
    Credentials, DashboardSummary, RegisterResponse, RiskSummary, ScanRecord, ScanResult,
    SystemConfig, TokenResponse, Violation,
};
use crate::services::session::Session;
use crate::services::settings::Settings;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("backend returned status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("cannot attach {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ApiError {
    /// Human-readable reason supplied by the backend, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    File(PathBuf),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    pub name: &'static str,
    pub value: PartValue,
}

/// Multipart body for `POST /scan`, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPayload {
    pub parts: Vec<PayloadPart>,
}

impl ScanPayload {
    pub fn file(mut self, name: &'static str, path: PathBuf) -> Self {
        self.parts.push(PayloadPart {
            name,
            value: PartValue::File(path),
        });
        self
    }

    pub fn text(mut self, name: &'static str, value: String) -> Self {
        self.parts.push(PayloadPart {
            name,
            value: PartValue::Text(value),
        });
        self
    }

    #[cfg(test)]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.parts.iter().map(|p| p.name).collect()
    }

    fn into_form(self) -> Result<reqwest::blocking::multipart::Form, ApiError> {
        let mut form = reqwest::blocking::multipart::Form::new();
        for part in self.parts {
            form = match part.value {
                PartValue::Text(v) => form.text(part.name, v),
                PartValue::File(path) => form
                    .file(part.name, &path)
                    .map_err(|source| ApiError::Attachment { path, source })?,
            };
        }
        Ok(form)
    }
}

/// Authenticated backend surface used by every protected view.
pub trait ConsoleApi: Send + Sync {
    fn dashboard(&self, scan_id: Option<i64>) -> Result<DashboardSummary, ApiError>;
    fn violations(&self, limit: u32) -> Result<Vec<Violation>, ApiError>;
    fn resolve_violation(&self, id: i64) -> Result<(), ApiError>;
    fn history(&self) -> Result<Vec<ScanRecord>, ApiError>;
    fn risk(&self) -> Result<RiskSummary, ApiError>;
    fn submit_scan(&self, payload: ScanPayload) -> Result<ScanResult, ApiError>;
    fn system_config(&self) -> Result<SystemConfig, ApiError>;
    fn update_system_config(&self, update: &SystemConfig) -> Result<SystemConfig, ApiError>;
    fn report(&self, scan_id: Option<i64>) -> Result<Vec<u8>, ApiError>;
}

fn build_client(settings: &Settings) -> Result<reqwest::blocking::Client, ApiError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(settings.timeout_ms))
        .build()?)
}

fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(|d| d.to_string())
}

fn check_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        detail: extract_detail(&body),
    })
}

fn decode<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> Result<T, ApiError> {
    let body = resp.text()?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

pub struct HttpApi {
    base: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl HttpApi {
    /// Only a live session can produce an authenticated client.
    pub fn new(settings: &Settings, session: &Session) -> Result<Self, ApiError> {
        Ok(Self {
            base: settings.api_url.clone(),
            token: session.token().to_string(),
            client: build_client(settings)?,
        })
    }

    fn send(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        check_status(req.bearer_auth(&self.token).send()?)
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base, path)
    }
}

impl ConsoleApi for HttpApi {
    fn dashboard(&self, scan_id: Option<i64>) -> Result<DashboardSummary, ApiError> {
        let mut req = self.client.get(self.url("dashboard"));
        if let Some(id) = scan_id {
            req = req.query(&[("scan_id", id)]);
        }
        decode(self.send(req)?)
    }

    fn violations(&self, limit: u32) -> Result<Vec<Violation>, ApiError> {
        let req = self
            .client
            .get(self.url("dashboard/violations"))
            .query(&[("limit", limit)]);
        decode(self.send(req)?)
    }

    fn resolve_violation(&self, id: i64) -> Result<(), ApiError> {
        let req = self.client.put(self.url(&format!("dashboard/resolve/{id}")));
        self.send(req)?;
        Ok(())
    }

    fn history(&self) -> Result<Vec<ScanRecord>, ApiError> {
        decode(self.send(self.client.get(self.url("history")))?)
    }

    fn risk(&self) -> Result<RiskSummary, ApiError> {
        decode(self.send(self.client.get(self.url("risk")))?)
    }

    fn submit_scan(&self, payload: ScanPayload) -> Result<ScanResult, ApiError> {
        let form = payload.into_form()?;
        let req = self.client.post(self.url("scan")).multipart(form);
        decode(self.send(req)?)
    }

    fn system_config(&self) -> Result<SystemConfig, ApiError> {
        decode(self.send(self.client.get(self.url("system")))?)
    }

    fn update_system_config(&self, update: &SystemConfig) -> Result<SystemConfig, ApiError> {
        let req = self.client.patch(self.url("system")).json(update);
        decode(self.send(req)?)
    }

    fn report(&self, scan_id: Option<i64>) -> Result<Vec<u8>, ApiError> {
        let mut req = self.client.post(self.url("reports"));
        if let Some(id) = scan_id {
            req = req.query(&[("scan_id", id)]);
        }
        Ok(self.send(req)?.bytes()?.to_vec())
    }
}

/// Unauthenticated account endpoints.
pub struct AuthClient {
    base: String,
    client: reqwest::blocking::Client,
}

impl AuthClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        Ok(Self {
            base: settings.api_url.clone(),
            client: build_client(settings)?,
        })
    }

    pub fn register(&self, creds: &Credentials) -> Result<RegisterResponse, ApiError> {
        let resp = self
            .client
            .post(endpoint(&self.base, "auth/register"))
            .json(creds)
            .send()?;
        decode(check_status(resp)?)
    }

    pub fn login(&self, creds: &Credentials) -> Result<TokenResponse, ApiError> {
        let resp = self
            .client
            .post(endpoint(&self.base, "auth/login"))
            .json(creds)
            .send()?;
        decode(check_status(resp)?)
    }
}
