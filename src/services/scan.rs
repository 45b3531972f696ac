use crate::api::{ConsoleApi, ScanPayload};
use crate::domain::models::ScanResult;
use crate::error::{failure_message, ScanError, ValidationError};
use crate::services::settings::SourceExclusivity;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Raw operator input, before validation.
#[derive(Debug, Clone, Default)]
pub struct ScanForm {
    pub policy_file: Option<PathBuf>,
    pub database_uri: Option<String>,
    pub dataset_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Database(String),
    Dataset(PathBuf),
    /// Only reachable under `SourceExclusivity::Backend`.
    Both { uri: String, file: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub policy_artifact: PathBuf,
    pub source: DataSource,
}

impl ScanRequest {
    pub fn payload(&self) -> ScanPayload {
        let payload = ScanPayload::default().file("policy_file", self.policy_artifact.clone());
        match &self.source {
            DataSource::Database(uri) => payload.text("db_uri", uri.clone()),
            DataSource::Dataset(file) => payload.file("data_file", file.clone()),
            DataSource::Both { uri, file } => payload
                .file("data_file", file.clone())
                .text("db_uri", uri.clone()),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self.source {
            DataSource::Database(_) => "database",
            DataSource::Dataset(_) => "file",
            DataSource::Both { .. } => "database+file",
        }
    }
}

fn chosen_file(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| p.is_file())
}

pub fn validate(form: &ScanForm, exclusivity: SourceExclusivity) -> Result<ScanRequest, ValidationError> {
    let policy = chosen_file(&form.policy_file).ok_or(ValidationError::MissingPolicyArtifact)?;

    let uri = form
        .database_uri
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    let dataset = match form.dataset_file.as_deref() {
        Some(path) if !path.is_file() => {
            return Err(ValidationError::UnreadableDataset(path.to_path_buf()))
        }
        other => other,
    };

    let source = match (uri, dataset) {
        (None, None) => return Err(ValidationError::MissingDataSource),
        (Some(uri), None) => DataSource::Database(uri.to_string()),
        (None, Some(file)) => DataSource::Dataset(file.to_path_buf()),
        (Some(uri), Some(file)) => match exclusivity {
            SourceExclusivity::Reject => return Err(ValidationError::ConflictingDataSources),
            SourceExclusivity::Backend => DataSource::Both {
                uri: uri.to_string(),
                file: file.to_path_buf(),
            },
        },
    };

    Ok(ScanRequest {
        policy_artifact: policy.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Idle,
    Completed(ScanResult),
    Failed(String),
}

struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ScanSubmissionController<'a, A: ConsoleApi + ?Sized> {
    api: &'a A,
    exclusivity: SourceExclusivity,
    submitting: AtomicBool,
    outcome: Mutex<ScanOutcome>,
}

impl<'a, A: ConsoleApi + ?Sized> ScanSubmissionController<'a, A> {
    pub fn new(api: &'a A, exclusivity: SourceExclusivity) -> Self {
        Self {
            api,
            exclusivity,
            submitting: AtomicBool::new(false),
            outcome: Mutex::new(ScanOutcome::Idle),
        }
    }

    fn outcome_slot(&self) -> MutexGuard<'_, ScanOutcome> {
        self.outcome.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn outcome(&self) -> ScanOutcome {
        self.outcome_slot().clone()
    }

    fn acquire(&self) -> Option<SubmittingGuard<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SubmittingGuard(&self.submitting))
    }

    pub fn submit(&self, form: &ScanForm) -> Result<ScanResult, ScanError> {
        let request = validate(form, self.exclusivity)?;
        let _guard = self.acquire().ok_or(ScanError::InFlight)?;

        *self.outcome_slot() = ScanOutcome::Idle;
        tracing::info!(mode = request.mode(), policy = %request.policy_artifact.display(), "submitting scan");

        match self.api.submit_scan(request.payload()) {
            Ok(result) => {
                *self.outcome_slot() = ScanOutcome::Completed(result.clone());
                Ok(result)
            }
            Err(source) => {
                tracing::error!(error = %source, "scan submission failed");
                let message = failure_message(&source, "Scan failed");
                *self.outcome_slot() = ScanOutcome::Failed(message.clone());
                Err(ScanError::Transport { message, source })
            }
        }
    }
}
