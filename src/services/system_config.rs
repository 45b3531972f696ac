use crate::api::ConsoleApi;
use crate::domain::constants::{MAX_SCAN_INTERVAL_MINUTES, MIN_SCAN_INTERVAL_MINUTES};
use crate::domain::models::{ConfigView, SystemConfig};
use crate::error::{failure_message, SaveError, ValidationError};
use crate::services::loader::{LoadState, ResourceLoader, Settled};
use std::sync::{Mutex, MutexGuard};

pub const SAVE_SUCCESS_MESSAGE: &str = "Settings updated successfully";
const SAVE_FAILURE_MESSAGE: &str = "Failed to update settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Clean,
    Dirty,
    Saving,
    Saved,
    Failed,
}

impl EditorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorState::Clean => "clean",
            EditorState::Dirty => "dirty",
            EditorState::Saving => "saving",
            EditorState::Saved => "saved",
            EditorState::Failed => "failed",
        }
    }
}

pub fn check_interval(minutes: i64) -> Result<(), ValidationError> {
    if (MIN_SCAN_INTERVAL_MINUTES..=MAX_SCAN_INTERVAL_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::IntervalOutOfRange(minutes))
    }
}

struct Editor {
    state: EditorState,
    persisted: SystemConfig,
    draft: SystemConfig,
    rejected: Option<SystemConfig>,
    message: Option<String>,
}

/// Auto-scan settings form. Edits stay local until `save`.
pub struct ConfigEditor<'a, A: ConsoleApi + ?Sized> {
    api: &'a A,
    loader: ResourceLoader<SystemConfig>,
    editor: Mutex<Option<Editor>>,
}

impl<'a, A: ConsoleApi + ?Sized> ConfigEditor<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            loader: ResourceLoader::new("system settings"),
            editor: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Editor>> {
        self.editor.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn load(&self) -> Settled {
        let settled = self.loader.load(|_| self.api.system_config());
        if let LoadState::Success(config) = self.loader.state() {
            *self.lock() = Some(Editor {
                state: EditorState::Clean,
                persisted: config,
                draft: config,
                rejected: None,
                message: None,
            });
        }
        settled
    }

    #[cfg(test)]
    pub fn load_state(&self) -> LoadState<SystemConfig> {
        self.loader.state()
    }

    pub fn failure_message(&self) -> String {
        self.loader.failure_message()
    }

    pub fn state(&self) -> Option<EditorState> {
        self.lock().as_ref().map(|e| e.state)
    }

    #[cfg(test)]
    pub fn persisted(&self) -> Option<SystemConfig> {
        self.lock().as_ref().map(|e| e.persisted)
    }

    /// Values currently displayed in the form.
    #[cfg(test)]
    pub fn draft(&self) -> Option<SystemConfig> {
        self.lock().as_ref().map(|e| e.draft)
    }

    pub fn edit(
        &self,
        auto_scan_enabled: Option<bool>,
        scan_interval_minutes: Option<i64>,
    ) -> Result<EditorState, SaveError> {
        let mut guard = self.lock();
        let editor = guard.as_mut().ok_or(SaveError::NotLoaded)?;
        if editor.state == EditorState::Saving {
            return Err(SaveError::InFlight);
        }
        if let Some(enabled) = auto_scan_enabled {
            editor.draft.auto_scan_enabled = enabled;
        }
        if let Some(minutes) = scan_interval_minutes {
            editor.draft.scan_interval_minutes = minutes;
        }
        editor.message = None;
        editor.state = if editor.draft == editor.persisted {
            EditorState::Clean
        } else {
            EditorState::Dirty
        };
        Ok(editor.state)
    }

    /// Persist the draft. `Ok(None)` means there was nothing to save.
    pub fn save(&self) -> Result<Option<SystemConfig>, SaveError> {
        let draft = {
            let mut guard = self.lock();
            let editor = guard.as_mut().ok_or(SaveError::NotLoaded)?;
            match editor.state {
                EditorState::Saving => return Err(SaveError::InFlight),
                _ if editor.draft == editor.persisted => return Ok(None),
                _ => {}
            }
            check_interval(editor.draft.scan_interval_minutes)?;
            editor.state = EditorState::Saving;
            editor.message = None;
            editor.draft
        };

        tracing::info!(
            auto_scan_enabled = draft.auto_scan_enabled,
            scan_interval_minutes = draft.scan_interval_minutes,
            "saving system settings"
        );
        let outcome = self.api.update_system_config(&draft);

        let mut guard = self.lock();
        let editor = guard.as_mut().ok_or(SaveError::NotLoaded)?;
        match outcome {
            Ok(echoed) => {
                editor.persisted = echoed;
                editor.draft = echoed;
                editor.rejected = None;
                editor.state = EditorState::Saved;
                editor.message = Some(SAVE_SUCCESS_MESSAGE.to_string());
                Ok(Some(echoed))
            }
            Err(source) => {
                tracing::error!(error = %source, "system settings save failed");
                let message = failure_message(&source, SAVE_FAILURE_MESSAGE);
                editor.draft = editor.persisted;
                editor.rejected = Some(draft);
                editor.state = EditorState::Failed;
                editor.message = Some(message.clone());
                Err(SaveError::Transport { message, source })
            }
        }
    }

    pub fn view(&self) -> Option<ConfigView> {
        self.lock().as_ref().map(|e| ConfigView {
            state: e.state.as_str().to_string(),
            auto_scan_enabled: e.draft.auto_scan_enabled,
            scan_interval_minutes: e.draft.scan_interval_minutes,
            message: e.message.clone(),
            rejected_draft: e.rejected,
        })
    }
}
