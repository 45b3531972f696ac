use crate::services::storage::{
    read_session_file, remove_session_file, session_path, write_session_file, SessionFile,
};
use std::path::PathBuf;

/// Proof that a credential token was present when a protected view was entered.
/// The token is never validated here; the backend decides whether it is good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Owner of the persisted token. `begin` and `end` are the only writers.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> anyhow::Result<Self> {
        Ok(Self::at(session_path()?))
    }

    pub fn current(&self) -> Option<Session> {
        match read_session_file(&self.path) {
            Ok(file) => file.map(|f| Session::new(f.token)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable session file ignored");
                None
            }
        }
    }

    pub fn begin(&self, token: &str) -> anyhow::Result<Session> {
        let token = token.trim();
        anyhow::ensure!(!token.is_empty(), "backend returned an empty access token");
        write_session_file(
            &self.path,
            &SessionFile {
                token: token.to_string(),
            },
        )?;
        Ok(Session::new(token))
    }

    /// Returns whether a session existed.
    pub fn end(&self) -> anyhow::Result<bool> {
        remove_session_file(&self.path)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed(Session),
    RedirectToLogin,
}

pub struct SessionGuard<'a> {
    store: &'a SessionStore,
}

impl<'a> SessionGuard<'a> {
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    /// Decide on entry to a protected view. Nothing may be fetched on redirect.
    pub fn enter(&self, view: &str) -> GuardDecision {
        match self.store.current() {
            Some(session) => GuardDecision::Proceed(session),
            None => {
                tracing::info!(view, "no session token, redirecting to login");
                GuardDecision::RedirectToLogin
            }
        }
    }
}
