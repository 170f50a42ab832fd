//! Signed-in state.
//!
//! The session is loaded once at startup and handed to whatever needs it; it
//! is written only by `login` and removed only by `logout`. There is exactly
//! one persistence scope: `session.yaml` in the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Profile;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub signed_in_at: Option<String>,
}

impl Session {
    pub fn new(token: String, profile: Option<Profile>) -> Self {
        Self {
            token: Some(token),
            profile,
            signed_in_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    /// Process-local token override (`LMSQUIZ_TOKEN`); never written back.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(t) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(t);
            self.profile = None;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("session.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::anonymous());
        }
        let content = fs::read_to_string(&self.path)?;
        let session = serde_yaml::from_str(&content)?;
        Ok(session)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(session)?;
        atomic_write(&self.path, &yaml)?;
        tracing::info!(path = %self.path.display(), "session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<bool> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::info!(path = %self.path.display(), "session cleared");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}
