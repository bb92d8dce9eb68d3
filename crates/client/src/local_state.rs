use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_STATE_PATH: &str = "config/cli_state.json";

/// What the CLI keeps between runs.
///
/// `authenticated` and `remembered_identifier` are advisory: the session gate
/// still asks the service before granting access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalState {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remembered_identifier: Option<String>,
    /// Bearer token of the last session, owned by the HTTP client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let parent = Path::new(path).parent();
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    /// After a successful sign-in.
    pub fn signed_in(&mut self, identifier: &str, remember: bool, token: Option<String>) {
        self.authenticated = true;
        self.remembered_identifier = remember.then(|| identifier.to_string());
        self.session_token = token;
    }

    /// After a failed sign-in or a sign-out. The remembered identifier stays.
    pub fn signed_out(&mut self) {
        self.authenticated = false;
        self.session_token = None;
    }
}

pub fn default_state_path() -> &'static str {
    DEFAULT_STATE_PATH
}
