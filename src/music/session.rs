use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Login cookie of the music account. Obtained outside this program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub music_u: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf: Option<String>,
}

impl Session {
    pub fn new(music_u: String, csrf: Option<String>) -> Self {
        Self { music_u, csrf }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to encode session")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write session file: {}", path.display()))
    }

    pub fn is_logged_in(&self) -> bool {
        !self.music_u.trim().is_empty()
    }

    pub fn csrf_token(&self) -> &str {
        self.csrf.as_deref().unwrap_or("")
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        let mut cookie = format!("MUSIC_U={}", self.music_u);
        if let Some(csrf) = &self.csrf {
            cookie.push_str(&format!("; __csrf={}", csrf));
        }
        cookie
    }

    /// Adopt a fresh `MUSIC_U` from a `Set-Cookie` header value.
    /// Returns true if the stored cookie changed.
    pub fn absorb_set_cookie(&mut self, set_cookie: &str) -> bool {
        let Some(pair) = set_cookie.split(';').next() else {
            return false;
        };
        let Some((name, value)) = pair.split_once('=') else {
            return false;
        };
        let value = value.trim();
        match name.trim() {
            "MUSIC_U" if !value.is_empty() && value != self.music_u => {
                self.music_u = value.to_string();
                true
            }
            "__csrf" if !value.is_empty() && Some(value) != self.csrf.as_deref() => {
                self.csrf = Some(value.to_string());
                true
            }
            _ => false,
        }
    }
}
