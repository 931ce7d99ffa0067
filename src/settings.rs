//! Host settings: which browsers the analysed code must run on.

use crate::browsers::{BrowserTarget, parse_target_list};
use serde::Deserialize;
use std::fmt;

/// `browser` / `browsers` accept either one comma-separated string or a
/// sequence of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BrowserList {
    One(String),
    Many(Vec<String>),
}

impl BrowserList {
    fn entries(&self) -> &[String] {
        match self {
            BrowserList::One(s) => std::slice::from_ref(s),
            BrowserList::Many(v) => v,
        }
    }
}

/// The subset of the host's settings object the analyzer reads. Unknown
/// keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub browser: Option<BrowserList>,
    pub browsers: Option<BrowserList>,
}

#[derive(Debug)]
pub enum SettingsError {
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Json(e) => write!(f, "invalid settings: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Settings, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_browsers<I, S>(entries: I) -> Settings
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Settings {
            browser: None,
            browsers: Some(BrowserList::Many(
                entries.into_iter().map(Into::into).collect(),
            )),
        }
    }

    /// All configured targets in order: `browser` entries, then `browsers`.
    /// Empty means unconditional mode.
    pub fn targets(&self) -> Vec<BrowserTarget> {
        [&self.browser, &self.browsers]
            .into_iter()
            .flatten()
            .flat_map(BrowserList::entries)
            .flat_map(|entry| parse_target_list(entry))
            .collect()
    }
}
