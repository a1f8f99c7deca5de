use crate::error::{SyncError, SyncResult};
use std::env;

pub const SERVER_URL_VAR: &str = "AUTHENTIK_SERVER_URL";
pub const API_KEY_VAR: &str = "AUTHENTIK_API_KEY";
pub const USERNAME_ATTRIBUTE_VAR: &str = "AUTHENTIK_USERNAME_ATTRIBUTE";
pub const EMU_SHORTCODE_VAR: &str = "EMU_SHORTCODE";

/// Immutable settings, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub api_key: String,
    /// Dot-delimited path into the user's Authentik attributes. When set,
    /// resolution runs in attribute mode; otherwise the native Authentik
    /// username is used.
    pub username_attribute: Option<String>,
    /// EMU shortcode appended as `_<shortcode>` to native-mode usernames.
    pub emu_shortcode: Option<String>,
}

impl Settings {
    pub fn from_env() -> SyncResult<Self> {
        let server_url = require(SERVER_URL_VAR)?;
        let api_key = require(API_KEY_VAR)?;

        // An attribute variable that is set but empty is a misconfiguration,
        // not a request for native mode.
        let username_attribute = match env::var(USERNAME_ATTRIBUTE_VAR) {
            Ok(value) if value.is_empty() => {
                return Err(SyncError::missing_var(USERNAME_ATTRIBUTE_VAR));
            }
            Ok(value) => Some(value),
            Err(_) => None,
        };

        Ok(Self {
            server_url,
            api_key,
            username_attribute,
            emu_shortcode: env::var(EMU_SHORTCODE_VAR).ok(),
        })
    }

    pub fn attribute_mode(&self) -> bool {
        self.username_attribute.is_some()
    }
}

fn require(key: &str) -> SyncResult<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(SyncError::missing_var(key)),
    }
}
