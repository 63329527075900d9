use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::AuthState;
use crate::cache::SessionCache;
use crate::config::Config;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Per-session context: one daemon process serves one user session, so the
/// cache and the auth identity live here rather than in any global.
pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub cache: SessionCache,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            workspace: None,
            db: None,
            cache: SessionCache::new(),
            auth: AuthState::new(),
        }
    }
}

pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn param_i64(req: &Request, key: &str) -> Option<i64> {
    req.params.get(key).and_then(|v| v.as_i64())
}

pub fn param_f64(req: &Request, key: &str) -> Option<f64> {
    req.params.get(key).and_then(|v| v.as_f64())
}

/// Optional text parameter; empty strings collapse to `None`.
pub fn param_text_opt(req: &Request, key: &str) -> Option<String> {
    param_str(req, key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
