// src/store/mod.rs
//
// File-backed stand-in for the portal's locally persisted state: the session
// marker, per-period yield/payout overrides and the read-notice id list.
// One JSON file per key under a state directory. Reads never fail at the
// call site (corrupt or missing files read as absent); writes return a
// Result for the caller to log.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Signed-in shareholder marker, mirrored from the roster at login time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub shares: f64,
    /// Millis since epoch when the session was written.
    pub timestamp: i64,
}

pub struct LocalStore {
    dir: PathBuf,
}

const SESSION_FILE: &str = "session.json";
const NOTICES_FILE: &str = "read_notices.json";

impl LocalStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating local store directory {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.write_json(SESSION_FILE, session)
    }

    pub fn session(&self) -> Option<Session> {
        self.read_json(SESSION_FILE)
    }

    pub fn clear_session(&self) {
        let _ = fs::remove_file(self.dir.join(SESSION_FILE));
    }

    /// Store a manual override for one period's yield/payout status. The UI
    /// lets an admin pin a value before the sheet catches up.
    pub fn set_period_override(&self, year: i32, month: u32, value: &Value) -> Result<()> {
        self.write_json(&override_file(year, month), value)
    }

    pub fn period_override(&self, year: i32, month: u32) -> Option<Value> {
        self.read_json(&override_file(year, month))
    }

    /// Mark a notice id as read. Idempotent.
    pub fn mark_notice_read(&self, id: &str) -> Result<()> {
        let mut ids = self.read_notice_ids();
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
            self.write_json(NOTICES_FILE, &ids)?;
        }
        Ok(())
    }

    pub fn read_notice_ids(&self) -> Vec<String> {
        self.read_json(NOTICES_FILE).unwrap_or_default()
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let text = serde_json::to_string_pretty(value)?;
        fs::write(&path, text).with_context(|| format!("writing {:?}", path))
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.dir.join(file);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "discarding unreadable state file");
                None
            }
        }
    }
}

fn override_file(year: i32, month: u32) -> String {
    format!("override_{}_{:02}.json", year, month)
}
