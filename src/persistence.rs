//! File-backed persistence tier.
//!
//! Non-browser hosts still need the choice to survive restarts, so this tier
//! keeps one small JSON file per storage key under a common state dir:
//!
//!   Unix:    $HOME/.ccc/state/
//!   Windows: %USERPROFILE%\.ccc\state\
//!   Or override with `CCC_HOME`, which becomes `$CCC_HOME/state/`.
//!
//! Writes go through a temp file and an atomic rename so a crash never
//! leaves a half-written choice behind.

use crate::storage::{ConsentStore, StoredValue, WriteAttributes};
use crate::{StoreError, StoreResult};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Where consent state lives on disk:
///   - If env var `CCC_HOME` is set, use `$CCC_HOME/state/`.
///   - Else `$HOME/.ccc/state/` (or `%USERPROFILE%\.ccc\state\`).
#[must_use]
pub fn state_dir() -> PathBuf {
    if let Ok(home) = std::env::var("CCC_HOME") {
        return PathBuf::from(home).join("state");
    }
    let mut base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(".ccc");
    base.push("state");
    base
}

/// Durable tier storing `{ value, expires_at }` as JSON, one file per key.
/// The storage key doubles as the file stem.
pub struct FileTier {
    dir: PathBuf,
}

impl FileTier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Tier rooted at the default state directory.
    pub fn default_location() -> Self {
        Self::new(state_dir())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ConsentStore for FileTier {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };
        let stored: StoredValue =
            serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        if stored.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(stored.value))
    }

    fn save(&self, key: &str, value: &str, attrs: &WriteAttributes) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;

        let stored = StoredValue {
            value: value.to_string(),
            expires_at: attrs.expires_at,
        };
        let body = serde_json::to_string_pretty(&stored)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        let final_path = self.path_for(key);

        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(body.as_bytes())?;
        f.flush()?;

        // best-effort durability where supported
        #[cfg(unix)]
        {
            let _ = f.sync_all();
        }

        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}
