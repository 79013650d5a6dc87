// Durable credential backends
//
// `FileBackend` keeps one file per entry under a session directory;
// `KeyringBackend` keeps one OS keyring entry per key. Both report a
// missing entry as `Ok(None)` and treat removing a missing entry as done.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use keyring::Entry;
use tracing::{debug, warn};

use wakelan_core::{CredentialBackend, StoreError, TOKEN_KEY, USER_KEY};

const KEYRING_SERVICE: &str = "wakelan";

// ── File backend ────────────────────────────────────────────────────

/// Plain-file storage. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file = match key {
            TOKEN_KEY => "auth_token".to_owned(),
            USER_KEY => "user.json".to_owned(),
            other => format!("{other}.txt"),
        };
        self.dir.join(file)
    }
}

impl CredentialBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let tmp = target.with_extension("tmp");

        {
            let mut file = fs::File::create(&tmp)?;
            restrict_permissions(&file)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &target)?;

        debug!(key, path = %target.display(), "credential written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

// ── Keyring backend ─────────────────────────────────────────────────

/// OS keyring storage, one entry per key under `<profile>/<key>`.
#[derive(Debug, Clone)]
pub struct KeyringBackend {
    service: String,
    profile: String,
}

impl KeyringBackend {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            service: KEYRING_SERVICE.to_owned(),
            profile: profile.into(),
        }
    }

    fn account(&self, key: &str) -> String {
        match key {
            TOKEN_KEY => format!("{}/auth-token", self.profile),
            other => format!("{}/{other}", self.profile),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Entry::new(&self.service, &self.account(key))
            .map_err(|e| StoreError::Backend(format!("failed to access keyring: {e}")))
    }
}

impl CredentialBackend for KeyringBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => {
                warn!(error = %e, key, "failed to read keyring entry");
                Err(StoreError::Backend(e.to_string()))
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }
}
