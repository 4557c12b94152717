use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authenticated session returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<Value>,
}

impl Session {
    /// Best-effort display name (`prenom nom`, falling back to email).
    pub fn display_name(&self) -> Option<String> {
        let user = self.user.as_ref()?;
        let field = |k: &str| user.get(k).and_then(Value::as_str).unwrap_or("").trim();
        let full = format!("{} {}", field("prenom"), field("nom"));
        let full = full.trim();
        if !full.is_empty() {
            Some(full.to_string())
        } else {
            let email = field("email");
            (!email.is_empty()).then(|| email.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shared holder for the bearer credential.
///
/// Cloning shares the same slot, so the client and the UI observe the same
/// session. When constructed with [`CredentialStore::persistent`] every change
/// is mirrored to a JSON file; that file is the only local state the
/// application keeps.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    slot: Arc<RwLock<Option<Session>>>,
    path: Option<PathBuf>,
}

impl CredentialStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or lazily create) a store backed by `path`. A missing file means
    /// "logged out".
    pub fn persistent(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let session = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                None
            } else {
                Some(serde_json::from_str::<Session>(&data)?)
            }
        } else {
            None
        };
        Ok(Self {
            slot: Arc::new(RwLock::new(session)),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn session(&self) -> Option<Session> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session().map(|s| s.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn store(&self, session: Session) -> Result<(), CredentialError> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            write_private(path, &serde_json::to_vec_pretty(&session)?)?;
        }
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// The file holds a bearer token: owner read/write only on Unix, including
/// when it already existed with wider permissions.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn session() -> Session {
        Session {
            token: "abc".into(),
            user: Some(json!({"nom": "Diallo", "prenom": "Awa", "email": "awa@chantier.test"})),
        }
    }

    #[test]
    fn clones_share_the_slot() {
        let store = CredentialStore::in_memory();
        let other = store.clone();
        store.store(session()).unwrap();
        assert_eq!(other.token().as_deref(), Some("abc"));
        other.clear().unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn persistent_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = CredentialStore::persistent(&path).unwrap();
        assert!(store.session().is_none());
        store.store(session()).unwrap();
        assert!(path.exists());

        let reopened = CredentialStore::persistent(&path).unwrap();
        assert_eq!(reopened.session(), Some(session()));

        reopened.clear().unwrap();
        assert!(!path.exists());
        assert!(CredentialStore::persistent(&path).unwrap().session().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = CredentialStore::persistent(&path).unwrap();
        store.store(session()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            CredentialStore::persistent(&path),
            Err(CredentialError::Json(_))
        ));
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(session().display_name().as_deref(), Some("Awa Diallo"));
        let only_email = Session {
            token: "t".into(),
            user: Some(json!({"email": "x@y.z"})),
        };
        assert_eq!(only_email.display_name().as_deref(), Some("x@y.z"));
        let anonymous = Session {
            token: "t".into(),
            user: None,
        };
        assert_eq!(anonymous.display_name(), None);
    }
}
