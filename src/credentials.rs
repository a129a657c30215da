use crate::error::ServiceResult;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Key the bearer token is persisted under in local storage.
pub const TOKEN_KEY: &str = "jwtToken";

/// Source of the bearer token attached to every authenticated request.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, e.g. from the environment.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone()).filter(|t| !t.is_empty())
    }
}

/// Small persisted key/value store, one JSON object per file.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl TokenStore {
    /// Opens the store; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> ServiceResult<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(io::Error::from)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no local storage yet");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(TokenStore {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    pub fn remove(&self, key: &str) -> ServiceResult<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }

    pub fn store_token(&self, token: &str) -> ServiceResult<()> {
        self.set(TOKEN_KEY, token)?;
        info!("bearer token stored");
        Ok(())
    }

    pub fn clear_token(&self) -> ServiceResult<()> {
        self.remove(TOKEN_KEY)?;
        info!("bearer token cleared");
        Ok(())
    }

    /// Writes a sibling temp file readable only by the owner, then renames it
    /// over the store.
    fn persist(&self, values: &BTreeMap<String, String>) -> ServiceResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(values).map_err(io::Error::from)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        match fs::remove_file(&tmp_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp_path)?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl CredentialProvider for TokenStore {
    fn bearer_token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().join("storage.json")).unwrap();
        assert_eq!(store.bearer_token(), None);
    }

    #[test]
    fn token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = TokenStore::open(&path).unwrap();
        store.store_token("abc.def.ghi").unwrap();
        assert_eq!(store.bearer_token().as_deref(), Some("abc.def.ghi"));

        let reopened = TokenStore::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("abc.def.ghi"));

        reopened.clear_token().unwrap();
        assert_eq!(TokenStore::open(&path).unwrap().bearer_token(), None);
    }

    #[test]
    fn other_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = TokenStore::open(&path).unwrap();
        store.set("theme", "dark").unwrap();
        store.store_token("t").unwrap();
        store.clear_token().unwrap();
        assert_eq!(TokenStore::open(&path).unwrap().get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(TokenStore::open(&path), Err(ServiceError::Storage(_))));
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = TokenStore::open(&path).unwrap();
        store.store_token("secret").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!dir.path().join("storage.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_tightens_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        TokenStore::open(&path).unwrap().store_token("secret").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn storage_json_failures_are_local_errors() {
        let json_error = serde_json::from_str::<BTreeMap<String, String>>("[").unwrap_err();
        let err = ServiceError::from(io::Error::from(json_error));
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(!err.is_server_side());
    }

    #[test]
    fn empty_tokens_count_as_missing() {
        assert_eq!(StaticToken::new("").bearer_token(), None);
        assert_eq!(StaticToken::new("x").bearer_token().as_deref(), Some("x"));
    }
}
