//! Token + cached user persistence.
//!
//! Storage is a flat string key/value space (browser `localStorage` in the
//! web front end, a JSON file for the CLI). Writes are last-write-wins.

use crate::models::{LoginResponse, ProfilePatch, UserProfile};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two independent sessions a client can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSlot {
    User,
    Admin,
}

impl SessionSlot {
    pub fn token_key(&self) -> &'static str {
        match self {
            Self::User => "token",
            Self::Admin => "adminToken",
        }
    }

    pub fn user_key(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "adminUser",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn from_login(response: LoginResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }

    /// Merges a profile update into the cached user.
    pub fn apply_patch(&mut self, patch: &ProfilePatch) {
        if let Some(nickname) = &patch.nickname {
            self.user.nickname = nickname.clone();
        }
        if let Some(avatar_url) = &patch.avatar_url {
            self.user.avatar_url = Some(avatar_url.clone());
        }
    }
}

pub trait KeyValueStore {
    type Error: fmt::Display;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Loads a slot. A token without a readable user is treated as corrupt:
    /// the slot is cleared and `None` returned.
    pub fn load(&self, slot: SessionSlot) -> Result<Option<Session>, S::Error> {
        let token = match self.backend.get(slot.token_key())? {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Ok(None),
        };

        let user = self
            .backend
            .get(slot.user_key())?
            .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok());

        match user {
            Some(user) => Ok(Some(Session { token, user })),
            None => {
                tracing::warn!(?slot, "cached session user unreadable, clearing slot");
                self.clear(slot)?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, slot: SessionSlot, session: &Session) -> Result<(), S::Error> {
        // UserProfile always serializes
        let user = serde_json::to_string(&session.user).unwrap_or_default();
        self.backend.set(slot.token_key(), &session.token)?;
        self.backend.set(slot.user_key(), &user)
    }

    pub fn clear(&self, slot: SessionSlot) -> Result<(), S::Error> {
        self.backend.remove(slot.token_key())?;
        self.backend.remove(slot.user_key())
    }

    /// Applies a profile patch to the cached user, if the slot is populated.
    pub fn update_user(
        &self,
        slot: SessionSlot,
        patch: &ProfilePatch,
    ) -> Result<Option<Session>, S::Error> {
        match self.load(slot)? {
            Some(mut session) => {
                session.apply_patch(patch);
                self.save(slot, &session)?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }
}

#[cfg(feature = "http")]
pub use file_store::FileStore;

#[cfg(feature = "http")]
mod file_store {
    use super::KeyValueStore;
    use std::collections::BTreeMap;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    const DEFAULT_FILE_NAME: &str = ".travel_diary_session.json";

    /// JSON object on disk holding the same keys the browser keeps in
    /// `localStorage`.
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// `~/.travel_diary_session.json`
        pub fn default_path() -> io::Result<PathBuf> {
            dirs::home_dir()
                .map(|home| home.join(DEFAULT_FILE_NAME))
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "home directory not found"))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn read_all(&self) -> io::Result<BTreeMap<String, String>> {
            match fs::read_to_string(&self.path) {
                Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
                Ok(raw) => serde_json::from_str(&raw)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
                Err(e) => Err(e),
            }
        }

        fn write_all(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
            if entries.is_empty() {
                return match fs::remove_file(&self.path) {
                    Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                    _ => Ok(()),
                };
            }

            let raw = serde_json::to_string_pretty(entries)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            fs::write(&self.path, raw)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mut perms = fs::metadata(&self.path)?.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&self.path, perms)?;
            }

            Ok(())
        }
    }

    impl KeyValueStore for FileStore {
        type Error = io::Error;

        fn get(&self, key: &str) -> io::Result<Option<String>> {
            Ok(self.read_all()?.remove(key))
        }

        fn set(&self, key: &str, value: &str) -> io::Result<()> {
            let mut entries = self.read_all()?;
            entries.insert(key.to_string(), value.to_string());
            self.write_all(&entries)
        }

        fn remove(&self, key: &str) -> io::Result<()> {
            let mut entries = self.read_all()?;
            if entries.remove(key).is_some() {
                self.write_all(&entries)?;
            }
            Ok(())
        }
    }
}
