use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::users::repo::UserProfile;

/// Fixed key the session object lives under, same as the browser build.
pub const SESSION_KEY: &str = "auth_user";

/// One serialized profile under a fixed key. Implementations are handed to
/// AuthContext rather than reached through a global.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<UserProfile>>;
    fn save(&self, user: &UserProfile) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// JSON file named after SESSION_KEY inside a caller-chosen directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(format!("{SESSION_KEY}.json"))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> anyhow::Result<Option<UserProfile>> {
        match fs::read_to_string(self.path()) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &UserProfile) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(), serde_json::to_string(user)?)?;
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<UserProfile>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> anyhow::Result<Option<UserProfile>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, user: &UserProfile) -> anyhow::Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        *slot = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn sample() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "naver@example.com".to_string(),
            name: "네이버 회원".to_string(),
            provider: "Naver".to_string(),
            avatar: None,
            vehicle_number: Some("12가1234".to_string()),
            phone_number: Some("010-1234-5678".to_string()),
            status_key: "available".to_string(),
            status_message: None,
            login_time: datetime!(2024-05-01 09:30:00 UTC),
            created_at: datetime!(2024-01-01 00:00:00 UTC),
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        let user = sample();
        store.save(&user).unwrap();
        let loaded = store.load().unwrap().expect("saved session");
        assert_eq!(loaded.email, user.email);
        assert_eq!(loaded.vehicle_number, user.vehicle_number);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("carlink-session-{}", Uuid::new_v4()));
        let store = FileSessionStore::new(&dir);
        assert!(store.load().unwrap().is_none());

        let user = sample();
        store.save(&user).unwrap();
        let loaded = store.load().unwrap().expect("saved session");
        assert_eq!(loaded.email, user.email);
        assert_eq!(loaded.phone_number, user.phone_number);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice stays quiet.
        store.clear().unwrap();

        fs::remove_dir_all(&dir).ok();
    }
}
