//! The signed-in user, mirrored into a key-value store so it survives reloads
//! and follows changes made in other tabs.

use anyhow::Context;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::{UserData, UserRole};

pub const USER_STORAGE_KEY: &str = "user";
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// String storage shaped like the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

fn parse_user(raw: Option<&str>) -> anyhow::Result<Option<UserData>> {
    match raw {
        Some(raw) if !raw.is_empty() && raw != "null" => {
            let user = serde_json::from_str(raw).context("stored user is not valid json")?;
            Ok(Some(user))
        }
        _ => Ok(None),
    }
}

#[derive(Clone)]
pub struct UserSession {
    store: Rc<dyn KeyValueStore>,
    user: Option<UserData>,
}

impl PartialEq for UserSession {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store) && self.user == other.user
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl UserSession {
    /// Restores whatever user the store holds. Unreadable entries count as signed out.
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let user = Self::read(store.as_ref());
        Self { store, user }
    }

    fn read(store: &dyn KeyValueStore) -> Option<UserData> {
        parse_user(store.get(USER_STORAGE_KEY).as_deref()).unwrap_or_else(|err| {
            tracing::error!("error reading user from storage: {err:#}");
            None
        })
    }

    pub fn user(&self) -> Option<&UserData> {
        self.user.as_ref()
    }

    pub fn store(&self) -> &Rc<dyn KeyValueStore> {
        &self.store
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// The role checks run against. Signed-out visitors are `NONE`.
    pub fn role(&self) -> UserRole {
        self.user.as_ref().map_or(UserRole::None, |user| user.role)
    }

    pub fn set_user(&mut self, user: Option<UserData>) {
        let written = match &user {
            Some(user) => serde_json::to_string(user)
                .map_err(anyhow::Error::from)
                .and_then(|raw| self.store.set(USER_STORAGE_KEY, &raw)),
            None => {
                self.store.remove(USER_STORAGE_KEY);
                Ok(())
            }
        };
        if let Err(err) = written {
            tracing::error!("error saving user to storage: {err:#}");
        }
        self.user = user;
    }

    pub fn clear_user(&mut self) {
        self.set_user(None);
        self.store.remove(AUTH_TOKEN_KEY);
    }

    pub fn sync_from_store(&mut self) {
        self.user = Self::read(self.store.as_ref());
    }

    /// Applies a storage change made elsewhere. Returns whether the user changed.
    pub fn apply_storage_event(
        &mut self,
        key: Option<&str>,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> bool {
        if key != Some(USER_STORAGE_KEY) || old_value == new_value {
            return false;
        }
        match parse_user(new_value) {
            Ok(user) => {
                let changed = self.user != user;
                self.user = user;
                changed
            }
            Err(err) => {
                tracing::error!("error syncing user from storage event: {err:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserStatus;

    fn player() -> UserData {
        UserData {
            id: "1".into(),
            login: "player".into(),
            email: "player@example.com".into(),
            balance: 250.0,
            role: UserRole::Admin,
            status: UserStatus::Active,
            created_at: None,
        }
    }

    #[test]
    fn user_round_trips_through_the_store() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut session = UserSession::load(store.clone());
        assert!(!session.is_signed_in());
        assert_eq!(session.role(), UserRole::None);

        session.set_user(Some(player()));
        assert!(store.get(USER_STORAGE_KEY).is_some());

        let restored = UserSession::load(store.clone());
        assert_eq!(restored.user(), Some(&player()));
        assert_eq!(restored.role(), UserRole::Admin);

        session.clear_user();
        assert_eq!(store.get(USER_STORAGE_KEY), None);
    }

    #[test]
    fn corrupt_entries_load_as_signed_out() {
        let store = Rc::new(MemoryStore::new());
        store.set(USER_STORAGE_KEY, "{not json").unwrap();
        assert!(!UserSession::load(store).is_signed_in());
    }

    #[test]
    fn storage_events_from_other_tabs_update_the_user() {
        let mut session = UserSession::load(Rc::new(MemoryStore::new()));
        let raw = serde_json::to_string(&player()).unwrap();

        assert!(!session.apply_storage_event(Some("theme"), None, Some("dark")));
        assert!(!session.apply_storage_event(Some(USER_STORAGE_KEY), Some(&raw), Some(&raw)));
        assert!(session.apply_storage_event(Some(USER_STORAGE_KEY), None, Some(&raw)));
        assert_eq!(session.user().map(|user| user.login.as_str()), Some("player"));

        assert!(!session.apply_storage_event(Some(USER_STORAGE_KEY), Some(&raw), Some("{")));
        assert!(session.is_signed_in());

        assert!(session.apply_storage_event(Some(USER_STORAGE_KEY), Some(&raw), None));
        assert!(!session.is_signed_in());
    }

    #[test]
    fn sync_picks_up_external_writes() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut session = UserSession::load(store.clone());
        store
            .set(USER_STORAGE_KEY, &serde_json::to_string(&player()).unwrap())
            .unwrap();
        session.sync_from_store();
        assert!(session.is_signed_in());
    }
}
