use chrono::{DateTime, Utc};
use leptos::logging::log;
#[cfg(test)]
use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::config::ClientConfig;

/// Persistent string key-value storage (browser `localStorage` in production).
pub trait TokenStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// A `TokenStore` kept in memory. Clones share the same map.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore(Rc<RefCell<HashMap<String, String>>>);

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.0.borrow_mut().remove(key);
    }
}

/// Admin session state. Authenticated exactly when a token is held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    teacher_name: Option<String>,
    stored_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Loads the session persisted in `store`. Presence of the token key is taken as an
    /// authenticated session unless expiry enforcement is turned on.
    pub fn restore(store: &impl TokenStore, config: &ClientConfig, now: DateTime<Utc>) -> Self {
        let Some(token) = store.get(&config.token_storage_key) else {
            return Session::anonymous();
        };
        let session = Session {
            token: Some(token),
            teacher_name: store.get(&config.teacher_name_key()),
            stored_at: store
                .get(&config.stored_at_key())
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|t| t.with_timezone(&Utc)),
        };
        if config.enforce_token_expiry && session.is_expired(config, now) {
            log!("Stored admin token has expired, discarding it");
            let mut session = session;
            session.end(store, config);
            return session;
        }
        session
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn teacher_name(&self) -> Option<&str> {
        self.teacher_name.as_deref()
    }

    /// A token with no recorded storage time counts as expired.
    pub fn is_expired(&self, config: &ClientConfig, now: DateTime<Utc>) -> bool {
        let ttl = i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX);
        match self.stored_at {
            Some(stored_at) => now.signed_duration_since(stored_at).num_seconds() >= ttl,
            None => true,
        }
    }

    /// Records a freshly issued token in memory and in `store`.
    pub fn begin(
        &mut self,
        store: &impl TokenStore,
        config: &ClientConfig,
        token: String,
        teacher_name: Option<String>,
        now: DateTime<Utc>,
    ) {
        store.set(&config.token_storage_key, &token);
        store.set(&config.stored_at_key(), &now.to_rfc3339());
        match &teacher_name {
            Some(name) => store.set(&config.teacher_name_key(), name),
            None => store.remove(&config.teacher_name_key()),
        }
        self.token = Some(token);
        self.teacher_name = teacher_name;
        self.stored_at = Some(now);
    }

    pub fn set_teacher_name(&mut self, store: &impl TokenStore, config: &ClientConfig, name: String) {
        store.set(&config.teacher_name_key(), &name);
        self.teacher_name = Some(name);
    }

    /// Forgets the token everywhere.
    pub fn end(&mut self, store: &impl TokenStore, config: &ClientConfig) {
        store.remove(&config.token_storage_key);
        store.remove(&config.stored_at_key());
        store.remove(&config.teacher_name_key());
        *self = Session::anonymous();
    }
}
