use std::collections::HashMap;

use agentcore_domain::context_state::{ContextLock, ContextState, ContextStatus};
use agentcore_domain::error::{Error, Result};
use chrono::Utc;
use parking_lot::RwLock;

/// In-memory context metadata store, keyed by context id.
#[derive(Default)]
pub struct ContextStore {
    contexts: RwLock<HashMap<String, ContextState>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, context_id: &str, agent_id: &str) -> Result<ContextState> {
        let mut contexts = self.contexts.write();
        if contexts.contains_key(context_id) {
            return Err(Error::AlreadyExists(format!("context:{context_id}")));
        }
        let state = ContextState::new(context_id, agent_id);
        contexts.insert(context_id.to_string(), state.clone());
        Ok(state)
    }

    pub fn get(&self, context_id: &str) -> Result<ContextState> {
        self.contexts
            .read()
            .get(context_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("context:{context_id}")))
    }

    pub fn update<F>(&self, context_id: &str, f: F) -> Result<ContextState>
    where
        F: FnOnce(&mut ContextState),
    {
        let mut contexts = self.contexts.write();
        let state = contexts
            .get_mut(context_id)
            .ok_or_else(|| Error::NotFound(format!("context:{context_id}")))?;
        f(state);
        state.updated_at = Utc::now();
        Ok(state.clone())
    }

    pub fn delete(&self, context_id: &str) -> Result<()> {
        self.contexts
            .write()
            .remove(context_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("context:{context_id}")))
    }

    pub fn list(&self) -> Vec<ContextState> {
        let mut contexts: Vec<_> = self.contexts.read().values().cloned().collect();
        contexts.sort_by_key(|c| c.created_at);
        contexts
    }

    /// Case-insensitive substring match against title, description, and tags.
    pub fn search(&self, query: &str) -> Vec<ContextState> {
        let needle = query.to_lowercase();
        self.contexts
            .read()
            .values()
            .filter(|c| {
                c.title.as_deref().is_some_and(|t| t.to_lowercase().contains(&needle))
                    || c.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || c.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    /// Acquire an advisory lock on a context. Fails if already locked by a
    /// different holder whose lock has not expired.
    pub fn acquire_lock(&self, context_id: &str, holder: &str, ttl_seconds: i64) -> Result<ContextLock> {
        let mut contexts = self.contexts.write();
        let state = contexts
            .get_mut(context_id)
            .ok_or_else(|| Error::NotFound(format!("context:{context_id}")))?;

        let now = Utc::now();
        if let Some(existing) = &state.lock {
            if existing.holder != holder && existing.expires_at > now {
                return Err(Error::Other(format!(
                    "context {context_id} is locked by {}",
                    existing.holder
                )));
            }
        }

        let lock = ContextLock {
            holder: holder.to_string(),
            acquired_at: now,
            expires_at: now + chrono::Duration::seconds(ttl_seconds),
        };
        state.lock = Some(lock.clone());
        state.status = ContextStatus::Locked;
        Ok(lock)
    }

    pub fn release_lock(&self, context_id: &str, holder: &str) -> Result<()> {
        let mut contexts = self.contexts.write();
        let state = contexts
            .get_mut(context_id)
            .ok_or_else(|| Error::NotFound(format!("context:{context_id}")))?;

        match &state.lock {
            Some(lock) if lock.holder == holder => {
                state.lock = None;
                if state.status == ContextStatus::Locked {
                    state.status = ContextStatus::Active;
                }
                Ok(())
            }
            Some(_) => Err(Error::Other(format!("context {context_id} is not locked by {holder}"))),
            None => Ok(()),
        }
    }

    pub fn refresh_lock(&self, context_id: &str, holder: &str, ttl_seconds: i64) -> Result<ContextLock> {
        let mut contexts = self.contexts.write();
        let state = contexts
            .get_mut(context_id)
            .ok_or_else(|| Error::NotFound(format!("context:{context_id}")))?;

        let lock = state
            .lock
            .as_mut()
            .filter(|l| l.holder == holder)
            .ok_or_else(|| Error::Other(format!("context {context_id} is not locked by {holder}")))?;
        lock.expires_at = Utc::now() + chrono::Duration::seconds(ttl_seconds);
        Ok(lock.clone())
    }

    /// Whether a context currently carries an unexpired lock.
    pub fn is_locked(&self, context_id: &str) -> Result<bool> {
        let state = self.get(context_id)?;
        Ok(state
            .lock
            .is_some_and(|l| l.expires_at > Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_round_trips() {
        let store = ContextStore::new();
        store.create("c1", "agent-1").unwrap();
        let state = store.get("c1").unwrap();
        assert_eq!(state.agent_id, "agent-1");
        assert_eq!(state.status, ContextStatus::Active);
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let store = ContextStore::new();
        store.create("c1", "agent-1").unwrap();
        store
            .update("c1", |c| c.title = Some("Quarterly Report".into()))
            .unwrap();
        assert_eq!(store.search("quarterly").len(), 1);
        assert_eq!(store.search("nope").len(), 0);
    }

    #[test]
    fn lock_acquire_blocks_other_holders() {
        let store = ContextStore::new();
        store.create("c1", "agent-1").unwrap();
        store.acquire_lock("c1", "holder-a", 60).unwrap();
        let err = store.acquire_lock("c1", "holder-b", 60).unwrap_err();
        assert!(err.to_string().contains("locked by holder-a"));
    }

    #[test]
    fn lock_release_by_non_holder_errors() {
        let store = ContextStore::new();
        store.create("c1", "agent-1").unwrap();
        store.acquire_lock("c1", "holder-a", 60).unwrap();
        let err = store.release_lock("c1", "holder-b").unwrap_err();
        assert!(err.to_string().contains("not locked by"));
    }

    #[test]
    fn expired_lock_permits_reacquire_by_another_holder() {
        let store = ContextStore::new();
        store.create("c1", "agent-1").unwrap();
        store.acquire_lock("c1", "holder-a", -1).unwrap();
        assert!(!store.is_locked("c1").unwrap());
        store.acquire_lock("c1", "holder-b", 60).unwrap();
        assert!(store.is_locked("c1").unwrap());
    }
}
