//! Conversation and search-history persistence.
//!
//! Two fixed keys in the key-value store: the full conversation log as a
//! JSON-encoded turn sequence, and a small most-recent-first ring buffer
//! of search queries. A malformed stored payload propagates as a
//! serialization error — load does not defensively repair.

use crate::context::types::ConversationTurn;

use super::errors::StorageError;
use super::kv::KeyValueStore;

// ─── Constants ──────────────────────────────────────────────────────────────

/// Store key for the conversation log.
pub const CHAT_HISTORY_KEY: &str = "agent_context_chat_history";

/// Store key for the search-query history.
pub const SEARCH_HISTORY_KEY: &str = "agent_context_search_history";

/// Maximum retained search queries.
const SEARCH_HISTORY_LIMIT: usize = 10;

// ─── HistoryStore ───────────────────────────────────────────────────────────

/// Persistence facade over an injected key-value store.
pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    // ─── Conversation ───────────────────────────────────────────────────

    /// Persist the full turn sequence. Saving an empty sequence is a
    /// no-op; returns whether anything was written.
    pub fn save_conversation(
        &mut self,
        turns: &[ConversationTurn],
    ) -> Result<bool, StorageError> {
        if turns.is_empty() {
            return Ok(false);
        }
        let payload = serde_json::to_string(turns)?;
        self.store.set(CHAT_HISTORY_KEY, &payload)?;
        tracing::info!(turns = turns.len(), "conversation saved");
        Ok(true)
    }

    /// Load the stored turn sequence, if one exists.
    pub fn load_conversation(
        &self,
    ) -> Result<Option<Vec<ConversationTurn>>, StorageError> {
        match self.store.get(CHAT_HISTORY_KEY)? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Delete the stored conversation.
    pub fn clear_conversation(&mut self) -> Result<(), StorageError> {
        self.store.remove(CHAT_HISTORY_KEY)
    }

    // ─── Search History ─────────────────────────────────────────────────

    /// Record a search query: deduplicated, most-recent-first, capped.
    /// Returns the updated history.
    pub fn push_search_query(&mut self, query: &str) -> Result<Vec<String>, StorageError> {
        let mut history = self.search_history()?;
        history.retain(|q| q != query);
        history.insert(0, query.to_string());
        history.truncate(SEARCH_HISTORY_LIMIT);

        let payload = serde_json::to_string(&history)?;
        self.store.set(SEARCH_HISTORY_KEY, &payload)?;
        Ok(history)
    }

    /// The stored search history, most recent first.
    pub fn search_history(&self) -> Result<Vec<String>, StorageError> {
        match self.store.get(SEARCH_HISTORY_KEY)? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::conversation::ConversationLog;
    use crate::storage::kv::SqliteStore;

    fn history() -> HistoryStore {
        HistoryStore::new(Box::new(SqliteStore::open(":memory:").unwrap()))
    }

    fn sample_turns() -> Vec<ConversationTurn> {
        let mut log = ConversationLog::new();
        log.push_user("hello", &[]);
        log.push_agent(
            vec![crate::context::types::Fragment::text("hi there")],
            None,
        );
        log.turns().to_vec()
    }

    #[test]
    fn save_empty_conversation_is_a_noop() {
        let mut h = history();
        assert!(!h.save_conversation(&[]).unwrap());
        assert!(h.load_conversation().unwrap().is_none());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let mut h = history();
        let turns = sample_turns();
        assert!(h.save_conversation(&turns).unwrap());

        let loaded = h.load_conversation().unwrap().unwrap();
        assert_eq!(loaded, turns);
    }

    #[test]
    fn save_clear_load_yields_nothing() {
        let mut h = history();
        h.save_conversation(&sample_turns()).unwrap();
        h.clear_conversation().unwrap();
        // No stale data resurrected after a clear.
        assert!(h.load_conversation().unwrap().is_none());
    }

    #[test]
    fn malformed_payload_propagates() {
        let mut store = SqliteStore::open(":memory:").unwrap();
        store.set(CHAT_HISTORY_KEY, "not json").unwrap();

        let h = HistoryStore::new(Box::new(store));
        let err = h.load_conversation().unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }

    #[test]
    fn search_history_dedupes_most_recent_first() {
        let mut h = history();
        h.push_search_query("alpha").unwrap();
        h.push_search_query("beta").unwrap();
        let result = h.push_search_query("alpha").unwrap();

        assert_eq!(result, vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(h.search_history().unwrap(), result);
    }

    #[test]
    fn search_history_capped_at_limit() {
        let mut h = history();
        for i in 0..15 {
            h.push_search_query(&format!("query {i}")).unwrap();
        }
        let result = h.search_history().unwrap();
        assert_eq!(result.len(), SEARCH_HISTORY_LIMIT);
        assert_eq!(result[0], "query 14");
        assert_eq!(result[9], "query 5");
    }

    #[test]
    fn search_history_empty_by_default() {
        let h = history();
        assert!(h.search_history().unwrap().is_empty());
    }
}
