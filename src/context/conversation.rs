//! Append-only conversation log with session token accounting and
//! in-conversation text search.
//!
//! The log only ever grows by appends from the send path; it is destroyed
//! by an explicit clear or replaced wholesale by a load. Individual turns
//! are never mutated.

use serde::Serialize;

use super::types::{
    now_timestamp, ConversationTurn, Fragment, FunctionCallRecord, TurnRole, UploadedFile,
};

// ─── Search ─────────────────────────────────────────────────────────────────

/// One match of a conversation search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    /// Index of the turn containing the match.
    pub turn_index: usize,
    /// Byte offset of the match within the turn's joined text.
    pub offset: usize,
}

// ─── ConversationLog ────────────────────────────────────────────────────────

/// The ordered sequence of user/agent turns for this session.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
    /// Running total of tokens reported by the remote API this session.
    session_token_count: u64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn session_token_count(&self) -> u64 {
        self.session_token_count
    }

    /// Add the reported usage of one send to the session counter.
    pub fn add_usage(&mut self, total_tokens: u64) {
        self.session_token_count += total_tokens;
    }

    // ─── Appends ────────────────────────────────────────────────────────

    /// Append the user turn for a send: the staged file fragments in
    /// upload order, then one text fragment.
    pub fn push_user(&mut self, text: &str, staged_files: &[UploadedFile]) -> &ConversationTurn {
        let mut content: Vec<Fragment> = staged_files
            .iter()
            .map(|f| Fragment::InlineFile {
                mime_type: f.mime_type.clone(),
                data: f.data.clone(),
            })
            .collect();
        content.push(Fragment::text(text));

        let attached_file_names = if staged_files.is_empty() {
            None
        } else {
            Some(staged_files.iter().map(|f| f.name.clone()).collect())
        };

        self.turns.push(ConversationTurn {
            role: TurnRole::User,
            timestamp: now_timestamp(),
            content,
            attached_file_names,
            function_calls: None,
        });
        self.turns.last().expect("just pushed")
    }

    /// Append an agent turn.
    pub fn push_agent(
        &mut self,
        content: Vec<Fragment>,
        function_calls: Option<Vec<FunctionCallRecord>>,
    ) -> &ConversationTurn {
        self.turns.push(ConversationTurn {
            role: TurnRole::Agent,
            timestamp: now_timestamp(),
            content,
            attached_file_names: None,
            function_calls,
        });
        self.turns.last().expect("just pushed")
    }

    /// Append a synthetic agent turn describing a failed send. It is an
    /// ordinary turn, not a separate error channel.
    pub fn push_error(&mut self, message: &str) -> &ConversationTurn {
        self.push_agent(
            vec![Fragment::text(format!("An error occurred: {message}"))],
            None,
        )
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────

    /// Destroy the whole sequence.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.session_token_count = 0;
    }

    /// Replace the sequence wholesale (load). Resets the token counter.
    pub fn replace(&mut self, turns: Vec<ConversationTurn>) {
        self.turns = turns;
        self.session_token_count = 0;
    }

    /// Index of the most recent agent turn, if any.
    pub fn last_agent_index(&self) -> Option<usize> {
        self.turns.iter().rposition(|t| t.role == TurnRole::Agent)
    }

    // ─── Search ─────────────────────────────────────────────────────────

    /// Find every occurrence of `query` in the text of all turns,
    /// ASCII-case-insensitively, in turn order. A blank query matches
    /// nothing.
    pub fn search(&self, query: &str) -> Vec<SearchMatch> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_ascii_lowercase();

        let mut matches = Vec::new();
        for (turn_index, turn) in self.turns.iter().enumerate() {
            let haystack = turn.joined_text().to_ascii_lowercase();
            let mut start = 0;
            while let Some(pos) = haystack[start..].find(&needle) {
                let offset = start + pos;
                matches.push(SearchMatch { turn_index, offset });
                start = offset + needle.len();
            }
        }
        matches
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
