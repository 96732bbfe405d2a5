//! Page boundary bookkeeping for cursor navigation.

use crate::gateway::Anchor;

/// Boundary anchors of one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub first: Anchor,
    pub last: Anchor,
}

/// Stack of page boundary anchors for the current filter session.
///
/// Entry `i` holds the boundaries of page `i`; the stack covers pages
/// `0..=current` and is rebuilt from page 0 whenever filters or ordering
/// change. First-time navigation always proceeds one page at a time from the
/// highest page fetched so far, matching the cursor-relative nature of the
/// gateway (no random-access jumps).
#[derive(Debug, Clone, Default)]
pub struct CursorLedger {
    entries: Vec<LedgerEntry>,
}

impl CursorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the entry for page `len()`.
    pub fn push(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Remove the most recent entry, if any.
    pub fn pop(&mut self) -> Option<LedgerEntry> {
        self.entries.pop()
    }

    /// Boundaries of `page_index`, or `None` when that page has not been
    /// fetched in this session.
    pub fn get(&self, page_index: usize) -> Option<&LedgerEntry> {
        self.entries.get(page_index)
    }

    /// Replace the entry for an already-visited page after a re-fetch.
    pub fn set(&mut self, page_index: usize, entry: LedgerEntry) {
        if let Some(slot) = self.entries.get_mut(page_index) {
            *slot = entry;
        }
    }

    /// Drop entries for pages at or beyond `len`.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{CursorLedger, LedgerEntry};
    use crate::gateway::{Anchor, OrderKey};

    fn entry(first: &str, last: &str) -> LedgerEntry {
        LedgerEntry {
            first: Anchor {
                key: OrderKey::Text(first.to_string()),
                id: format!("id-{first}"),
            },
            last: Anchor {
                key: OrderKey::Text(last.to_string()),
                id: format!("id-{last}"),
            },
        }
    }

    #[test]
    fn entries_stack_in_page_order() {
        let mut ledger = CursorLedger::new();
        assert!(ledger.get(0).is_none());

        ledger.push(entry("a", "c"));
        ledger.push(entry("d", "f"));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(0), Some(&entry("a", "c")));
        assert_eq!(ledger.get(1), Some(&entry("d", "f")));
        assert!(ledger.get(2).is_none());
    }

    #[test]
    fn pop_and_truncate_discard_forward_entries() {
        let mut ledger = CursorLedger::new();
        ledger.push(entry("a", "c"));
        ledger.push(entry("d", "f"));
        ledger.push(entry("g", "i"));

        assert_eq!(ledger.pop(), Some(entry("g", "i")));
        ledger.truncate(1);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(0), Some(&entry("a", "c")));
    }

    #[test]
    fn set_replaces_a_visited_page_in_place() {
        let mut ledger = CursorLedger::new();
        ledger.push(entry("a", "c"));
        ledger.set(0, entry("a", "b"));
        assert_eq!(ledger.get(0), Some(&entry("a", "b")));

        // Setting an unvisited page is ignored.
        ledger.set(5, entry("x", "z"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn reset_starts_a_fresh_session() {
        let mut ledger = CursorLedger::new();
        ledger.push(entry("a", "c"));
        ledger.reset();
        assert!(ledger.is_empty());
    }
}
