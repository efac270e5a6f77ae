use crate::models::AiQueryItem;
use std::collections::VecDeque;

pub const AI_HISTORY_CAPACITY: usize = 20;

/// Bounded, newest-first log of AI request/response pairs. Entries are never
/// mutated after creation; appending beyond capacity evicts the oldest.
#[derive(Debug)]
pub struct AiSessionLog {
    entries: VecDeque<AiQueryItem>,
    capacity: usize,
}

impl Default for AiSessionLog {
    fn default() -> Self {
        Self::with_capacity(AI_HISTORY_CAPACITY)
    }
}

impl AiSessionLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Restores a persisted log, truncating oversized documents.
    pub fn from_records(items: Vec<AiQueryItem>) -> Self {
        let mut entries: VecDeque<AiQueryItem> = items.into();
        entries.truncate(AI_HISTORY_CAPACITY);
        Self {
            entries,
            capacity: AI_HISTORY_CAPACITY,
        }
    }

    /// Prepends `item`; returns the evicted entry once the log is full.
    pub fn append(&mut self, item: AiQueryItem) -> Option<AiQueryItem> {
        self.entries.push_front(item);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest-first snapshot, the persisted and displayed order.
    pub fn records(&self) -> Vec<AiQueryItem> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{AiSessionLog, AI_HISTORY_CAPACITY};
    use crate::models::AiQueryItem;

    fn item(id: usize) -> AiQueryItem {
        AiQueryItem {
            id: format!("item-{id}"),
            query: format!("query {id}"),
            response: format!("response {id}"),
            timestamp: id as i64,
        }
    }

    #[test]
    fn append_keeps_newest_first() {
        let mut log = AiSessionLog::default();
        log.append(item(1));
        log.append(item(2));
        let records = log.records();
        assert_eq!(records[0].id, "item-2");
        assert_eq!(records[1].id, "item-1");
    }

    #[test]
    fn append_never_exceeds_capacity() {
        let mut log = AiSessionLog::default();
        for id in 0..AI_HISTORY_CAPACITY {
            assert!(log.append(item(id)).is_none());
        }
        assert_eq!(log.len(), AI_HISTORY_CAPACITY);

        let evicted = log.append(item(AI_HISTORY_CAPACITY));
        assert_eq!(log.len(), AI_HISTORY_CAPACITY);
        assert_eq!(evicted.expect("evicted").id, "item-0");
    }

    #[test]
    fn twenty_first_append_shifts_the_tail() {
        let mut log = AiSessionLog::default();
        for id in 1..=20 {
            log.append(item(id));
        }
        let previous = log.records();

        log.append(item(21));
        let records = log.records();
        assert_eq!(records.len(), 20);
        assert_eq!(records[0].id, "item-21");
        // previous 19th entry becomes the new last; the old 20th is gone
        assert_eq!(records[19].id, previous[18].id);
        assert!(!records.iter().any(|entry| entry.id == previous[19].id));
    }

    #[test]
    fn oversized_stored_documents_are_truncated_on_load() {
        let items: Vec<_> = (0..30).map(item).collect();
        let log = AiSessionLog::from_records(items);
        assert_eq!(log.len(), AI_HISTORY_CAPACITY);
        assert_eq!(log.records()[0].id, "item-0");
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = AiSessionLog::default();
        log.append(item(1));
        log.clear();
        assert!(log.is_empty());
    }
}
