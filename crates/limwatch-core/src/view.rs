//! Live view state fed by the pollers and mutated by the command flows.
//!
//! These structs hold exactly what the screens render. Poll results
//! replace state wholesale; command results patch it in place so the
//! operator sees the outcome without waiting for the next poll.

use std::collections::VecDeque;

use crate::model::{BlockedEntry, LimiterConfig, TrafficSample};

/// Rolling window of traffic samples, newest last.
#[derive(Debug, Clone)]
pub struct TrafficSeries {
    samples: VecDeque<TrafficSample>,
    capacity: usize,
}

impl TrafficSeries {
    /// Ten minutes of one-second samples.
    pub const DEFAULT_CAPACITY: usize = 600;

    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, sample: TrafficSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<&TrafficSample> {
        self.samples.back()
    }

    pub fn total_rate(&self) -> u64 {
        self.samples.iter().map(|s| s.rate).sum()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrafficSample> {
        self.samples.iter()
    }

    /// Rates oldest-first, ready for a sparkline.
    pub fn rates(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.rate).collect()
    }
}

impl Default for TrafficSeries {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// The block list as last reported by the limiter, patched in place on
/// confirmed block/unblock commands.
#[derive(Debug, Clone, Default)]
pub struct BlockedList {
    entries: Vec<BlockedEntry>,
}

impl BlockedList {
    /// Replace the whole list with a fresh poll result.
    pub fn replace(&mut self, entries: Vec<BlockedEntry>) {
        self.entries = entries;
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.entries.iter().any(|e| e.ip == ip)
    }

    pub fn entries(&self) -> &[BlockedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a block the limiter has confirmed. The entry is stamped
    /// with the local wall clock; the limiter's own timestamp shows up
    /// on the next blocked-list poll.
    pub fn apply_block(&mut self, ip: &str) -> BlockedEntry {
        let now = chrono::Local::now();
        let entry = BlockedEntry {
            ip: ip.to_owned(),
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Remove a confirmed unblock. Returns the removed entry, or `None`
    /// if a poll already dropped it.
    pub fn apply_unblock(&mut self, ip: &str) -> Option<BlockedEntry> {
        let index = self.entries.iter().position(|e| e.ip == ip)?;
        Some(self.entries.remove(index))
    }
}

/// Limiter configuration with an optional in-progress edit.
///
/// `committed` tracks the limiter's reported config; `draft` is the
/// operator's pending edit. Polls refresh `committed` without touching
/// the draft, and a failed save leaves the draft intact for retry.
#[derive(Debug, Clone, Default)]
pub struct ConfigEditor {
    committed: LimiterConfig,
    draft: Option<LimiterConfig>,
}

impl ConfigEditor {
    pub fn committed(&self) -> &LimiterConfig {
        &self.committed
    }

    pub fn draft(&self) -> Option<&LimiterConfig> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut LimiterConfig> {
        self.draft.as_mut()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Refresh the committed config from a poll. An open draft keeps the
    /// operator's values.
    pub fn set_committed(&mut self, config: LimiterConfig) {
        self.committed = config;
    }

    /// Fork the committed config into a draft. A no-op if an edit is
    /// already open.
    pub fn begin_edit(&mut self) -> &mut LimiterConfig {
        let committed = self.committed.clone();
        self.draft.get_or_insert(committed)
    }

    /// Discard the draft without saving.
    pub fn cancel_edit(&mut self) {
        self.draft = None;
    }

    /// Promote the draft after the limiter has confirmed the save.
    pub fn commit(&mut self) {
        if let Some(draft) = self.draft.take() {
            self.committed = draft;
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn sample(rate: u64) -> TrafficSample {
        TrafficSample {
            timestamp: format!("2025-05-02 00:00:{rate:02}"),
            rate,
        }
    }

    #[test]
    fn series_evicts_oldest_at_capacity() {
        let mut series = TrafficSeries::new(3);
        for rate in 0..5 {
            series.push(sample(rate));
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.rates(), vec![2, 3, 4]);
        assert_eq!(series.latest().map(|s| s.rate), Some(4));
    }

    #[test]
    fn series_total_sums_current_window() {
        let mut series = TrafficSeries::new(2);
        series.push(sample(10));
        series.push(sample(20));
        series.push(sample(30));
        assert_eq!(series.total_rate(), 50);
    }

    #[test]
    fn blocked_list_patches_in_place() {
        let mut list = BlockedList::default();
        list.replace(vec![BlockedEntry {
            ip: "10.0.0.1".into(),
            date: "2025-05-02".into(),
            time: "10:00:00".into(),
        }]);

        let entry = list.apply_block("192.168.1.1");
        assert_eq!(entry.ip, "192.168.1.1");
        assert!(list.contains("192.168.1.1"));
        assert_eq!(list.len(), 2);

        assert!(list.apply_unblock("10.0.0.1").is_some());
        assert!(!list.contains("10.0.0.1"));
        assert!(list.apply_unblock("10.0.0.1").is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn editor_keeps_draft_across_polls() {
        let mut editor = ConfigEditor::default();
        editor.set_committed(LimiterConfig {
            threshold: 100.0,
            ..LimiterConfig::default()
        });

        editor.begin_edit().threshold = 250.0;
        editor.set_committed(LimiterConfig {
            threshold: 120.0,
            ..LimiterConfig::default()
        });

        assert_eq!(editor.draft().map(|d| d.threshold), Some(250.0));
        assert_eq!(editor.committed().threshold, 120.0);
    }

    #[test]
    fn editor_commit_and_cancel() {
        let mut editor = ConfigEditor::default();
        editor.begin_edit().time_window = 42;
        editor.commit();
        assert!(!editor.is_editing());
        assert_eq!(editor.committed().time_window, 42);

        editor.begin_edit().time_window = 7;
        editor.cancel_edit();
        assert_eq!(editor.committed().time_window, 42);
        assert!(!editor.is_editing());
    }
}
