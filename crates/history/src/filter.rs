//! Filters for history queries.

use designvault_core::types::Timestamp;

use crate::entry::HistoryEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

/// Filter, sort and limit options for [`crate::HistoryLedger::get_history`].
///
/// The limit applies after sorting.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub since: Option<Timestamp>,
    pub until: Option<Timestamp>,
    pub change_type: Option<String>,
    pub author: Option<String>,
    pub branch: Option<String>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        self.since.is_none_or(|since| entry.timestamp >= since)
            && self.until.is_none_or(|until| entry.timestamp <= until)
            && self
                .change_type
                .as_deref()
                .is_none_or(|t| entry.change_type == t)
            && self.author.as_deref().is_none_or(|a| entry.author == a)
            && self.branch.as_deref().is_none_or(|b| entry.branch == b)
    }

    /// Filter, sort by timestamp (insertion order breaks ties) and limit.
    pub fn apply(&self, entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
        let mut selected: Vec<(usize, &HistoryEntry)> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.matches(e))
            .collect();

        selected.sort_by(|(ia, a), (ib, b)| {
            let ascending = a.timestamp.cmp(&b.timestamp).then(ia.cmp(ib));
            match self.order {
                SortOrder::Asc => ascending,
                SortOrder::Desc => ascending.reverse(),
            }
        });

        let limit = self.limit.unwrap_or(usize::MAX);
        selected
            .into_iter()
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect()
    }
}
