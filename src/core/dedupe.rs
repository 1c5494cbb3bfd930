use crate::domain::model::Record;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Debug)]
pub struct DedupeResult {
    pub records: Vec<Record>,
    /// Records dropped because another record with the same Post ID won.
    /// Rows without a Post ID are not counted here.
    pub removed: usize,
}

/// Collapses records sharing a Post ID down to the one with the highest view
/// count. A strictly greater count replaces the kept record, so equal counts
/// keep the first-seen row. Output order is the order each distinct Post ID
/// was first encountered, which keeps reruns over identical input stable.
///
/// Rows without a Post ID cannot participate in the uniqueness guarantee and
/// are dropped. (Existing behavior, pending product confirmation that such
/// rows are really not worth keeping.)
pub fn dedupe(records: Vec<Record>) -> DedupeResult {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, Record> = HashMap::new();
    let mut removed = 0usize;

    for record in records {
        let Some(id) = record.post_id() else { continue };
        match best.entry(id) {
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                removed += 1;
                if record.view_count() > slot.get().view_count() {
                    slot.insert(record);
                }
            }
        }
    }

    let records = order.iter().filter_map(|id| best.remove(id)).collect();
    DedupeResult { records, removed }
}
