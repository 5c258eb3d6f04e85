//! Content id -> reference index.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::debug;

use localhist_core::{ChangeSet, ContentId, ContentReference};

/// References per content id, each list in scan order.
pub type ReferenceMap = BTreeMap<ContentId, Vec<ContentReference>>;

fn references_in(set: &ChangeSet) -> impl Iterator<Item = ContentReference> + '_ {
    set.changes.iter().filter_map(move |change| {
        change.content_id.map(|content_id| ContentReference {
            content_id,
            path: change.path.clone(),
            timestamp_millis: Some(set.timestamp_millis),
            change_kind: change.kind,
        })
    })
}

/// Index every change that carries a content id.
///
/// Lists keep the order changes were visited in; they are not sorted by
/// time.
pub fn build_reference_map<'a, I>(change_sets: I) -> ReferenceMap
where
    I: IntoIterator<Item = &'a ChangeSet>,
{
    let mut map = ReferenceMap::new();
    let mut sets = 0usize;
    let mut references = 0usize;

    for set in change_sets {
        sets += 1;
        for reference in references_in(set) {
            references += 1;
            map.entry(reference.content_id).or_default().push(reference);
        }
    }

    debug!(sets, references, content_ids = map.len(), "Built reference map");
    map
}

/// References to one content id, most recent first.
pub fn find_references<'a, I>(change_sets: I, content_id: ContentId) -> Vec<ContentReference>
where
    I: IntoIterator<Item = &'a ChangeSet>,
{
    let mut found: Vec<_> = change_sets
        .into_iter()
        .flat_map(references_in)
        .filter(|r| r.content_id == content_id)
        .collect();
    sort_by_recency(&mut found);
    found
}

/// Sort most recent first; undated references count as time zero.
///
/// The sort is stable, so equal timestamps keep scan order.
pub fn sort_by_recency(references: &mut [ContentReference]) {
    references.sort_by_key(|r| Reverse(r.timestamp_millis.unwrap_or(0)));
}
