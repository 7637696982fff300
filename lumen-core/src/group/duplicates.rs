//! Exact-match grouping by content fingerprint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{present, Fingerprinted};

/// Records sharing one content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup<Id> {
    pub fingerprint: String,
    /// Member ids in input order.
    pub members: Vec<Id>,
}

impl<Id> DuplicateGroup<Id> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition records by exact content fingerprint.
///
/// Only buckets with at least two members are returned, ordered by the
/// position of their first member.
#[instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn group_duplicates<R: Fingerprinted>(records: &[R]) -> Vec<DuplicateGroup<R::Id>> {
    let mut buckets: Vec<(&str, Vec<R::Id>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(hash) = present(record.content_hash()) else {
            skipped += 1;
            continue;
        };
        match index.get(hash) {
            Some(&slot) => buckets[slot].1.push(record.id()),
            None => {
                index.insert(hash, buckets.len());
                buckets.push((hash, vec![record.id()]));
            }
        }
    }

    let groups: Vec<_> = buckets
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(hash, members)| DuplicateGroup {
            fingerprint: hash.to_string(),
            members,
        })
        .collect();

    debug!(groups = groups.len(), skipped, "Grouped exact duplicates");
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::FingerprintRecord;

    fn record(id: u32, hash: &str) -> FingerprintRecord<u32> {
        FingerprintRecord::new(id).with_content_hash(hash)
    }

    #[test]
    fn test_three_of_a_kind_one_singleton() {
        let a = "a".repeat(64);
        let b = "b".repeat(64);
        let records = vec![record(1, &a), record(2, &b), record(3, &a), record(4, &a)];

        let groups = group_duplicates(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].fingerprint, a);
        assert_eq!(groups[0].members, vec![1, 3, 4]);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_groups_ordered_by_first_appearance() {
        let records = vec![
            record(1, "y"),
            record(2, "x"),
            record(3, "x"),
            record(4, "y"),
        ];
        let groups = group_duplicates(&records);
        let order: Vec<_> = groups.iter().map(|g| g.fingerprint.as_str()).collect();
        assert_eq!(order, vec!["y", "x"]);
        assert_eq!(groups[0].members, vec![1, 4]);
        assert_eq!(groups[1].members, vec![2, 3]);
    }

    #[test]
    fn test_missing_and_empty_hashes_are_excluded() {
        let records = vec![
            FingerprintRecord::new(1),
            FingerprintRecord::new(2),
            record(3, ""),
            record(4, ""),
            record(5, "c"),
        ];
        assert!(group_duplicates(&records).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<FingerprintRecord<u32>> = Vec::new();
        assert!(group_duplicates(&records).is_empty());
    }
}
