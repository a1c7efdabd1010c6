//! Ordered map keyed by row content, used for deduplication
//!
//! DISTINCT needs "have I seen this row before?" answered under the
//! configured comparison flags (collation, numeric promotion), so a plain
//! hash set over structural equality is not enough: `1` and `1.0` may be
//! the same row. Keys compare slot-wise through the literal ordering.

use crate::literal::{self, CompareConfig, Literal};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Map key owning one row's resolved slot contents
#[derive(Debug)]
struct RowKey {
    slots: Vec<Option<Literal>>,
    config: CompareConfig,
}

impl RowKey {
    fn compare(&self, other: &RowKey) -> Ordering {
        // Width first, then slot-wise; rows in one map share a schema
        self.slots
            .len()
            .cmp(&other.slots.len())
            .then_with(|| {
                for (a, b) in self.slots.iter().zip(&other.slots) {
                    let ord = match (a, b) {
                        (None, None) => Ordering::Equal,
                        (None, Some(_)) => Ordering::Less,
                        (Some(_), None) => Ordering::Greater,
                        (Some(x), Some(y)) => literal::compare(x, y, &self.config),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            })
    }
}

impl PartialEq for RowKey {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for RowKey {}

impl PartialOrd for RowKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for RowKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

/// Ordered dedup map over row contents
///
/// Values are insertion sequence numbers (first-occurrence order), which
/// keeps the map usable for ordered result replay as well as membership.
#[derive(Debug)]
pub struct RowSortMap {
    map: BTreeMap<RowKey, usize>,
    config: CompareConfig,
    next_seq: usize,
}

impl RowSortMap {
    /// Empty map comparing under the given flags
    pub fn new(config: CompareConfig) -> Self {
        RowSortMap {
            map: BTreeMap::new(),
            config,
            next_seq: 0,
        }
    }

    /// Record a row's contents; returns `true` when the row was not
    /// previously present
    pub fn insert(&mut self, slots: Vec<Option<Literal>>) -> bool {
        let key = RowKey {
            slots,
            config: self.config,
        };
        if self.map.contains_key(&key) {
            return false;
        }
        self.map.insert(key, self.next_seq);
        self.next_seq += 1;
        true
    }

    /// Number of distinct rows recorded
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no rows have been recorded
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Discard all recorded rows (distinctness is a per-pass property)
    pub fn clear(&mut self) {
        self.map.clear();
        self.next_seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(values: &[i64]) -> Vec<Option<Literal>> {
        values.iter().map(|&v| Some(Literal::integer(v))).collect()
    }

    #[test]
    fn first_insert_true_second_false() {
        let mut map = RowSortMap::new(CompareConfig::default());
        assert!(map.insert(slots(&[1, 2])));
        assert!(!map.insert(slots(&[1, 2])));
        assert!(map.insert(slots(&[3, 4])));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn numeric_promotion_applies_to_keys() {
        let mut map = RowSortMap::new(CompareConfig::default());
        assert!(map.insert(vec![Some(Literal::integer(1))]));
        // 1.0 promotes equal to 1 under the default flags
        assert!(!map.insert(vec![Some(Literal::double(1.0))]));
    }

    #[test]
    fn large_integers_stay_distinct_from_nearby_doubles() {
        let mut map = RowSortMap::new(CompareConfig::default());
        assert!(map.insert(vec![Some(Literal::integer(i64::MAX))]));
        // 2^63 as a double is not 2^63 - 1, despite rounding to the same f64
        assert!(map.insert(vec![Some(Literal::double(9.223372036854775808e18))]));
        assert!(map.insert(vec![Some(Literal::integer(i64::MAX - 1))]));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn case_insensitive_collation() {
        let ci = CompareConfig {
            case_insensitive: true,
            promote_numerics: true,
        };
        let mut map = RowSortMap::new(ci);
        assert!(map.insert(vec![Some(Literal::string("Foo"))]));
        assert!(!map.insert(vec![Some(Literal::string("foo"))]));

        let mut cs = RowSortMap::new(CompareConfig::default());
        assert!(cs.insert(vec![Some(Literal::string("Foo"))]));
        assert!(cs.insert(vec![Some(Literal::string("foo"))]));
    }

    #[test]
    fn unbound_slots_participate() {
        let mut map = RowSortMap::new(CompareConfig::default());
        assert!(map.insert(vec![Some(Literal::integer(1)), None]));
        assert!(!map.insert(vec![Some(Literal::integer(1)), None]));
        assert!(map.insert(vec![None, Some(Literal::integer(1))]));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut map = RowSortMap::new(CompareConfig::default());
        map.insert(slots(&[1]));
        map.clear();
        assert!(map.is_empty());
        assert!(map.insert(slots(&[1])));
    }
}
