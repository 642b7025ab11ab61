//! Change reporting
//!
//! Update operations return a map of parameter name to new value containing
//! only what actually changed. An empty map means nothing was written.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Parameter name to new value
pub type Changes = BTreeMap<String, Value>;

/// Returns the entries of `proposed` whose value differs from `existing`
///
/// Keys missing from `existing` count as changed.
pub fn diff<K, V>(existing: &BTreeMap<K, V>, proposed: &BTreeMap<K, V>) -> BTreeMap<K, V>
where
    K: Ord + Clone,
    V: PartialEq + Clone,
{
    proposed
        .iter()
        .filter(|(key, value)| existing.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Accumulates the change map for one operation
#[derive(Debug, Default)]
pub struct ChangeTracker {
    changes: Changes,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `proposed` under `parameter` if it differs from `existing`
    ///
    /// Returns true when a change was recorded.
    pub fn track<T>(&mut self, parameter: &str, existing: Option<&T>, proposed: &T) -> bool
    where
        T: PartialEq + Serialize,
    {
        if existing == Some(proposed) {
            return false;
        }
        self.record(parameter, proposed)
    }

    /// Records `value` under `parameter` unconditionally
    ///
    /// A value that cannot be represented as JSON is logged and left out of
    /// the change map.
    pub fn record<T: Serialize>(&mut self, parameter: &str, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.changes.insert(parameter.to_string(), json);
                true
            }
            Err(error) => {
                warn!(parameter, error = %error, "Dropping change that failed to serialize");
                false
            }
        }
    }

    /// Merges a pre-computed diff keyed by parameter name
    pub fn extend<T: Serialize>(&mut self, entries: BTreeMap<String, T>) {
        for (parameter, value) in entries {
            self.record(&parameter, &value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn into_changes(self) -> Changes {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not representable"))
        }
    }

    #[test]
    fn test_diff_keeps_only_changed_entries() {
        let existing = BTreeMap::from([("a", 1), ("b", 2)]);
        let proposed = BTreeMap::from([("a", 1), ("b", 3), ("c", 4)]);

        let changed = diff(&existing, &proposed);

        assert_eq!(changed, BTreeMap::from([("b", 3), ("c", 4)]));
    }

    #[test]
    fn test_track_skips_equal_values() {
        let mut tracker = ChangeTracker::new();
        assert!(!tracker.track("accountingRule", Some(&2), &2));
        assert!(tracker.is_empty());

        assert!(tracker.track("accountingRule", Some(&2), &3));
        assert!(tracker.track("isDormancyTrackingActive", None, &true));

        let changes = tracker.into_changes();
        assert_eq!(changes.get("accountingRule"), Some(&json!(3)));
        assert_eq!(changes.get("isDormancyTrackingActive"), Some(&json!(true)));
    }

    #[test]
    fn test_record_reports_unserializable_value() {
        let mut tracker = ChangeTracker::new();
        assert!(!tracker.record("fundSourceAccountId", &Unserializable));
        assert!(tracker.record("accountingRule", &2));

        let changes = tracker.into_changes();
        assert!(!changes.contains_key("fundSourceAccountId"));
        assert_eq!(changes.len(), 1);
    }
}
