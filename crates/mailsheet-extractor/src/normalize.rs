//! Record normalization

use mailsheet_domain::ProjectRecord;

/// Keep only meaningful records, preserving order
///
/// A record whose every field is the sentinel describes a block nothing
/// could be read from and is dropped. Running this on its own output is a
/// no-op.
pub fn normalize(records: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
    records.into_iter().filter(|r| r.is_meaningful()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsheet_domain::{Field, SENTINEL};
    use proptest::prelude::*;

    #[test]
    fn test_all_sentinel_record_is_dropped() {
        let records = vec![ProjectRecord::empty()];
        assert!(normalize(records).is_empty());
    }

    #[test]
    fn test_partial_record_is_kept() {
        let records = vec![
            ProjectRecord::empty(),
            ProjectRecord::empty().with(Field::Headcount, "2名"),
        ];
        let normalized = normalize(records);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].headcount, "2名");
    }

    fn arb_record() -> impl Strategy<Value = ProjectRecord> {
        proptest::collection::vec(prop_oneof![Just(SENTINEL.to_string()), "[a-z]{1,8}"], 7).prop_map(
            |values| {
                let mut record = ProjectRecord::empty();
                for (field, value) in Field::ALL.into_iter().zip(values) {
                    record.set(field, value);
                }
                record
            },
        )
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(records in proptest::collection::vec(arb_record(), 0..10)) {
            let once = normalize(records);
            let twice = normalize(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_kept_iff_meaningful(record in arb_record()) {
            let kept = normalize(vec![record.clone()]);
            prop_assert_eq!(kept.len() == 1, record.values().iter().any(|v| *v != SENTINEL));
        }
    }
}
