//! Significance order and escalation of flags.

use std::sync::Arc;

use proptest::prelude::*;
use qc_model::{ColumnEntry, Flag, Record, Schema};

const CHAIN: [Flag; 5] = [
    Flag::NotSet,
    Flag::Good,
    Flag::Questionable,
    Flag::Bad,
    Flag::Fatal,
];

fn chain_position(flag: Flag) -> Option<usize> {
    match flag {
        Flag::AssumedGood => Some(1),
        other => CHAIN.iter().position(|f| *f == other),
    }
}

#[test]
fn more_significant_follows_escalation_chain() {
    for a in Flag::ALL {
        for b in Flag::ALL {
            if let (Some(pa), Some(pb)) = (chain_position(a), chain_position(b)) {
                assert_eq!(a.more_significant_than(b), pa > pb, "{a} vs {b}");
            }
            assert_eq!(
                a.more_significant_than(b),
                a.significance() > b.significance()
            );
        }
    }
}

#[test]
fn sentinels_are_below_the_chain() {
    for flag in CHAIN {
        assert!(flag.more_significant_than(Flag::Needed));
        assert!(flag.more_significant_than(Flag::Ignored));
    }
}

fn single_column_record() -> Record {
    let schema = Schema::from_entries("flags", &[ColumnEntry::new(1, "V", "S", "n")]).unwrap();
    Record::new(Arc::new(schema), 1, vec![Some("x".to_string())]).unwrap()
}

fn any_flag() -> impl Strategy<Value = Flag> {
    proptest::sample::select(Flag::ALL.to_vec())
}

proptest! {
    #[test]
    fn significance_order_is_total(a in any_flag(), b in any_flag()) {
        let forward = a.more_significant_than(b);
        let backward = b.more_significant_than(a);
        prop_assert!(!(forward && backward));
        if !forward && !backward {
            prop_assert_eq!(a.significance(), b.significance());
        }
    }

    #[test]
    fn set_flag_keeps_most_significant(flags in proptest::collection::vec(any_flag(), 0..12)) {
        let mut record = single_column_record();
        let mut expected = Flag::Good;
        for flag in flags {
            record.set_flag(1, flag).unwrap();
            expected = expected.max_significance(flag);
            prop_assert_eq!(record.flag(1).unwrap().significance(), expected.significance());
        }
    }
}

#[test]
fn clear_messages_resets_flags() {
    let mut record = single_column_record();
    record.set_flag(1, Flag::Fatal).unwrap();
    record.clear_messages();
    assert_eq!(record.flag(1).unwrap(), Flag::Good);
}
