//! Property-based tests for validation and encoding laws.

use openracing_fftune::{
    EffectPayload, EffectTable, ParamNoteKind, TableError, encode_rumble, validate,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // --- Clamping: out-of-range values become the violated bound ---

    #[test]
    fn above_max_clamps_to_max(max in -1000i64..100_000, excess in 1i64..1_000_000) {
        let min = max.saturating_sub(5000);
        let raw = max.saturating_add(excess);
        let v = validate("field", &raw.to_string(), min, max);
        prop_assert_eq!(v.value, max);
        prop_assert!(v.note.is_some());
    }

    #[test]
    fn below_min_clamps_to_min(min in -100_000i64..1000, deficit in 1i64..1_000_000) {
        let max = min.saturating_add(5000);
        let raw = min.saturating_sub(deficit);
        let v = validate("field", &raw.to_string(), min, max);
        prop_assert_eq!(v.value, min);
        prop_assert!(v.note.is_some());
    }

    #[test]
    fn in_range_is_identity(value in -32768i64..=32767) {
        let v = validate("field", &value.to_string(), -32768, 32767);
        prop_assert_eq!(v.value, value);
        prop_assert!(v.note.is_none());
    }

    #[test]
    fn hex_and_decimal_agree(value in 0u32..=0xffff) {
        let dec = validate("field", &value.to_string(), 0, 0xffff);
        let hex = validate("field", &format!("{value:#x}"), 0, 0xffff);
        prop_assert_eq!(dec.value, hex.value);
    }

    #[test]
    fn validation_never_leaves_range(token in "\\PC{0,12}") {
        let v = validate("field", &token, -10, 10);
        prop_assert!((-10..=10).contains(&v.value));
    }

    // --- Clamping: tokens too long for i64 still clamp to the bound ---

    #[test]
    fn overflowing_digits_clamp_to_bound(digits in "[1-9][0-9]{19,40}", negative in any::<bool>()) {
        let token = if negative { format!("-{digits}") } else { digits };
        let v = validate("field", &token, -32768, 32767);
        let expected = if negative { -32768 } else { 32767 };
        prop_assert_eq!(v.value, expected);
        let kind = v.note.map(|n| n.kind);
        if negative {
            prop_assert_eq!(kind, Some(ParamNoteKind::BelowMin { min: -32768 }));
        } else {
            prop_assert_eq!(kind, Some(ParamNoteKind::AboveMax { max: 32767 }));
        }
    }

    // --- Round-trip: in-bounds rumble tokens are stored verbatim ---

    #[test]
    fn rumble_round_trip(
        duration in 0u32..=0x7fff_ffff,
        strong in any::<u16>(),
        weak in any::<u16>(),
    ) {
        let tokens = [duration.to_string(), strong.to_string(), weak.to_string()];
        let encoded = encode_rumble(&tokens)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(encoded.record.duration_ms, duration);
        prop_assert!(encoded.notes.is_empty());
        match encoded.record.payload {
            EffectPayload::Rumble(r) => {
                prop_assert_eq!(r.strong_magnitude, strong);
                prop_assert_eq!(r.weak_magnitude, weak);
            }
            EffectPayload::Periodic(_) => prop_assert!(false, "rumble encoded as periodic"),
        }
    }

    // --- Table: count never exceeds capacity ---

    #[test]
    fn reserve_never_exceeds_capacity(attempts in 0usize..100) {
        let mut table = EffectTable::new();
        let mut full_errors = 0usize;
        for _ in 0..attempts {
            if let Err(TableError::Full { .. }) = table.reserve_slot() {
                full_errors = full_errors.saturating_add(1);
            }
        }
        prop_assert!(table.len() <= table.capacity());
        prop_assert_eq!(full_errors, attempts.saturating_sub(table.capacity()));
    }
}
