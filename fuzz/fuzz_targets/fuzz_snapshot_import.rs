#![no_main]

use libfuzzer_sys::fuzz_target;
use seatplan_core::snapshot::{decode, encode, import};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 16 * 1024 {
        return;
    }

    // Arbitrary input either fails cleanly or yields a consistent chart.
    let Ok(state) = import(text) else {
        return;
    };
    let errors = state.check_invariants();
    assert!(errors.is_empty(), "imported chart is inconsistent: {errors:?}");

    // A decoded chart re-encodes to something that decodes the same.
    let first = encode(&state);
    let again = decode(first.clone()).expect("re-encoded chart must decode");
    assert_eq!(again.grid(), state.grid());
    assert_eq!(again.registry(), state.registry());
    assert_eq!(again.arrangement().len(), state.arrangement().len());
});
