#![no_main]

use libfuzzer_sys::fuzz_target;
use seatplan_core::{Roster, display_name, parse_roster};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 8192 {
        return;
    }

    let entries = parse_roster(text);
    assert!(entries.len() <= text.lines().count());
    for entry in &entries {
        assert!(!entry.is_empty(), "blank entry from {text:?}");
        assert_eq!(entry.trim(), entry, "untrimmed entry {entry:?}");
        // Printable names never panic and never grow.
        assert!(display_name(entry).len() <= entry.len());
    }

    let roster = Roster::from_names(entries.iter().cloned());
    assert_eq!(roster.len(), entries.len());
    let mut replaced = roster.clone();
    let change = replaced.replace(entries.iter().cloned());
    assert_eq!(change.kept.len(), entries.len());
    assert!(change.added.is_empty() && change.removed.is_empty());
    assert_eq!(replaced, roster);
});
