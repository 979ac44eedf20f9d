// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for snapshot decoding and the operations run on restored trees

#![no_main]

use arbor_cache::Snapshot;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(snapshot) = Snapshot::from_bytes(data) else {
        return;
    };
    let Some(tree) = snapshot.tree.as_ref() else {
        return;
    };

    // Anything that decodes must already satisfy every invariant
    assert!(tree.validate().is_ok());

    let encoded = snapshot.to_bytes().expect("re-encode");
    let decoded = Snapshot::from_bytes(&encoded).expect("decode re-encoded");
    assert_eq!(decoded.tree.as_ref(), Some(tree));

    // Exercise operations against the first few nodes
    let ids: Vec<String> = tree.walk().take(4).map(|(n, _)| n.id().to_string()).collect();
    for source in &ids {
        for target in &ids {
            if let Ok(moved) = tree.move_node(source, target) {
                assert!(moved.validate().is_ok());
            }
        }
        if let Some(pruned) = tree.delete(source) {
            assert!(pruned.validate().is_ok());
        }
    }
});
