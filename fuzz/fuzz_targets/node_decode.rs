//! Feeds arbitrary bytes to the node decoder.
//!
//! Decoding must never panic. Whatever decodes must encode back to bytes that
//! decode to the same node.

#![no_main]

use libfuzzer_sys::fuzz_target;
use verkle::{decode, VerkleNode};

fuzz_target!(|data: (u8, &[u8])| {
    let (depth, bytes) = data;
    let Ok(node) = decode(bytes, depth) else {
        return;
    };

    let encoded = node.encode();
    let decoded: VerkleNode = decode(&encoded, depth).expect("re-encoded node must decode");
    assert_eq!(decoded, node);
});
