//! This module defines constants that determine the shape of the tree and the
//! layout of its serialized nodes.
use ark_bls12_381::Fr;
use ark_ff::MontFp;

/// Size of a full tree key.
pub const KEY_SIZE: usize = 32;
/// A stem is a key without its last byte, which selects the value in the leaf.
pub const STEM_SIZE: usize = KEY_SIZE - 1;
/// Size of a value stored in a leaf slot.
pub const LEAF_VALUE_SIZE: usize = 32;

/// Number of bits to represent `NODE_WIDTH`.
pub const NODE_WIDTH_BITS: usize = 8;
/// Number of children of a serialized internal node, and of values in a
/// serialized leaf.
pub const NODE_WIDTH: usize = 1 << NODE_WIDTH_BITS;
/// Size of the presence bitlist of a serialized node.
pub const BITLIST_SIZE: usize = NODE_WIDTH / 8;
/// Slots below this index are committed to by `c1`, the others by `c2`.
pub const LEAF_HALF_WIDTH: usize = NODE_WIDTH / 2;

/// Size of a commitment on the wire (uncompressed banderwagon element).
pub const COMMITMENT_SIZE: usize = banderwagon::UNCOMPRESSED_SIZE;

/// Node type tags, the first byte of every serialized node.
pub const INTERNAL_TYPE: u8 = 1;
pub const LEAF_TYPE: u8 = 2;
pub const EO_ACCOUNT_TYPE: u8 = 3;
pub const SINGLE_SLOT_TYPE: u8 = 4;
pub const NODE_TYPE_SIZE: usize = 1;

/// No serialized node is shorter than a tag followed by one commitment.
pub const MIN_NODE_SIZE: usize = NODE_TYPE_SIZE + COMMITMENT_SIZE;
/// `<type><bitlist><commitment>`
pub const INTERNAL_NODE_SIZE: usize = NODE_TYPE_SIZE + BITLIST_SIZE + COMMITMENT_SIZE;
/// Size of the account header ("basic data") kept in slot 0 of an account leaf.
pub const BASIC_DATA_SIZE: usize = 32;
/// Size of the value kept by a single-slot leaf.
pub const SLOT_SIZE: usize = 32;
pub const SLOT_INDEX_SIZE: usize = 1;
/// `<type><stem><c1><commitment><basic data>`
pub const EO_ACCOUNT_LEAF_SIZE: usize =
    NODE_TYPE_SIZE + STEM_SIZE + 2 * COMMITMENT_SIZE + BASIC_DATA_SIZE;
/// `<type><stem><cn><commitment><slot index><slot>`
pub const SINGLE_SLOT_LEAF_SIZE: usize =
    NODE_TYPE_SIZE + STEM_SIZE + 2 * COMMITMENT_SIZE + SLOT_INDEX_SIZE + SLOT_SIZE;

/// Leaf slot holding an account's basic data.
pub const BASIC_DATA_LEAF_KEY: usize = 0;
/// Leaf slot holding an account's code hash.
pub const CODE_HASH_LEAF_KEY: usize = 1;
/// Keccak-256 of the empty byte string, the code hash of every externally
/// owned account.
pub const EMPTY_CODE_HASH: [u8; 32] =
    alloy_primitives::b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470").0;

/// Minimum number of non-zero evaluations for which a commitment is computed
/// with a multi-scalar multiplication instead of a plain weighted sum, for
/// 256-wide nodes.
pub const MULTI_EXP_THRESHOLD_8: usize = 25;
/// Same as [`MULTI_EXP_THRESHOLD_8`], for 1024-wide nodes.
pub const MULTI_EXP_THRESHOLD_10: usize = 180;

/// Scalar the structured reference string is derived from.
///
/// This is a publicly known test value, not the output of a ceremony.
/// Commitments built from it are not binding against anyone who reads this
/// file.
pub const SRS_SECRET: Fr = MontFp!("1927409816240961209460912649124");
