//! Binary encoding of verkle nodes.
//!
//! Every serialized node starts with a one-byte type tag:
//!
//! ```text
//! internal:     <type><bitlist><commitment>
//! leaf:         <type><stem><bitlist><commitment><c1><c2><values...>
//! EOA leaf:     <type><stem><c1><commitment><basic data>
//! single slot:  <type><stem><c1 or c2><commitment><slot index><slot>
//! ```
//!
//! Commitments use the 64-byte uncompressed banderwagon encoding and are
//! subgroup-checked on decode. Bitlists are most significant bit first.

use std::{fmt, ops::Range};

use banderwagon::PointError;
use thiserror::Error;
use tracing::trace;

use super::{Child, InternalNode, LeafEncoding, LeafNode, Point, VerkleNode};
use crate::{
    constant::{
        BASIC_DATA_LEAF_KEY, BASIC_DATA_SIZE, BITLIST_SIZE, CODE_HASH_LEAF_KEY, COMMITMENT_SIZE,
        EMPTY_CODE_HASH, EO_ACCOUNT_TYPE, INTERNAL_NODE_SIZE, INTERNAL_TYPE, LEAF_HALF_WIDTH,
        LEAF_TYPE, LEAF_VALUE_SIZE, MIN_NODE_SIZE, NODE_TYPE_SIZE, NODE_WIDTH, SINGLE_SLOT_TYPE,
        SLOT_INDEX_SIZE, SLOT_SIZE, STEM_SIZE,
    },
    types::{LeafValue, Stem},
};

const MASK: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];

// Internal nodes.
const INTERNAL_BITLIST_OFFSET: usize = NODE_TYPE_SIZE;
const INTERNAL_COMMITMENT_OFFSET: usize = INTERNAL_BITLIST_OFFSET + BITLIST_SIZE;

// Generic leaves.
const LEAF_STEM_OFFSET: usize = NODE_TYPE_SIZE;
const LEAF_BITLIST_OFFSET: usize = LEAF_STEM_OFFSET + STEM_SIZE;
const LEAF_COMMITMENT_OFFSET: usize = LEAF_BITLIST_OFFSET + BITLIST_SIZE;
const LEAF_C1_OFFSET: usize = LEAF_COMMITMENT_OFFSET + COMMITMENT_SIZE;
const LEAF_C2_OFFSET: usize = LEAF_C1_OFFSET + COMMITMENT_SIZE;
const LEAF_VALUES_OFFSET: usize = LEAF_C2_OFFSET + COMMITMENT_SIZE;

// EOA and single-slot leaves share the layout up to the main commitment.
const COMPACT_HALF_OFFSET: usize = LEAF_STEM_OFFSET + STEM_SIZE;
const COMPACT_COMMITMENT_OFFSET: usize = COMPACT_HALF_OFFSET + COMMITMENT_SIZE;
const COMPACT_PAYLOAD_OFFSET: usize = COMPACT_COMMITMENT_OFFSET + COMMITMENT_SIZE;

pub(super) fn bit(bitlist: &[u8], nr: usize) -> bool {
    bitlist
        .get(nr / 8)
        .is_some_and(|byte| byte & MASK[nr % 8] != 0)
}

pub(super) fn set_bit(bitlist: &mut [u8], nr: usize) {
    bitlist[nr / 8] |= MASK[nr % 8];
}

/// A fixed-size part of a serialized node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeField {
    Stem,
    Bitlist,
    Commitment,
    Commitments,
    BasicData,
    SlotIndex,
    SlotValue,
}

impl fmt::Display for NodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeField::Stem => "stem",
            NodeField::Bitlist => "bitlist",
            NodeField::Commitment => "commitment",
            NodeField::Commitments => "commitments",
            NodeField::BasicData => "basic data",
            NodeField::SlotIndex => "slot index",
            NodeField::SlotValue => "slot value",
        })
    }
}

/// Which commitment of a node failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentKind {
    Internal,
    Leaf,
    C1,
    C2,
}

impl fmt::Display for CommitmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommitmentKind::Internal => "internal",
            CommitmentKind::Leaf => "leaf",
            CommitmentKind::C1 => "c1",
            CommitmentKind::C2 => "c2",
        })
    }
}

/// Reasons a serialized node is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("verkle payload is too short: {len} bytes")]
    PayloadTooShort { len: usize },

    /// Unknown type tag, or a part whose size is fixed has the wrong size.
    #[error("invalid node encoding")]
    InvalidNodeEncoding,

    #[error("serialized data too short to contain {field}")]
    Truncated { field: NodeField },

    #[error("not enough data to read value at index {index}")]
    NotEnoughData { index: usize },

    #[error("invalid {which} commitment")]
    InvalidCommitment {
        which: CommitmentKind,
        #[source]
        source: PointError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("leaf does not have the shape required by the {0:?} encoding")]
    ShapeMismatch(LeafEncoding),
}

fn field(serialized: &[u8], range: Range<usize>, field: NodeField) -> Result<&[u8], DecodeError> {
    serialized
        .get(range)
        .ok_or(DecodeError::Truncated { field })
}

fn point(bytes: &[u8], which: CommitmentKind) -> Result<Point, DecodeError> {
    Point::from_bytes_uncompressed(bytes, true)
        .map_err(|source| DecodeError::InvalidCommitment { which, source })
}

fn stem(serialized: &[u8]) -> Result<Stem, DecodeError> {
    let bytes = field(
        serialized,
        LEAF_STEM_OFFSET..LEAF_STEM_OFFSET + STEM_SIZE,
        NodeField::Stem,
    )?;
    let mut stem = [0u8; STEM_SIZE];
    stem.copy_from_slice(bytes);
    Ok(stem)
}

fn value(bytes: &[u8]) -> LeafValue {
    let mut value = [0u8; LEAF_VALUE_SIZE];
    value.copy_from_slice(bytes);
    value
}

/// Deserializes a node read from storage at `depth`.
///
/// Children of internal nodes come back as [`Child::Unresolved`] placeholders.
pub fn decode(serialized: &[u8], depth: u8) -> Result<VerkleNode, DecodeError> {
    if serialized.len() < MIN_NODE_SIZE {
        return Err(DecodeError::PayloadTooShort {
            len: serialized.len(),
        });
    }

    let tag = serialized[0];
    trace!(tag, len = serialized.len(), depth, "decoding node");

    match tag {
        LEAF_TYPE => decode_leaf(serialized, depth).map(VerkleNode::Leaf),
        INTERNAL_TYPE => decode_internal(serialized, depth).map(VerkleNode::Internal),
        EO_ACCOUNT_TYPE => decode_eo_account(serialized, depth).map(VerkleNode::Leaf),
        SINGLE_SLOT_TYPE => decode_single_slot(serialized, depth).map(VerkleNode::Leaf),
        _ => Err(DecodeError::InvalidNodeEncoding),
    }
}

fn decode_internal(serialized: &[u8], depth: u8) -> Result<InternalNode, DecodeError> {
    if serialized.len() < INTERNAL_NODE_SIZE {
        return Err(DecodeError::Truncated {
            field: NodeField::Commitment,
        });
    }
    create_internal_node(
        &serialized[INTERNAL_BITLIST_OFFSET..INTERNAL_COMMITMENT_OFFSET],
        &serialized[INTERNAL_COMMITMENT_OFFSET..],
        depth,
    )
}

/// Builds an internal node from an already split bitlist and commitment.
///
/// Children whose bit is set become [`Child::Unresolved`], the others
/// [`Child::Absent`]. Both parts must have their exact size.
pub fn create_internal_node(
    bitlist: &[u8],
    raw_commitment: &[u8],
    depth: u8,
) -> Result<InternalNode, DecodeError> {
    if bitlist.len() != BITLIST_SIZE || raw_commitment.len() != COMMITMENT_SIZE {
        return Err(DecodeError::InvalidNodeEncoding);
    }

    let children = (0..NODE_WIDTH)
        .map(|i| {
            if bit(bitlist, i) {
                Child::Unresolved
            } else {
                Child::Absent
            }
        })
        .collect();

    Ok(InternalNode {
        children,
        commitment: point(raw_commitment, CommitmentKind::Internal)?,
        depth,
    })
}

fn decode_leaf(serialized: &[u8], depth: u8) -> Result<LeafNode, DecodeError> {
    let stem = stem(serialized)?;
    let bitlist = field(
        serialized,
        LEAF_BITLIST_OFFSET..LEAF_BITLIST_OFFSET + BITLIST_SIZE,
        NodeField::Bitlist,
    )?;
    let commitments = field(
        serialized,
        LEAF_COMMITMENT_OFFSET..LEAF_VALUES_OFFSET,
        NodeField::Commitments,
    )?;
    let (commitment, halves) = commitments.split_at(COMMITMENT_SIZE);
    let (c1, c2) = halves.split_at(COMMITMENT_SIZE);

    let mut leaf = LeafNode::new(stem, depth);
    leaf.commitment = point(commitment, CommitmentKind::Leaf)?;
    leaf.c1 = point(c1, CommitmentKind::C1)?;
    leaf.c2 = point(c2, CommitmentKind::C2)?;

    let mut offset = LEAF_VALUES_OFFSET;
    for index in (0..NODE_WIDTH).filter(|&i| bit(bitlist, i)) {
        let bytes = serialized
            .get(offset..offset + LEAF_VALUE_SIZE)
            .ok_or(DecodeError::NotEnoughData { index })?;
        leaf.values[index] = Some(value(bytes));
        offset += LEAF_VALUE_SIZE;
    }

    Ok(leaf)
}

/// Reads the half commitment and main commitment shared by the compact leaf
/// layouts.
fn compact_commitments(
    serialized: &[u8],
    half: CommitmentKind,
) -> Result<(Point, Point), DecodeError> {
    let commitments = field(
        serialized,
        COMPACT_HALF_OFFSET..COMPACT_PAYLOAD_OFFSET,
        NodeField::Commitments,
    )?;
    let (half_commitment, commitment) = commitments.split_at(COMMITMENT_SIZE);
    Ok((point(half_commitment, half)?, point(commitment, CommitmentKind::Leaf)?))
}

fn decode_eo_account(serialized: &[u8], depth: u8) -> Result<LeafNode, DecodeError> {
    let stem = stem(serialized)?;
    let (c1, commitment) = compact_commitments(serialized, CommitmentKind::C1)?;
    let basic_data = field(
        serialized,
        COMPACT_PAYLOAD_OFFSET..COMPACT_PAYLOAD_OFFSET + BASIC_DATA_SIZE,
        NodeField::BasicData,
    )?;

    let mut leaf = LeafNode::new(stem, depth);
    leaf.values[BASIC_DATA_LEAF_KEY] = Some(value(basic_data));
    leaf.values[CODE_HASH_LEAF_KEY] = Some(EMPTY_CODE_HASH);
    leaf.commitment = commitment;
    leaf.c1 = c1;
    leaf.c2 = Point::zero();
    Ok(leaf)
}

fn decode_single_slot(serialized: &[u8], depth: u8) -> Result<LeafNode, DecodeError> {
    let stem = stem(serialized)?;
    // The slot index follows the commitments but selects which half they hold.
    field(
        serialized,
        COMPACT_HALF_OFFSET..COMPACT_PAYLOAD_OFFSET,
        NodeField::Commitments,
    )?;
    let index = *serialized
        .get(COMPACT_PAYLOAD_OFFSET)
        .ok_or(DecodeError::Truncated {
            field: NodeField::SlotIndex,
        })? as usize;
    let lower = index < LEAF_HALF_WIDTH;
    let half_kind = if lower {
        CommitmentKind::C1
    } else {
        CommitmentKind::C2
    };
    let (half, commitment) = compact_commitments(serialized, half_kind)?;

    let slot_offset = COMPACT_PAYLOAD_OFFSET + SLOT_INDEX_SIZE;
    let slot = field(
        serialized,
        slot_offset..slot_offset + SLOT_SIZE,
        NodeField::SlotValue,
    )?;

    let mut leaf = LeafNode::new(stem, depth);
    leaf.values[index] = Some(value(slot));
    leaf.commitment = commitment;
    if lower {
        leaf.c1 = half;
    } else {
        leaf.c2 = half;
    }
    Ok(leaf)
}

impl VerkleNode {
    /// Serializes the node, choosing the most compact layout for leaves.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            VerkleNode::Internal(node) => node.encode(),
            VerkleNode::Leaf(node) => node.encode(),
        }
    }
}

impl InternalNode {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(INTERNAL_NODE_SIZE);
        out.push(INTERNAL_TYPE);
        out.extend_from_slice(&self.bitlist());
        out.extend_from_slice(&self.commitment.to_bytes_uncompressed());
        out
    }
}

impl LeafNode {
    /// Serializes the leaf with the layout returned by [`encoding`](Self::encoding).
    pub fn encode(&self) -> Vec<u8> {
        let encoding = self.encoding();
        trace!(?encoding, depth = self.depth, "encoding leaf");
        self.write(encoding)
    }

    /// Serializes the leaf with a given layout.
    ///
    /// Any leaf can be written with [`LeafEncoding::Generic`]; the compact
    /// layouts require the shape [`encoding`](Self::encoding) would pick.
    pub fn encode_as(&self, encoding: LeafEncoding) -> Result<Vec<u8>, EncodeError> {
        if encoding != LeafEncoding::Generic && encoding != self.encoding() {
            return Err(EncodeError::ShapeMismatch(encoding));
        }
        Ok(self.write(encoding))
    }

    fn slot(&self, index: usize) -> LeafValue {
        self.values[index].unwrap_or_default()
    }

    fn write(&self, encoding: LeafEncoding) -> Vec<u8> {
        let mut out = Vec::with_capacity(LEAF_VALUES_OFFSET);
        match encoding {
            LeafEncoding::Generic => {
                let mut bitlist = [0u8; BITLIST_SIZE];
                for (i, _) in self.values.iter().enumerate().filter(|(_, v)| v.is_some()) {
                    set_bit(&mut bitlist, i);
                }

                out.push(LEAF_TYPE);
                out.extend_from_slice(&self.stem);
                out.extend_from_slice(&bitlist);
                out.extend_from_slice(&self.commitment.to_bytes_uncompressed());
                out.extend_from_slice(&self.c1.to_bytes_uncompressed());
                out.extend_from_slice(&self.c2.to_bytes_uncompressed());
                for value in self.values.iter().flatten() {
                    out.extend_from_slice(value);
                }
            }
            LeafEncoding::EoAccount => {
                out.push(EO_ACCOUNT_TYPE);
                out.extend_from_slice(&self.stem);
                out.extend_from_slice(&self.c1.to_bytes_uncompressed());
                out.extend_from_slice(&self.commitment.to_bytes_uncompressed());
                out.extend_from_slice(&self.slot(BASIC_DATA_LEAF_KEY));
            }
            LeafEncoding::SingleSlot(index) => {
                let half = if (index as usize) < LEAF_HALF_WIDTH {
                    &self.c1
                } else {
                    &self.c2
                };
                out.push(SINGLE_SLOT_TYPE);
                out.extend_from_slice(&self.stem);
                out.extend_from_slice(&half.to_bytes_uncompressed());
                out.extend_from_slice(&self.commitment.to_bytes_uncompressed());
                out.push(index);
                out.extend_from_slice(&self.slot(index as usize));
            }
        }
        out
    }
}
