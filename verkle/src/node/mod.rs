//! In-memory verkle nodes.
//!
//! A tree is made of [`InternalNode`]s, whose children are addressed by one
//! chunk of the key, and [`LeafNode`]s, which hold the values of all keys
//! sharing a stem. Every node carries a banderwagon commitment; a leaf also
//! keeps the two half commitments `c1` (slots `0..128`) and `c2` (slots
//! `128..256`) its main commitment is built from.
//!
//! Nodes read from storage are shallow: the children of a decoded internal
//! node are [`Child::Unresolved`] until the caller loads and attaches them.

mod codec;

pub use banderwagon::Element as Point;
pub use codec::{
    create_internal_node, decode, CommitmentKind, DecodeError, EncodeError, NodeField,
};

use std::mem;

use crate::{
    constant::{EMPTY_CODE_HASH, LEAF_HALF_WIDTH, NODE_WIDTH},
    types::{LeafValue, Stem},
};

/// A node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum VerkleNode {
    Internal(InternalNode),
    Leaf(LeafNode),
}

impl VerkleNode {
    /// Depth of the node, the root being at depth 0.
    pub fn depth(&self) -> u8 {
        match self {
            VerkleNode::Internal(node) => node.depth,
            VerkleNode::Leaf(node) => node.depth,
        }
    }

    pub fn commitment(&self) -> &Point {
        match self {
            VerkleNode::Internal(node) => &node.commitment,
            VerkleNode::Leaf(node) => &node.commitment,
        }
    }

    /// The commitment mapped to a scalar, which is what the parent commits to
    /// at this node's position.
    pub fn commitment_scalar(&self) -> banderwagon::Fr {
        self.commitment().map_to_scalar_field()
    }

    pub fn as_internal(&self) -> Option<&InternalNode> {
        match self {
            VerkleNode::Internal(node) => Some(node),
            VerkleNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            VerkleNode::Leaf(node) => Some(node),
            VerkleNode::Internal(_) => None,
        }
    }
}

impl From<InternalNode> for VerkleNode {
    fn from(node: InternalNode) -> Self {
        VerkleNode::Internal(node)
    }
}

impl From<LeafNode> for VerkleNode {
    fn from(node: LeafNode) -> Self {
        VerkleNode::Leaf(node)
    }
}

/// A child slot of an internal node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Child {
    /// The child is loaded in memory.
    Resolved(Box<VerkleNode>),
    /// The child exists but has not been loaded; only its parent's commitment
    /// vouches for it.
    Unresolved,
    /// No child at this position.
    #[default]
    Absent,
}

impl Child {
    pub fn is_absent(&self) -> bool {
        matches!(self, Child::Absent)
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Child::Unresolved)
    }

    pub fn as_resolved(&self) -> Option<&VerkleNode> {
        match self {
            Child::Resolved(node) => Some(node),
            _ => None,
        }
    }
}

impl From<VerkleNode> for Child {
    fn from(node: VerkleNode) -> Self {
        Child::Resolved(Box::new(node))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InternalNode {
    children: Vec<Child>,
    commitment: Point,
    depth: u8,
}

impl InternalNode {
    /// An internal node without children, committing to the identity.
    pub fn new(depth: u8) -> Self {
        Self {
            children: vec![Child::Absent; NODE_WIDTH],
            commitment: Point::zero(),
            depth,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn commitment(&self) -> &Point {
        &self.commitment
    }

    pub fn set_commitment(&mut self, commitment: Point) {
        self.commitment = commitment;
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn child(&self, index: u8) -> &Child {
        &self.children[index as usize]
    }

    /// Replaces the child at `index`, returning the previous one.
    pub fn set_child(&mut self, index: u8, child: Child) -> Child {
        mem::replace(&mut self.children[index as usize], child)
    }

    /// Presence bitlist: bit `i` (most significant bit first) is set iff child
    /// `i` is not [`Child::Absent`].
    pub fn bitlist(&self) -> [u8; NODE_WIDTH / 8] {
        let mut bitlist = [0u8; NODE_WIDTH / 8];
        for (i, child) in self.children.iter().enumerate() {
            if !child.is_absent() {
                codec::set_bit(&mut bitlist, i);
            }
        }
        bitlist
    }
}

/// Wire layout of a leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafEncoding {
    /// Stem, bitlist, all three commitments and every present value.
    Generic,
    /// An externally owned account: basic data in slot 0, the empty code hash
    /// in slot 1, nothing else, and an identity `c2`.
    EoAccount,
    /// Exactly one value, at the given slot; the half commitment that does not
    /// cover that slot is the identity.
    SingleSlot(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    stem: Stem,
    values: Vec<Option<LeafValue>>,
    commitment: Point,
    c1: Point,
    c2: Point,
    depth: u8,
}

impl LeafNode {
    /// An empty leaf whose commitments are all the identity.
    pub fn new(stem: Stem, depth: u8) -> Self {
        Self {
            stem,
            values: vec![None; NODE_WIDTH],
            commitment: Point::zero(),
            c1: Point::zero(),
            c2: Point::zero(),
            depth,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn stem(&self) -> &Stem {
        &self.stem
    }

    pub fn values(&self) -> &[Option<LeafValue>] {
        &self.values
    }

    pub fn value(&self, index: u8) -> Option<&LeafValue> {
        self.values[index as usize].as_ref()
    }

    /// Sets or clears the value at `index`, returning the previous one.
    ///
    /// Commitments are left untouched; they are the caller's to update.
    pub fn set_value(&mut self, index: u8, value: Option<LeafValue>) -> Option<LeafValue> {
        mem::replace(&mut self.values[index as usize], value)
    }

    pub fn commitment(&self) -> &Point {
        &self.commitment
    }

    pub fn c1(&self) -> &Point {
        &self.c1
    }

    pub fn c2(&self) -> &Point {
        &self.c2
    }

    pub fn set_commitments(&mut self, commitment: Point, c1: Point, c2: Point) {
        self.commitment = commitment;
        self.c1 = c1;
        self.c2 = c2;
    }

    /// The most compact layout this leaf can be serialized with.
    pub fn encoding(&self) -> LeafEncoding {
        let mut present = self
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, value)| value.as_ref().map(|value| (i, value)));

        match (present.next(), present.next(), present.next()) {
            (Some((0, _)), Some((1, code_hash)), None)
                if *code_hash == EMPTY_CODE_HASH && self.c2.is_zero() =>
            {
                LeafEncoding::EoAccount
            }
            (Some((index, _)), None, None) => {
                let other_half = if index < LEAF_HALF_WIDTH {
                    &self.c2
                } else {
                    &self.c1
                };
                if other_half.is_zero() {
                    LeafEncoding::SingleSlot(index as u8)
                } else {
                    LeafEncoding::Generic
                }
            }
            _ => LeafEncoding::Generic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::random_point;
    use rand::{rngs::StdRng, SeedableRng};

    fn eoa_leaf(rng: &mut StdRng) -> LeafNode {
        let mut leaf = LeafNode::new([7; 31], 1);
        leaf.set_value(0, Some([1; 32]));
        leaf.set_value(1, Some(EMPTY_CODE_HASH));
        leaf.set_commitments(random_point(rng), random_point(rng), Point::zero());
        leaf
    }

    #[test]
    fn new_nodes_are_empty() {
        let internal = InternalNode::new(3);
        assert_eq!(internal.children().len(), NODE_WIDTH);
        assert!(internal.children().iter().all(Child::is_absent));
        assert!(internal.commitment().is_zero());
        assert_eq!(internal.bitlist(), [0; 32]);

        let leaf = LeafNode::new([0; 31], 2);
        assert_eq!(leaf.values().len(), NODE_WIDTH);
        assert!(leaf.values().iter().all(Option::is_none));
        assert_eq!(leaf.encoding(), LeafEncoding::Generic);
    }

    #[test]
    fn set_child_returns_previous() {
        let mut node = InternalNode::new(0);
        assert_eq!(node.set_child(9, Child::Unresolved), Child::Absent);

        let leaf = VerkleNode::from(LeafNode::new([9; 31], 1));
        assert_eq!(node.set_child(9, leaf.clone().into()), Child::Unresolved);
        assert_eq!(node.child(9).as_resolved(), Some(&leaf));

        let mut expected = [0u8; 32];
        expected[1] = 0b0100_0000;
        assert_eq!(node.bitlist(), expected);
    }

    #[test]
    fn commitment_scalar_maps_commitment() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut node = InternalNode::new(0);
        let point = random_point(&mut rng);
        node.set_commitment(point);

        let node = VerkleNode::from(node);
        assert_eq!(node.commitment_scalar(), point.map_to_scalar_field());
        assert_eq!(node.depth(), 0);
        assert!(node.as_leaf().is_none());
    }

    #[test]
    fn account_leaf_shape() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut leaf = eoa_leaf(&mut rng);
        assert_eq!(leaf.encoding(), LeafEncoding::EoAccount);

        // A contract: the code hash is not the empty one.
        leaf.set_value(1, Some([2; 32]));
        assert_eq!(leaf.encoding(), LeafEncoding::Generic);

        // A third slot.
        let mut leaf = eoa_leaf(&mut rng);
        leaf.set_value(64, Some([3; 32]));
        assert_eq!(leaf.encoding(), LeafEncoding::Generic);

        // Values in the upper half are committed to.
        let mut leaf = eoa_leaf(&mut rng);
        leaf.set_commitments(*leaf.commitment(), *leaf.c1(), random_point(&mut rng));
        assert_eq!(leaf.encoding(), LeafEncoding::Generic);
    }

    #[test]
    fn single_slot_shape() {
        let mut rng = StdRng::seed_from_u64(5);

        let mut low = LeafNode::new([1; 31], 1);
        low.set_value(5, Some([5; 32]));
        low.set_commitments(random_point(&mut rng), random_point(&mut rng), Point::zero());
        assert_eq!(low.encoding(), LeafEncoding::SingleSlot(5));

        let mut high = LeafNode::new([1; 31], 1);
        high.set_value(200, Some([5; 32]));
        high.set_commitments(random_point(&mut rng), Point::zero(), random_point(&mut rng));
        assert_eq!(high.encoding(), LeafEncoding::SingleSlot(200));

        // The half that does not hold the value commits to something.
        high.set_commitments(
            random_point(&mut rng),
            random_point(&mut rng),
            random_point(&mut rng),
        );
        assert_eq!(high.encoding(), LeafEncoding::Generic);

        // Slot 0 alone is a single slot, not an account.
        let mut basic_only = LeafNode::new([1; 31], 1);
        basic_only.set_value(0, Some([0; 32]));
        assert_eq!(basic_only.encoding(), LeafEncoding::SingleSlot(0));
    }
}
