//! Shared fixtures for unit tests.

use ark_std::UniformRand;
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, seq::index::sample, Rng};

use crate::{
    config::ConfigRegistry,
    constant::NODE_WIDTH,
    node::{LeafNode, Point},
};

/// Configurations are slow to build, so all tests share one registry.
pub(crate) static REGISTRY: Lazy<ConfigRegistry> = Lazy::new(ConfigRegistry::new);

pub(crate) fn random_point(rng: &mut StdRng) -> Point {
    Point::prime_subgroup_generator() * banderwagon::Fr::rand(rng)
}

/// A leaf at depth 1 with `count` random values at random slots and random
/// commitments.
pub(crate) fn random_leaf(rng: &mut StdRng, count: usize) -> LeafNode {
    let mut leaf = LeafNode::new(rng.gen(), 1);
    for index in sample(rng, NODE_WIDTH, count).into_iter() {
        leaf.set_value(index as u8, Some(rng.gen()));
    }
    leaf.set_commitments(random_point(rng), random_point(rng), random_point(rng));
    leaf
}
