#![doc = include_str!("../README.md")]

#[macro_use]
mod macros;

pub mod config;
pub use config::{CommitmentConfig, ConfigError, ConfigRegistry};
pub mod constant;
pub mod key_path;
pub mod node;
pub use node::{
    create_internal_node, decode, Child, CommitmentKind, DecodeError, EncodeError, InternalNode, LeafEncoding,
    LeafNode, NodeField, Point, VerkleNode,
};
pub mod polynomial;
pub use polynomial::AlgebraError;
pub mod types;
pub use types::*;

#[cfg(test)]
pub(crate) mod test_utils;
