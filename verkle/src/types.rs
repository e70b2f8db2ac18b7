//! Core data types shared by the configuration, the key utilities and the node
//! codec.
//!
//! - [`Width`]: the supported branching widths
//! - [`Key`], [`Stem`] and [`LeafValue`]: fixed-size byte strings

use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    constant::{
        KEY_SIZE, LEAF_VALUE_SIZE, MULTI_EXP_THRESHOLD_10, MULTI_EXP_THRESHOLD_8, STEM_SIZE,
    },
};

/// A full tree key.
pub type Key = [u8; KEY_SIZE];

/// The key prefix shared by all values of a leaf.
pub type Stem = [u8; STEM_SIZE];

/// A value stored in a leaf slot.
pub type LeafValue = [u8; LEAF_VALUE_SIZE];

/// Number of key bits consumed by one level of the tree.
///
/// Only 8-bit (256 children) and 10-bit (1024 children) levels are supported.
/// Widths are validated once, when they are parsed from a bit count, so code
/// holding a `Width` never has to handle an unsupported one.
///
/// Serializes as its bit count, e.g. `"width": 10`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "usize", into = "usize")]
pub enum Width {
    Eight,
    Ten,
}

impl Width {
    /// Number of key bits spanned by a node.
    pub const fn bits(self) -> usize {
        match self {
            Width::Eight => 8,
            Width::Ten => 10,
        }
    }

    /// Number of children in an internal node.
    pub const fn node_width(self) -> usize {
        1 << self.bits()
    }

    /// Minimum number of non-zero evaluations for which a multi-scalar
    /// multiplication beats a plain weighted sum at this width.
    pub const fn multi_exp_threshold(self) -> usize {
        match self {
            Width::Eight => MULTI_EXP_THRESHOLD_8,
            Width::Ten => MULTI_EXP_THRESHOLD_10,
        }
    }
}

impl TryFrom<usize> for Width {
    type Error = ConfigError;

    fn try_from(bits: usize) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(Width::Eight),
            10 => Ok(Width::Ten),
            _ => Err(ConfigError::UnsupportedWidth(bits)),
        }
    }
}

impl From<Width> for usize {
    fn from(width: Width) -> Self {
        width.bits()
    }
}

impl std::fmt::Display for Width {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}
