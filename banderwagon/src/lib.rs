//! Banderwagon: the prime-order quotient of the Bandersnatch curve in which
//! verkle node commitments live.
//!
//! Only the surface a verkle node needs is exposed: the group law, the 32-byte
//! compressed and 64-byte uncompressed encodings (the latter with an optional
//! subgroup check on decode), the identity, and the map from a commitment to a
//! scalar that lets a parent node commit to its children.

mod element;
mod trait_impls;

pub use element::{Element, Fr, PointError, COMPRESSED_SIZE, UNCOMPRESSED_SIZE};
