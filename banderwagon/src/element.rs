use ark_ec::{twisted_edwards::TECurveConfig, PrimeGroup};
use ark_ed_on_bls12_381_bandersnatch::{BandersnatchConfig, EdwardsAffine, EdwardsProjective, Fq};
use ark_ff::{Field, One, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use thiserror::Error;

pub use ark_ed_on_bls12_381_bandersnatch::Fr;

/// Size in bytes of the compressed encoding: `sign(y)·x`, big-endian.
pub const COMPRESSED_SIZE: usize = 32;

/// Size in bytes of the uncompressed encoding: `x` then `y`, each 32 bytes
/// little-endian.
pub const UNCOMPRESSED_SIZE: usize = 64;

/// Reasons an uncompressed encoding is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointError {
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("coordinates are not canonical field elements")]
    Malformed,

    #[error("point is not on the bandersnatch curve")]
    NotOnCurve,

    #[error("point is not in the banderwagon subgroup")]
    NotInSubgroup,
}

#[derive(Debug, Clone, Copy, Eq)]
pub struct Element(pub(crate) EdwardsProjective);

impl PartialEq for Element {
    /// Checks equality in the banderwagon quotient group.
    ///
    /// Points `(x, y)` and `(-x, -y)` are the same element, so instead of exact
    /// point equality this verifies `x₁/y₁ == x₂/y₂` as `x₁ * y₂ == x₂ * y₁`.
    ///
    /// Both sides must be valid banderwagon elements (on the curve, passed the
    /// subgroup check), which excludes the points at infinity with `y = 0`.
    fn eq(&self, other: &Self) -> bool {
        (self.0.x * other.0.y) == (other.0.x * self.0.y)
    }
}

impl Default for Element {
    fn default() -> Self {
        Element::zero()
    }
}

impl Element {
    /// Serializes this element to its 64-byte uncompressed representation.
    ///
    /// The encoding is not canonical with respect to the quotient group:
    /// `(x, y)` and `(-x, -y)` produce different bytes. Compare elements with
    /// `==`, never their encodings.
    pub fn to_bytes_uncompressed(&self) -> [u8; UNCOMPRESSED_SIZE] {
        let mut bytes = [0u8; UNCOMPRESSED_SIZE];
        EdwardsAffine::from(self.0)
            .serialize_uncompressed(&mut bytes[..])
            .expect("an affine point always fits in 64 bytes");
        bytes
    }

    /// Deserializes an element from its 64-byte uncompressed representation.
    ///
    /// Both coordinates must be canonical field elements and the point must lie
    /// on the curve. With `subgroup_check` set, the point must additionally be
    /// in the banderwagon subgroup; callers reading untrusted bytes must set it.
    pub fn from_bytes_uncompressed(bytes: &[u8], subgroup_check: bool) -> Result<Self, PointError> {
        if bytes.len() != UNCOMPRESSED_SIZE {
            return Err(PointError::InvalidLength {
                expected: UNCOMPRESSED_SIZE,
                actual: bytes.len(),
            });
        }

        let point = EdwardsAffine::deserialize_uncompressed_unchecked(bytes)
            .map_err(|_| PointError::Malformed)?;

        if !point.is_on_curve() {
            return Err(PointError::NotOnCurve);
        }
        if subgroup_check && !is_in_subgroup(&point) {
            return Err(PointError::NotInSubgroup);
        }

        Ok(Element(point.into()))
    }

    /// Serializes this element as `sign(y)·x` in 32 big-endian bytes.
    ///
    /// `(x, y)` and `(-x, -y)` encode identically, so unlike the uncompressed
    /// form this encoding is canonical.
    pub fn to_bytes(&self) -> [u8; COMPRESSED_SIZE] {
        let affine = EdwardsAffine::from(self.0);
        let x = if is_positive(affine.y) {
            affine.x
        } else {
            -affine.x
        };

        let mut bytes = [0u8; COMPRESSED_SIZE];
        x.serialize_compressed(&mut bytes[..])
            .expect("a base field element always fits in 32 bytes");
        // arkworks is little-endian
        bytes.reverse();
        bytes
    }

    /// Deserializes an element from its compressed representation. The
    /// subgroup check is always performed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PointError> {
        let mut le: [u8; COMPRESSED_SIZE] =
            bytes.try_into().map_err(|_| PointError::InvalidLength {
                expected: COMPRESSED_SIZE,
                actual: bytes.len(),
            })?;
        le.reverse();

        let x = Fq::deserialize_compressed(&le[..]).map_err(|_| PointError::Malformed)?;
        let point = point_from_x(x).ok_or(PointError::NotOnCurve)?;
        if !is_in_subgroup(&point) {
            return Err(PointError::NotInSubgroup);
        }

        Ok(Element(point.into()))
    }

    pub fn prime_subgroup_generator() -> Element {
        Element(EdwardsProjective::generator())
    }

    /// The group identity.
    pub fn zero() -> Element {
        Element(EdwardsProjective::zero())
    }

    pub fn is_zero(&self) -> bool {
        *self == Element::zero()
    }

    fn map_to_field(&self) -> Fq {
        self.0.x / self.0.y
    }

    /// Maps the element to a scalar so that it can be committed to by a parent
    /// node. This is a 2 to 1 map, but the two preimages are the same element.
    pub fn map_to_scalar_field(&self) -> Fr {
        let base_field = self.map_to_field();

        let mut bytes = [0u8; 32];
        base_field
            .serialize_compressed(&mut bytes[..])
            .expect("a base field element always fits in 32 bytes");
        Fr::from_le_bytes_mod_order(&bytes)
    }
}

/// The curve point with abscissa `x` and the lexicographically largest `y`.
fn point_from_x(x: Fq) -> Option<EdwardsAffine> {
    let x_sq = x.square();
    let y_sq = (BandersnatchConfig::COEFF_A * x_sq - Fq::one())
        / (BandersnatchConfig::COEFF_D * x_sq - Fq::one());

    let y = y_sq.sqrt()?;
    let y = if is_positive(y) { y } else { -y };
    Some(EdwardsAffine::new_unchecked(x, y))
}

/// The lexicographically largest of `±c` is the positive one.
fn is_positive(coordinate: Fq) -> bool {
    coordinate > -coordinate
}

/// Banderwagon subgroup membership: `1 - ax²` must be a quadratic residue.
///
/// Assumes the point is already known to be on the curve; (0, 0) for example
/// passes this check without being a curve point.
fn is_in_subgroup(point: &EdwardsAffine) -> bool {
    (Fq::one() - BandersnatchConfig::COEFF_A * point.x.square())
        .legendre()
        .is_qr()
}
