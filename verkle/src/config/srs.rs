//! Structured reference string of the commitment scheme.
//!
//! The monomial form is `[s⁰]G, [s¹]G, ..., [sⁿ⁻¹]G` in both groups. Node
//! polynomials are kept as evaluations over the roots of unity, so the G1 half
//! is moved to the Lagrange basis with an inverse FFT over the group:
//! `[Lᵢ(s)]G = 1/n · Σⱼ ω^(-ij) · [sʲ]G`.

use ark_bls12_381::{Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{CurveGroup, PrimeGroup};
use ark_ff::One;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub(crate) struct Srs {
    /// `[Lᵢ(s)]G1` for every point of the domain.
    pub(crate) lagrange_g1: Vec<G1Affine>,
    /// `[sⁱ]G2`, unused by commitments but needed to check openings.
    pub(crate) monomial_g2: Vec<G2Affine>,
}

/// `[1, x, x², ..., xⁿ⁻¹]`
pub(crate) fn powers_of(point: Fr, n: usize) -> Vec<Fr> {
    let mut powers = Vec::with_capacity(n);
    let mut acc = Fr::one();
    for _ in 0..n {
        powers.push(acc);
        acc *= point;
    }
    powers
}

/// Builds the reference string for `domain` from `secret`.
pub(crate) fn generate(secret: Fr, domain: &Radix2EvaluationDomain<Fr>) -> Srs {
    let powers = powers_of(secret, domain.size());

    let g1 = G1Projective::generator();
    let g2 = G2Projective::generator();
    let monomial_g1: Vec<G1Projective> = use_iter!(powers).map(|power| g1 * power).collect();
    let monomial_g2: Vec<G2Projective> = use_iter!(powers).map(|power| g2 * power).collect();

    let lagrange_g1 = domain.ifft(&monomial_g1);

    Srs {
        lagrange_g1: G1Projective::normalize_batch(&lagrange_g1),
        monomial_g2: G2Projective::normalize_batch(&monomial_g2),
    }
}
