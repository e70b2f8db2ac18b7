//! Algebra on node polynomials kept in evaluation form over the roots of unity.
//!
//! A node with `n` children is the polynomial `f` with `f(ωⁱ) = fᵢ`. Its
//! commitment is `Σ fᵢ·[Lᵢ(s)]G1`, and openings are built from the quotient
//! `q(X) = (f(X) - y) / (X - z)`, which is again computed in evaluation form.

use ark_bls12_381::{Fr, G1Projective};
use ark_ec::VariableBaseMSM;
use ark_ff::{batch_inversion, AdditiveGroup, Field, One, Zero};
use thiserror::Error;

use crate::config::CommitmentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AlgebraError {
    #[error("expected {expected} evaluations, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("index {index} is outside of a domain of size {size}")]
    IndexOutOfDomain { index: usize, size: usize },
    /// Opening points outside of the domain must not coincide with `ω^index`.
    #[error("opening point is the domain point at index {index}")]
    PointInDomain { index: usize },
    #[error("multi-scalar multiplication over mismatched inputs of length {0}")]
    Msm(usize),
}

impl CommitmentConfig {
    fn check_len(&self, f: &[Fr]) -> Result<(), AlgebraError> {
        if f.len() != self.node_width() {
            return Err(AlgebraError::LengthMismatch {
                expected: self.node_width(),
                actual: f.len(),
            });
        }
        Ok(())
    }

    /// Quotient of `f` by `X - ω^index`, in evaluation form.
    ///
    /// For `i ≠ index`, `qᵢ = (fᵢ - y) / (ωⁱ - ω^index)` with `y = f[index]`.
    /// The value at `ω^index` itself is `f'(ω^index)`, accumulated as
    /// `q[index] = -Σ ω^(i-index)·qᵢ`.
    pub fn inner_quotients(&self, f: &[Fr], index: usize) -> Result<Vec<Fr>, AlgebraError> {
        self.check_len(f)?;
        let n = self.node_width();
        if index >= n {
            return Err(AlgebraError::IndexOutOfDomain { index, size: n });
        }

        let inverses = self.barycentric_inverses();
        let y = f[index];
        let mut q = vec![Fr::zero(); n];
        let mut q_index = Fr::zero();

        for i in (0..n).filter(|&i| i != index) {
            // 1 / (ωⁱ - ω^index) = ω⁻ⁱ / (1 - ω^(index-i))
            let qi = (f[i] - y) * self.inverse_root(i) * inverses[(index + n - i) % n];
            q_index -= self.root_pow(i as isize - index as isize) * qi;
            q[i] = qi;
        }
        q[index] = q_index;

        Ok(q)
    }

    /// Quotient of `f - y` by `X - z` for `z` outside the domain, in
    /// evaluation form: `qᵢ = (fᵢ - y) / (ωⁱ - z)`.
    ///
    /// `y` is expected to be `f(z)`; it is not checked.
    pub fn outer_quotients(&self, f: &[Fr], z: Fr, y: Fr) -> Result<Vec<Fr>, AlgebraError> {
        self.check_len(f)?;

        let mut denominators: Vec<Fr> =
            self.roots_of_unity().iter().map(|root| *root - z).collect();
        if let Some(index) = denominators.iter().position(Zero::is_zero) {
            return Err(AlgebraError::PointInDomain { index });
        }
        batch_inversion(&mut denominators);

        Ok(f.iter()
            .zip(denominators)
            .map(|(fi, inv)| (*fi - y) * inv)
            .collect())
    }

    /// Commits to `poly` given in evaluation form.
    ///
    /// `empty_children` is the caller's count of zero evaluations. Dense
    /// polynomials go through a multi-scalar multiplication; sparse ones add up
    /// the non-zero terms one by one. Both give the same point.
    pub fn eval_poly(
        &self,
        poly: &[Fr],
        empty_children: usize,
    ) -> Result<G1Projective, AlgebraError> {
        self.check_len(poly)?;

        if self.node_width().saturating_sub(empty_children) >= self.multi_exp_threshold() {
            G1Projective::msm(self.lagrange_srs(), poly).map_err(AlgebraError::Msm)
        } else {
            Ok(self
                .lagrange_srs()
                .iter()
                .zip(poly)
                .filter(|(_, coeff)| !coeff.is_zero())
                .fold(G1Projective::ZERO, |acc, (base, coeff)| acc + *base * coeff))
        }
    }

    /// [`eval_poly`](Self::eval_poly), counting the empty children itself.
    pub fn commit(&self, poly: &[Fr]) -> Result<G1Projective, AlgebraError> {
        let empty_children = poly.iter().filter(|coeff| coeff.is_zero()).count();
        self.eval_poly(poly, empty_children)
    }

    /// Evaluates `f` at an arbitrary point.
    ///
    /// Domain points are looked up directly; any other `z` goes through the
    /// barycentric formula `f(z) = (zⁿ - 1)/n · Σ fᵢ·ωⁱ / (z - ωⁱ)`.
    pub fn evaluate(&self, f: &[Fr], z: Fr) -> Result<Fr, AlgebraError> {
        self.check_len(f)?;
        if let Some(index) = self.domain_index(&z) {
            return Ok(f[index]);
        }

        let roots = self.roots_of_unity();
        let mut denominators: Vec<Fr> = roots.iter().map(|root| z - root).collect();
        batch_inversion(&mut denominators);

        let sum: Fr = f
            .iter()
            .zip(roots)
            .zip(denominators)
            .map(|((fi, root), inv)| *fi * root * inv)
            .sum();
        let vanishing = z.pow([self.node_width() as u64]) - Fr::one();

        Ok(vanishing * self.inverse_node_width() * sum)
    }

    /// Index `i` with `ωⁱ = z`, if `z` is in the domain.
    pub fn domain_index(&self, z: &Fr) -> Option<usize> {
        self.roots_of_unity().iter().position(|root| root == z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::powers_of, constant::SRS_SECRET, test_utils::REGISTRY, types::Width};
    use ark_bls12_381::{Bls12_381, G1Affine};
    use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, PrimeGroup};
    use ark_std::UniformRand;
    use rand::{rngs::StdRng, seq::index::sample, SeedableRng};

    /// Evaluates a polynomial given by its coefficients, lowest degree first.
    fn horner(coeffs: &[Fr], x: Fr) -> Fr {
        coeffs.iter().rev().fold(Fr::zero(), |acc, c| acc * x + c)
    }

    /// `(p(X) - p(z)) / (X - z)` by synthetic division.
    fn divide_by_linear(coeffs: &[Fr], z: Fr) -> Vec<Fr> {
        let mut quotient = vec![Fr::zero(); coeffs.len() - 1];
        let mut carry = Fr::zero();
        for i in (1..coeffs.len()).rev() {
            carry = coeffs[i] + carry * z;
            quotient[i - 1] = carry;
        }
        quotient
    }

    fn cubic() -> Vec<Fr> {
        [7u64, 0, 3, 5].into_iter().map(Fr::from).collect()
    }

    fn evaluations(config: &CommitmentConfig, coeffs: &[Fr]) -> Vec<Fr> {
        config
            .roots_of_unity()
            .iter()
            .map(|root| horner(coeffs, *root))
            .collect()
    }

    #[test]
    fn inner_quotients_match_division() {
        for width in [Width::Eight, Width::Ten] {
            let config = REGISTRY.get(width).unwrap();
            let coeffs = cubic();
            let f = evaluations(&config, &coeffs);

            for index in [0, 1, 17, config.node_width() - 1] {
                let z = config.roots_of_unity()[index];
                let expected = evaluations(&config, &divide_by_linear(&coeffs, z));
                assert_eq!(config.inner_quotients(&f, index).unwrap(), expected);
            }
        }
    }

    #[test]
    fn outer_quotients_match_division() {
        let config = REGISTRY.get(Width::Eight).unwrap();
        let coeffs = cubic();
        let f = evaluations(&config, &coeffs);

        let z = Fr::from(123_456_789u64);
        let y = horner(&coeffs, z);
        let expected = evaluations(&config, &divide_by_linear(&coeffs, z));
        assert_eq!(config.outer_quotients(&f, z, y).unwrap(), expected);
    }

    #[test]
    fn outer_quotients_reject_domain_points() {
        let config = REGISTRY.get(Width::Eight).unwrap();
        let f = vec![Fr::one(); config.node_width()];
        let z = config.roots_of_unity()[3];

        assert_eq!(
            config.outer_quotients(&f, z, Fr::one()),
            Err(AlgebraError::PointInDomain { index: 3 })
        );
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        let config = REGISTRY.get(Width::Eight).unwrap();
        let short = vec![Fr::one(); 255];
        let mismatch = AlgebraError::LengthMismatch {
            expected: 256,
            actual: 255,
        };

        assert_eq!(config.inner_quotients(&short, 0), Err(mismatch));
        assert_eq!(config.outer_quotients(&short, Fr::from(3u64), Fr::one()), Err(mismatch));
        assert_eq!(config.eval_poly(&short, 0), Err(mismatch));
        assert_eq!(config.evaluate(&short, Fr::one()), Err(mismatch));

        let f = vec![Fr::one(); 256];
        assert_eq!(
            config.inner_quotients(&f, 256),
            Err(AlgebraError::IndexOutOfDomain {
                index: 256,
                size: 256
            })
        );
    }

    #[test]
    fn barycentric_evaluation() {
        let config = REGISTRY.get(Width::Ten).unwrap();
        let coeffs = cubic();
        let f = evaluations(&config, &coeffs);

        let z = Fr::from(0xdead_beef_u64);
        assert_eq!(config.domain_index(&z), None);
        assert_eq!(config.evaluate(&f, z).unwrap(), horner(&coeffs, z));

        let omega = config.roots_of_unity()[42];
        assert_eq!(config.domain_index(&omega), Some(42));
        assert_eq!(config.evaluate(&f, omega).unwrap(), f[42]);
    }

    #[test]
    fn commitment_is_evaluation_at_secret() {
        let config = REGISTRY.get(Width::Eight).unwrap();
        let coeffs = cubic();
        let f = evaluations(&config, &coeffs);

        let expected = G1Projective::generator() * horner(&coeffs, SRS_SECRET);
        assert_eq!(config.commit(&f).unwrap(), expected);
    }

    /// Node polynomials with a non-zero count just below and at the threshold
    /// commit to the same point through either path.
    #[test]
    fn eval_poly_paths_agree_around_threshold() {
        let mut rng = StdRng::seed_from_u64(25);

        for width in [Width::Eight, Width::Ten] {
            let config = REGISTRY.get(width).unwrap();
            let n = config.node_width();
            let threshold = config.multi_exp_threshold();

            for non_zero in [threshold - 1, threshold] {
                let mut poly = vec![Fr::zero(); n];
                for i in sample(&mut rng, n, non_zero).into_iter() {
                    poly[i] = Fr::rand(&mut rng);
                }
                let empty = n - non_zero;

                let sparse = config.eval_poly(&poly, n).unwrap();
                let dense = config.eval_poly(&poly, 0).unwrap();
                assert_eq!(config.eval_poly(&poly, empty).unwrap(), dense);
                assert_eq!(sparse, dense);
            }
        }
    }

    #[test]
    fn empty_node_commits_to_identity() {
        let config = REGISTRY.get(Width::Eight).unwrap();
        let poly = vec![Fr::zero(); config.node_width()];
        assert!(config.eval_poly(&poly, config.node_width()).unwrap().is_zero());
        assert!(config.eval_poly(&poly, 0).unwrap().is_zero());
    }

    /// `e(C - [y], [1]) = e(π, [s] - [z])` for openings inside and outside of
    /// the domain.
    #[test]
    fn openings_verify_with_pairing() {
        let config = REGISTRY.get(Width::Eight).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let f: Vec<Fr> = (0..config.node_width()).map(|_| Fr::rand(&mut rng)).collect();
        let commitment = config.commit(&f).unwrap();

        let g1 = G1Affine::generator();
        let g2 = config.g2_srs()[0];
        let s_g2 = config.g2_srs()[1];

        let check = |z: Fr, y: Fr, quotient: &[Fr]| {
            let proof = config.commit(quotient).unwrap();
            let lhs = Bls12_381::pairing((commitment - g1 * y).into_affine(), g2);
            let shifted = (s_g2.into_group() - g2 * z).into_affine();
            let rhs = Bls12_381::pairing(proof.into_affine(), shifted);
            assert_eq!(lhs, rhs);
        };

        let index = 200;
        check(
            config.roots_of_unity()[index],
            f[index],
            &config.inner_quotients(&f, index).unwrap(),
        );

        let z = Fr::from(99u64);
        let y = config.evaluate(&f, z).unwrap();
        check(z, y, &config.outer_quotients(&f, z, y).unwrap());
    }

    #[test]
    fn monomial_srs_matches_powers() {
        let config = REGISTRY.get(Width::Eight).unwrap();
        let g2 = config.g2_srs()[0];
        for (power, point) in powers_of(SRS_SECRET, 4).into_iter().zip(config.g2_srs()) {
            assert_eq!((g2 * power).into_affine(), *point);
        }
    }
}
