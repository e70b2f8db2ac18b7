//! Per-width commitment configuration.
//!
//! A [`CommitmentConfig`] holds everything derived from the node width that is
//! expensive to compute: the evaluation domain, the barycentric inverses and
//! the structured reference string. Configurations are built lazily, at most
//! once per width, by a [`ConfigRegistry`] owned by the caller.

mod srs;

use std::{fmt, sync::Arc, time::Instant};

use ark_bls12_381::{Fr, G1Affine, G2Affine};
use ark_ff::{batch_inversion, BigInteger256, One, PrimeField};
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;

use crate::{constant::SRS_SECRET, types::Width};

pub(crate) use srs::powers_of;

/// Errors raised while selecting or building a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unsupported node width: {0} bits (expected 8 or 10)")]
    UnsupportedWidth(usize),
    #[error("scalar field has no evaluation domain of size {0}")]
    FftDomain(usize),
}

/// Precomputed parameters for committing to nodes of one width.
///
/// Immutable once built and cheap to share behind an [`Arc`].
pub struct CommitmentConfig {
    width: Width,
    node_width: usize,
    modulus: BigInteger256,
    domain: Radix2EvaluationDomain<Fr>,
    /// `ωⁱ` for `i` in `0..node_width`.
    roots_of_unity: Vec<Fr>,
    /// `1 / (1 - ωⁱ)`, with a zero at index 0 where the inverse is undefined.
    barycentric_inverses: Vec<Fr>,
    inverse_node_width: Fr,
    lagrange_srs: Vec<G1Affine>,
    g2_srs: Vec<G2Affine>,
    multi_exp_threshold: usize,
}

impl CommitmentConfig {
    /// Builds the configuration for `width`.
    ///
    /// This runs an inverse FFT over G1 and takes a noticeable amount of
    /// time; prefer [`ConfigRegistry::get`], which does it once per width.
    pub fn new(width: Width) -> Result<Self, ConfigError> {
        let start = Instant::now();
        let node_width = width.node_width();

        let domain = Radix2EvaluationDomain::<Fr>::new(node_width)
            .filter(|domain| domain.size() == node_width)
            .ok_or(ConfigError::FftDomain(node_width))?;

        let roots_of_unity: Vec<Fr> = domain.elements().collect();

        let mut barycentric_inverses: Vec<Fr> =
            roots_of_unity.iter().map(|root| Fr::one() - root).collect();
        // The first entry is zero and stays zero.
        batch_inversion(&mut barycentric_inverses);

        let srs = srs::generate(SRS_SECRET, &domain);

        debug!(
            %width,
            node_width,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built commitment config"
        );

        Ok(Self {
            width,
            node_width,
            modulus: Fr::MODULUS,
            domain,
            roots_of_unity,
            barycentric_inverses,
            inverse_node_width: domain.size_inv(),
            lagrange_srs: srs.lagrange_g1,
            g2_srs: srs.monomial_g2,
            multi_exp_threshold: width.multi_exp_threshold(),
        })
    }

    pub fn width(&self) -> Width {
        self.width
    }

    /// Number of children of an internal node, `2^width`.
    pub fn node_width(&self) -> usize {
        self.node_width
    }

    /// Order of the scalar field.
    pub fn modulus(&self) -> &BigInteger256 {
        &self.modulus
    }

    /// Evaluation domain of node polynomials.
    pub fn domain(&self) -> &Radix2EvaluationDomain<Fr> {
        &self.domain
    }

    pub fn roots_of_unity(&self) -> &[Fr] {
        &self.roots_of_unity
    }

    pub fn barycentric_inverses(&self) -> &[Fr] {
        &self.barycentric_inverses
    }

    /// `1 / node_width` in the scalar field.
    pub fn inverse_node_width(&self) -> Fr {
        self.inverse_node_width
    }

    /// Lagrange basis of the reference string in G1, one point per child.
    pub fn lagrange_srs(&self) -> &[G1Affine] {
        &self.lagrange_srs
    }

    /// Monomial powers of the secret in G2, used to check openings with a
    /// pairing.
    pub fn g2_srs(&self) -> &[G2Affine] {
        &self.g2_srs
    }

    pub fn multi_exp_threshold(&self) -> usize {
        self.multi_exp_threshold
    }

    /// See [`Width::equal_paths`].
    pub fn equal_paths(&self, key1: &[u8], key2: &[u8]) -> bool {
        self.width.equal_paths(key1, key2)
    }

    /// See [`Width::offset_to_key`].
    pub fn offset_to_key(&self, key: &[u8], offset: usize) -> Option<usize> {
        self.width.offset_to_key(key, offset)
    }

    /// `ω^(exponent mod node_width)`, for signed exponents.
    pub(crate) fn root_pow(&self, exponent: isize) -> Fr {
        let n = self.node_width as isize;
        self.roots_of_unity[exponent.rem_euclid(n) as usize]
    }

    /// `ω⁻ⁱ`
    pub(crate) fn inverse_root(&self, i: usize) -> Fr {
        self.root_pow(-(i as isize))
    }
}

impl fmt::Debug for CommitmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitmentConfig")
            .field("width", &self.width)
            .field("node_width", &self.node_width)
            .field("multi_exp_threshold", &self.multi_exp_threshold)
            .field("lagrange_srs", &format_args!("[{} points]", self.lagrange_srs.len()))
            .field("g2_srs", &format_args!("[{} points]", self.g2_srs.len()))
            .finish_non_exhaustive()
    }
}

/// Lazily built configurations, one per supported width.
///
/// Each configuration is built on first use and shared afterwards; concurrent
/// first calls for the same width block until the single build finishes.
#[derive(Default)]
pub struct ConfigRegistry {
    eight: OnceCell<Arc<CommitmentConfig>>,
    ten: OnceCell<Arc<CommitmentConfig>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the configuration for `width`, building it if needed.
    pub fn get(&self, width: Width) -> Result<Arc<CommitmentConfig>, ConfigError> {
        let cell = match width {
            Width::Eight => &self.eight,
            Width::Ten => &self.ten,
        };
        cell.get_or_try_init(|| CommitmentConfig::new(width).map(Arc::new))
            .cloned()
    }

    /// Same as [`get`](Self::get), for a width given as a bit count.
    pub fn get_by_bits(&self, bits: usize) -> Result<Arc<CommitmentConfig>, ConfigError> {
        self.get(Width::try_from(bits)?)
    }

    /// Returns `true` if the configuration for `width` has been built.
    pub fn is_initialized(&self, width: Width) -> bool {
        match width {
            Width::Eight => self.eight.get().is_some(),
            Width::Ten => self.ten.get().is_some(),
        }
    }
}

impl fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("eight", &self.is_initialized(Width::Eight))
            .field("ten", &self.is_initialized(Width::Ten))
            .finish()
    }
}
