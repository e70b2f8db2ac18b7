//! Group law for [`Element`].
//!
//! Verkle nodes only ever combine commitments additively and scale them by
//! field elements, so this covers `+`, `+=`, `-`, unary `-`, `* Fr` and
//! `Iterator::sum`.
//!
//! ```
//! # use banderwagon::{Element, Fr};
//! let g = Element::prime_subgroup_generator();
//! let three_g = g * Fr::from(3u64);
//! assert_eq!(three_g - g, g + g);
//! assert_eq!([g, g, g].into_iter().sum::<Element>(), three_g);
//! ```
use crate::element::{Element, Fr};

use std::{
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub},
};

impl Mul<Fr> for Element {
    type Output = Element;

    fn mul(self, rhs: Fr) -> Self::Output {
        Element(self.0 * rhs)
    }
}

impl Mul<&Fr> for &Element {
    type Output = Element;

    fn mul(self, rhs: &Fr) -> Self::Output {
        Element(self.0 * rhs)
    }
}

impl Add<Element> for Element {
    type Output = Element;

    fn add(self, rhs: Element) -> Self::Output {
        Element(self.0 + rhs.0)
    }
}

impl AddAssign<Element> for Element {
    fn add_assign(&mut self, rhs: Element) {
        self.0 += rhs.0
    }
}

impl Sub<Element> for Element {
    type Output = Element;

    fn sub(self, rhs: Element) -> Self::Output {
        Element(self.0 - rhs.0)
    }
}

/// `P + (-P)` is the identity.
impl Neg for Element {
    type Output = Element;

    fn neg(self) -> Self::Output {
        Element(-self.0)
    }
}

/// The empty sum is the identity.
impl Sum for Element {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Element(iter.map(|element| element.0).sum())
    }
}
