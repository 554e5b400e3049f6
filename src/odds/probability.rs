//! Exact rational probabilities.
//!
//! Every probability in the odds engine is a reduced fraction over `u128`.
//! Denominators stay small: card draws contribute factors of at most 11,
//! and gray-zone draw chances are whole percentages. Sums are therefore
//! exact, and the win/tie/lose triple of every action adds up to exactly 1.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Mul, Sub};

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// A probability in `[0, 1]` stored as a reduced fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Probability {
    num: u128,
    den: u128,
}

impl Probability {
    pub const ZERO: Probability = Probability { num: 0, den: 1 };
    pub const ONE: Probability = Probability { num: 1, den: 1 };

    /// `num / den`, reduced. A zero denominator yields zero.
    #[must_use]
    pub fn new(num: u128, den: u128) -> Self {
        if den == 0 || num == 0 {
            return Self::ZERO;
        }
        let g = gcd(num, den);
        Self {
            num: num / g,
            den: den / g,
        }
    }

    /// `1 / n`. Zero when `n` is zero.
    #[must_use]
    pub fn uniform(n: usize) -> Self {
        Self::new(1, n as u128)
    }

    /// A whole percentage, clamped to 100.
    #[must_use]
    pub fn percent(pct: u8) -> Self {
        Self::new(u128::from(pct.min(100)), 100)
    }

    #[must_use]
    pub const fn numerator(self) -> u128 {
        self.num
    }

    #[must_use]
    pub const fn denominator(self) -> u128 {
        self.den
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.num == 0
    }

    #[must_use]
    pub const fn is_one(self) -> bool {
        self.num == self.den
    }

    /// `1 - self`.
    #[must_use]
    pub fn complement(self) -> Self {
        Self::new(self.den - self.num.min(self.den), self.den)
    }

    /// Lossy view for display and ordering.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Rounded percentage for display.
    #[must_use]
    pub fn as_percent(self) -> f64 {
        self.to_f64() * 100.0
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Probability {
    type Output = Probability;

    fn add(self, rhs: Probability) -> Probability {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        let g = gcd(self.den, rhs.den);
        let lcm = self.den / g * rhs.den;
        let num = self.num * (lcm / self.den) + rhs.num * (lcm / rhs.den);
        Probability::new(num, lcm)
    }
}

impl AddAssign for Probability {
    fn add_assign(&mut self, rhs: Probability) {
        *self = *self + rhs;
    }
}

/// Saturating subtraction: never below zero.
impl Sub for Probability {
    type Output = Probability;

    fn sub(self, rhs: Probability) -> Probability {
        if rhs.is_zero() {
            return self;
        }
        let g = gcd(self.den, rhs.den);
        let lcm = self.den / g * rhs.den;
        let left = self.num * (lcm / self.den);
        let right = rhs.num * (lcm / rhs.den);
        Probability::new(left.saturating_sub(right), lcm)
    }
}

impl Mul for Probability {
    type Output = Probability;

    fn mul(self, rhs: Probability) -> Probability {
        if self.is_zero() || rhs.is_zero() {
            return Probability::ZERO;
        }
        // Cross-reduce first so intermediate products stay within the
        // final denominator.
        let g1 = gcd(self.num, rhs.den);
        let g2 = gcd(rhs.num, self.den);
        Probability::new(
            (self.num / g1) * (rhs.num / g2),
            (self.den / g2) * (rhs.den / g1),
        )
    }
}

impl std::iter::Sum for Probability {
    fn sum<I: Iterator<Item = Probability>>(iter: I) -> Probability {
        iter.fold(Probability::ZERO, |acc, p| acc + p)
    }
}

impl PartialOrd for Probability {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Probability {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        match (
            self.num.checked_mul(other.den),
            other.num.checked_mul(self.den),
        ) {
            (Some(left), Some(right)) => left.cmp(&right),
            _ => self
                .to_f64()
                .total_cmp(&other.to_f64())
                .then_with(|| (self.num, self.den).cmp(&(other.num, other.den))),
        }
    }
}

impl std::fmt::Display for Probability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.as_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction() {
        let p = Probability::new(2, 8);
        assert_eq!(p.numerator(), 1);
        assert_eq!(p.denominator(), 4);
        assert_eq!(Probability::new(0, 5), Probability::ZERO);
        assert_eq!(Probability::uniform(0), Probability::ZERO);
    }

    #[test]
    fn test_uniform_sums_to_one() {
        let total: Probability = (0..7).map(|_| Probability::uniform(7)).sum();
        assert!(total.is_one());
    }

    #[test]
    fn test_arithmetic() {
        let third = Probability::uniform(3);
        let half = Probability::uniform(2);

        assert_eq!(third + half, Probability::new(5, 6));
        assert_eq!(third * half, Probability::new(1, 6));
        assert_eq!(half - third, Probability::new(1, 6));
        assert_eq!(third - half, Probability::ZERO);
        assert_eq!(Probability::percent(80).complement(), Probability::new(1, 5));
    }

    #[test]
    fn test_ordering() {
        assert!(Probability::uniform(3) < Probability::uniform(2));
        assert!(Probability::percent(100) > Probability::percent(99));
    }

    #[test]
    fn test_mixed_denominators_stay_exact() {
        let draw = Probability::percent(15);
        let stay = draw.complement();
        let split: Probability = (0..11).map(|_| draw * Probability::uniform(11)).sum();
        assert!((stay + split).is_one());
    }
}
