//! Constrained value sampling.
//!
//! Every generator draws its operands through bounded rejection sampling:
//! draw a candidate, test the constraints, retry up to [`MAX_ATTEMPTS`]
//! times. When the budget runs out the final candidate is returned with
//! `satisfied = false` instead of failing, so generation stays total. Callers
//! may therefore occasionally receive a value that violates its constraint
//! (e.g. a "no carry" pair that carries); this is logged at debug level.

use log::debug;
use rand::Rng;

/// Attempt budget for one constrained draw.
pub const MAX_ATTEMPTS: usize = 100;

/// Outcome of a constrained draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    pub value: T,
    /// `false` when the budget ran out and `value` is the last candidate.
    pub satisfied: bool,
    pub attempts: usize,
}

impl<T> Sample<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Draw until `accept` holds or the attempt budget is spent.
pub fn sample<R, T, D, P>(rng: &mut R, mut draw: D, accept: P) -> Sample<T>
where
    R: Rng + ?Sized,
    D: FnMut(&mut R) -> T,
    P: Fn(&T) -> bool,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        let candidate = draw(rng);
        if accept(&candidate) {
            return Sample { value: candidate, satisfied: true, attempts };
        }
        if attempts >= MAX_ATTEMPTS {
            debug!("sampler: constraint exhausted after {attempts} attempts, keeping last candidate");
            return Sample { value: candidate, satisfied: false, attempts };
        }
    }
}

/// Uniform integer in `lo..=hi`; tolerates reversed bounds.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: i64, hi: i64) -> i64 {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    rng.gen_range(lo..=hi)
}

/// Uniform decimal with exactly `dp` places in `[lo, hi]`.
pub fn uniform_decimal<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    let lo_scaled = (lo.min(hi) * scale).ceil() as i64;
    let hi_scaled = (lo.max(hi) * scale).floor() as i64;
    uniform(rng, lo_scaled, hi_scaled.max(lo_scaled)) as f64 / scale
}

// ── predicates ──────────────────────────────────────────────────────────────

/// Declarative single-value constraints used across topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Must differ from a forbidden value.
    NotEqual(i64),
    /// Adding the value to `other` regroups in at least one column.
    CarryWith(i64),
    /// Adding the value to `other` never regroups.
    NoCarryWith(i64),
    /// Subtracting the value from the given minuend needs a borrow.
    BorrowFrom(i64),
    /// Subtracting the value from the given minuend needs no borrow.
    NoBorrowFrom(i64),
    /// Value plus `other` is strictly greater than `boundary`.
    SumExceeds { other: i64, boundary: i64 },
    /// The digit at 10^place is not zero.
    NonZeroDigitAt(u32),
    /// Has at least this many factor pairs.
    MinFactorPairs(usize),
    MultipleOf(i64),
    NotMultipleOf(i64),
}

impl Constraint {
    pub fn holds(&self, v: i64) -> bool {
        match *self {
            Constraint::NotEqual(x)                  => v != x,
            Constraint::CarryWith(other)             => has_carry(v, other),
            Constraint::NoCarryWith(other)           => !has_carry(v, other),
            Constraint::BorrowFrom(minuend)          => has_borrow(minuend, v),
            Constraint::NoBorrowFrom(minuend)        => !has_borrow(minuend, v),
            Constraint::SumExceeds { other, boundary } => v + other > boundary,
            Constraint::NonZeroDigitAt(place)        => digit_at(v, place) != 0,
            Constraint::MinFactorPairs(n)            => factor_pairs(v).len() >= n,
            Constraint::MultipleOf(m)                => m != 0 && v % m == 0,
            Constraint::NotMultipleOf(m)             => m == 0 || v % m != 0,
        }
    }
}

/// Uniform integer in `range` satisfying every constraint.
pub fn sample_int<R: Rng + ?Sized>(rng: &mut R, range: (i64, i64), constraints: &[Constraint]) -> Sample<i64> {
    sample(
        rng,
        |rng| uniform(rng, range.0, range.1),
        |v| constraints.iter().all(|c| c.holds(*v)),
    )
}

/// `n` values from `range`, sorted ascending, pairwise at least `min_gap` apart.
pub fn sample_increasing<R: Rng + ?Sized>(rng: &mut R, range: (i64, i64), n: usize, min_gap: i64) -> Sample<Vec<i64>> {
    sample(
        rng,
        |rng| {
            let mut values: Vec<i64> = (0..n).map(|_| uniform(rng, range.0, range.1)).collect();
            values.sort_unstable();
            values
        },
        |values| strictly_increasing_with_gap(values, min_gap),
    )
}

pub fn strictly_increasing_with_gap(values: &[i64], min_gap: i64) -> bool {
    values.windows(2).all(|w| w[1] > w[0] && w[1] - w[0] >= min_gap)
}

fn digits(n: i64) -> impl Iterator<Item = i64> {
    let mut n = n.abs();
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let d = n % 10;
        n /= 10;
        done = n == 0;
        Some(d)
    })
}

/// Digit at 10^place (0 = ones).
pub fn digit_at(n: i64, place: u32) -> i64 {
    (n.abs() / 10i64.pow(place)) % 10
}

/// Number of digits in `n` (0 has one digit).
pub fn digit_count(n: i64) -> u32 {
    digits(n).count() as u32
}

/// Columns that regroup when adding `a + b`, counting cascaded carries.
pub fn carry_count(a: i64, b: i64) -> usize {
    let (mut a, mut b) = (a.abs(), b.abs());
    let (mut carry, mut count) = (0, 0);
    while a > 0 || b > 0 {
        let sum = a % 10 + b % 10 + carry;
        carry = if sum >= 10 { 1 } else { 0 };
        count += carry as usize;
        a /= 10;
        b /= 10;
    }
    count
}

pub fn has_carry(a: i64, b: i64) -> bool {
    carry_count(a, b) > 0
}

/// Columns where a subtrahend digit exceeds the minuend digit in `a - b`.
pub fn borrow_count(a: i64, b: i64) -> usize {
    let (mut a, mut b) = (a.abs(), b.abs());
    let mut count = 0;
    while a > 0 || b > 0 {
        if b % 10 > a % 10 {
            count += 1;
        }
        a /= 10;
        b /= 10;
    }
    count
}

pub fn has_borrow(a: i64, b: i64) -> bool {
    borrow_count(a, b) > 0
}

/// Factor pairs `(small, large)` of a positive integer, ascending.
pub fn factor_pairs(n: i64) -> Vec<(i64, i64)> {
    if n <= 0 {
        return Vec::new();
    }
    (1..)
        .take_while(|i| i * i <= n)
        .filter(|i| n % i == 0)
        .map(|i| (i, n / i))
        .collect()
}

pub fn factors(n: i64) -> Vec<i64> {
    let pairs = factor_pairs(n);
    let mut out: Vec<i64> = pairs.iter().map(|p| p.0).collect();
    // A square's root appears on both sides of its pair.
    let large: Vec<i64> = pairs.iter().rev().filter(|p| p.0 != p.1).map(|p| p.1).collect();
    out.extend(large);
    out
}

pub fn is_prime(n: i64) -> bool {
    n >= 2 && factor_pairs(n).len() == 1
}

pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
