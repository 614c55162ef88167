//! Prime capacity helpers shared by both map implementations

/// Returns true if `n` is prime.
///
/// Trial division by odd factors up to the square root of `n`.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn is_prime(n: usize) -> bool {
    if n == 2 || n == 3 {
        return true;
    }
    if n < 2 || n % 2 == 0 {
        return false;
    }

    let mut factor: usize = 3;
    // `factor <= n / factor` is `factor * factor <= n` without the overflow
    while factor <= n / factor {
        if n % factor == 0 {
            return false;
        }
        factor = factor.saturating_add(2);
    }
    true
}

/// Returns the smallest prime at or above `n`, bumping even inputs to `n + 1` first.
///
/// Because of the bump `next_prime(2)` is 3, not 2.
///
/// # Panics
///
/// Panics with a capacity overflow if no such prime fits in `usize`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn next_prime(n: usize) -> usize {
    let mut candidate = if n % 2 == 0 { n.checked_add(1) } else { Some(n) };
    while let Some(current) = candidate.filter(|&current| !is_prime(current)) {
        candidate = current.checked_add(2);
    }
    candidate.expect("capacity overflow: no prime at or above the target fits in usize")
}

/// Capacity a resize should use for the requested target.
///
/// Targets that are already prime are kept as they are.
///
/// # Panics
///
/// Panics with a capacity overflow if the target is not prime and no prime
/// above it fits in `usize`.
#[must_use]
pub fn prime_target(requested: usize) -> usize {
    if is_prime(requested) { requested } else { next_prime(requested) }
}
