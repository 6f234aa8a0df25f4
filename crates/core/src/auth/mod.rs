//! Admin password comparison.

/// Compare a candidate against the stored admin password.
///
/// Runs in time independent of where the first differing byte is.
pub fn passwords_match(candidate: &str, stored: &str) -> bool {
    constant_time_eq(candidate.as_bytes(), stored.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
