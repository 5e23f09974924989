use std::fmt::Display;

use sha2::{Digest, Sha256};

const SEPARATOR: &str = "::";

/// Map a tuple of values to a reproducible float in `[0, 1)`.
///
/// The string forms are joined with `::`, hashed with SHA-256, and the first
/// 32 bits of the digest (big-endian) are scaled by `2^-32`. No seed and no
/// clock: the same inputs give the same draw in every process.
pub fn deterministic_float(values: &[&dyn Display]) -> f64 {
    let text = values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    let digest = Sha256::digest(text.as_bytes());
    let prefix = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    f64::from(prefix) / 4_294_967_296.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_reproducible() {
        let first = deterministic_float(&[&"customerid", &"L1"]);
        let second = deterministic_float(&[&"customerid", &"L1"]);
        assert_eq!(first, second);
    }

    #[test]
    fn matches_known_digest_prefix() {
        // sha256("abc") starts with ba7816bf.
        let expected = f64::from(0xba78_16bf_u32) / 4_294_967_296.0;
        assert_eq!(deterministic_float(&[&"abc"]), expected);
    }

    #[test]
    fn joins_values_with_separator() {
        let joined = deterministic_float(&[&"a::b"]);
        let split = deterministic_float(&[&"a", &"b"]);
        assert_eq!(joined, split);
        assert_ne!(deterministic_float(&[&"ab"]), split);
    }

    #[test]
    fn draws_are_roughly_uniform() {
        let draws: Vec<f64> = (0..4000)
            .map(|index| deterministic_float(&[&"name", &index]))
            .collect();

        assert!(draws.iter().all(|value| (0.0..1.0).contains(value)));

        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 0.5).abs() < 0.03, "mean was {mean}");

        let mut buckets = [0usize; 4];
        for value in &draws {
            buckets[(value * 4.0) as usize] += 1;
        }
        for count in buckets {
            assert!((850..=1150).contains(&count), "bucket count {count}");
        }
    }
}
