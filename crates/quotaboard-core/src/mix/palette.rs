//! Stable, spread-out color assignment for composition bars.

use crate::paint::Color;

/// Fixed palette, ordered so neighbours are perceptually close hues
pub const PALETTE: &[Color] = &[
    Color::Rgb(230, 85, 75),
    Color::Rgb(240, 140, 60),
    Color::Rgb(240, 200, 70),
    Color::Rgb(170, 210, 80),
    Color::Rgb(90, 190, 100),
    Color::Rgb(60, 190, 160),
    Color::Rgb(70, 180, 220),
    Color::Rgb(80, 130, 230),
    Color::Rgb(130, 110, 230),
    Color::Rgb(180, 100, 220),
    Color::Rgb(225, 95, 170),
    Color::Rgb(160, 160, 160),
];

/// 64-bit FNV-1a; stable across runs and platforms
pub fn stable_hash(parts: &[&str]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            // Separator so ("ab", "c") and ("a", "bc") differ
            hash ^= 0xff;
            hash = hash.wrapping_mul(PRIME);
        }
        for byte in part.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(PRIME);
        }
    }
    hash
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Step between consecutive entries: the value coprime with `size` closest
/// to `size / 2`, so every palette slot is visited before any repeats
pub fn stride(size: usize) -> usize {
    if size <= 2 {
        return 1;
    }
    let half = size / 2;
    (0..half)
        .flat_map(|d| [half - d, half + d + 1])
        .find(|&s| s > 0 && s < size && gcd(s, size) == 1)
        .unwrap_or(1)
}

/// Circular distance between two palette slots
pub fn circular_distance(a: usize, b: usize, size: usize) -> usize {
    let d = a.abs_diff(b) % size.max(1);
    d.min(size - d)
}

/// Palette index of the `position`-th entry for a `(dimension, account)` pair
pub fn palette_index(dimension: &str, account_id: &str, position: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    let base = (stable_hash(&[dimension, account_id]) % size as u64) as usize;
    (base + position * stride(size)) % size
}

/// Color of the `position`-th visible entry
pub fn mix_color(dimension: &str, account_id: &str, position: usize) -> Color {
    PALETTE[palette_index(dimension, account_id, position, PALETTE.len())]
}

/// Color for a single named thing (provider, account)
pub fn name_color(name: &str) -> Color {
    PALETTE[(stable_hash(&[name]) % PALETTE.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_stable_hash_is_stable() {
        assert_eq!(stable_hash(&["model", "acct"]), stable_hash(&["model", "acct"]));
        assert_ne!(stable_hash(&["ab", "c"]), stable_hash(&["a", "bc"]));
        // FNV-1a reference value for the empty input
        assert_eq!(stable_hash(&[]), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn test_stride_is_coprime_and_wide() {
        assert_eq!(stride(12), 7);
        assert_eq!(stride(7), 3);
        assert_eq!(stride(2), 1);
        for size in 3..40 {
            let s = stride(size);
            assert_eq!(gcd(s, size), 1, "size {}", size);
        }
    }

    #[test]
    fn test_consecutive_entries_are_far_apart() {
        let size = PALETTE.len();
        let min = {
            let s = stride(size);
            s.min(size - s)
        };
        for position in 0..size {
            let a = palette_index("model", "acct", position, size);
            let b = palette_index("model", "acct", position + 1, size);
            assert!(circular_distance(a, b, size) >= min);
            assert!(circular_distance(a, b, size) >= 2);
        }
    }

    #[test]
    fn test_full_cycle_visits_every_slot() {
        let size = PALETTE.len();
        let seen: HashSet<usize> = (0..size)
            .map(|p| palette_index("client", "work", p, size))
            .collect();
        assert_eq!(seen.len(), size);
    }

    #[test]
    fn test_circular_distance() {
        assert_eq!(circular_distance(0, 11, 12), 1);
        assert_eq!(circular_distance(2, 8, 12), 6);
        assert_eq!(circular_distance(3, 3, 12), 0);
    }
}
