//! Property-based tests for field arithmetic and codec round-trips
//!
//! proptest drives the algebraic laws of GF(2^8) across the whole input
//! space and hammers the encode/damage/repair cycle with randomly drawn
//! geometry, data, and failure patterns.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use shardec::{repair_stripe, ErasureContext, Galois8};

proptest! {
    // ========================================================================
    // Field algebra
    // ========================================================================

    /// a + b = b + a and a * b = b * a
    #[test]
    fn prop_field_commutative(a in any::<u8>(), b in any::<u8>()) {
        let ga = Galois8::new(a);
        let gb = Galois8::new(b);
        prop_assert_eq!(ga + gb, gb + ga);
        prop_assert_eq!(ga * gb, gb * ga);
    }

    /// (a * b) * c = a * (b * c)
    #[test]
    fn prop_field_multiplication_associative(
        a in any::<u8>(),
        b in any::<u8>(),
        c in any::<u8>(),
    ) {
        let (ga, gb, gc) = (Galois8::new(a), Galois8::new(b), Galois8::new(c));
        prop_assert_eq!((ga * gb) * gc, ga * (gb * gc));
    }

    /// a * (b + c) = a * b + a * c
    #[test]
    fn prop_field_distributive(
        a in any::<u8>(),
        b in any::<u8>(),
        c in any::<u8>(),
    ) {
        let (ga, gb, gc) = (Galois8::new(a), Galois8::new(b), Galois8::new(c));
        prop_assert_eq!(ga * (gb + gc), ga * gb + ga * gc);
    }

    /// Every element is its own additive inverse; every nonzero element
    /// has a multiplicative inverse
    #[test]
    fn prop_field_inverses(a in any::<u8>()) {
        let ga = Galois8::new(a);
        prop_assert_eq!(ga + ga, Galois8::ZERO);

        if a != 0 {
            let inv = Galois8::ONE.checked_div(ga).unwrap();
            prop_assert_eq!(ga * inv, Galois8::ONE);
        }
    }

    /// (a / b) * b = a for every nonzero b
    #[test]
    fn prop_field_division_cancels(a in any::<u8>(), b in 1u8..) {
        let ga = Galois8::new(a);
        let gb = Galois8::new(b);
        let quotient = ga.checked_div(gb).unwrap();
        prop_assert_eq!(quotient * gb, ga);
    }

    // ========================================================================
    // Codec round-trips
    // ========================================================================

    /// Encoding the same data always produces the same parity
    #[test]
    fn prop_parity_is_deterministic(
        n in 2usize..=6,
        m in 2usize..=4,
        shard_len in 1usize..=32,
        seed in any::<u64>(),
    ) {
        let ctx = ErasureContext::new(n, m).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut first = vec![0u8; ctx.stripe_len(shard_len)];
        rng.fill_bytes(&mut first[..n * shard_len]);
        let mut second = first.clone();
        second[n * shard_len..].fill(0xFF);

        ctx.encode(&mut first, shard_len).unwrap();
        ctx.encode(&mut second, shard_len).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Any failure pattern the parity budget covers is fully recoverable
    #[test]
    fn prop_encode_damage_repair_round_trip(
        n in 2usize..=8,
        m in 2usize..=5,
        shard_len in 1usize..=48,
        fail_seed in any::<u64>(),
    ) {
        let ctx = ErasureContext::new(n, m).unwrap();
        let total = n + m;
        let mut rng = StdRng::seed_from_u64(fail_seed);

        let mut buf = vec![0u8; ctx.stripe_len(shard_len)];
        rng.fill_bytes(&mut buf[..n * shard_len]);
        ctx.encode(&mut buf, shard_len).unwrap();
        let pristine = buf.clone();

        // Draw a failure set of size <= m
        let fail_count = rng.gen_range(0..=m);
        let mut indices: Vec<usize> = (0..total).collect();
        for i in 0..total {
            let j = rng.gen_range(i..total);
            indices.swap(i, j);
        }
        let failed: Vec<usize> = indices[..fail_count].to_vec();
        for &f in &failed {
            buf[f * shard_len..(f + 1) * shard_len].fill(0);
        }

        repair_stripe(&ctx, &mut buf, shard_len, &failed).unwrap();
        prop_assert_eq!(
            &buf[..n * shard_len],
            &pristine[..n * shard_len],
            "failed={:?}", failed
        );
    }
}
