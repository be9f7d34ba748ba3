use kvforge_compression::{compress, fuse};
use kvforge_core::Cache;
use proptest::prelude::*;

fn arb_cache(max_rows: usize) -> impl Strategy<Value = Cache> {
    (0..=max_rows, 1usize..6).prop_flat_map(|(rows, dim)| {
        prop::collection::vec(prop::collection::vec(-100.0f32..100.0, dim), rows).prop_map(Cache::new)
    })
}

// ── spectral truncation ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn short_caches_pass_through(cache in arb_cache(12), extra in 0usize..5, ratio in 0.0f64..1.0) {
        let sink = cache.len() + extra;
        let out = compress(&cache, sink, ratio).unwrap();
        prop_assert_eq!(out, cache);
    }

    #[test]
    fn sink_prefix_is_bit_identical(cache in arb_cache(40), sink in 0usize..10, ratio in 0.01f64..=1.0) {
        let out = compress(&cache, sink, ratio).unwrap();
        let k = sink.min(cache.len());
        for i in 0..k {
            let a: Vec<u32> = cache[i].iter().map(|x| x.to_bits()).collect();
            let b: Vec<u32> = out[i].iter().map(|x| x.to_bits()).collect();
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn spectral_length_formula(cache in arb_cache(40), sink in 0usize..10, ratio in 0.01f64..=1.0) {
        prop_assume!(sink < cache.len());
        let out = compress(&cache, sink, ratio).unwrap();
        let expected = sink + ((cache.len() - sink) as f64 * ratio).floor() as usize;
        prop_assert_eq!(out.len(), expected);
        prop_assert!(out.len() <= cache.len());
    }

    #[test]
    fn spectral_preserves_dimension(cache in arb_cache(30), sink in 0usize..5, ratio in 0.0f64..=1.0) {
        let out = compress(&cache, sink, ratio).unwrap();
        let dim = cache.dimension();
        prop_assert!(out.iter().all(|t| Some(t.len()) == dim));
    }
}

// ── window fusion ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn fuse_output_is_bounded(cache in arb_cache(60), target in 0usize..80, kernel in 1usize..12) {
        let out = fuse(&cache, 0.5, kernel, Some(target)).unwrap();
        prop_assert!(out.len() <= cache.len());
        prop_assert!(out.len() >= cache.len().min(target));
        if cache.len() <= target {
            prop_assert_eq!(out, cache);
        }
    }

    #[test]
    fn fuse_ratio_length(cache in arb_cache(80), ratio in 0.0f64..1.0, kernel in 1usize..12) {
        let expected = std::cmp::max(1, (cache.len() as f64 * ratio).floor() as usize);
        prop_assume!(expected < cache.len());
        let out = fuse(&cache, ratio, kernel, None).unwrap();
        prop_assert_eq!(out.len(), expected);
    }

    #[test]
    fn fuse_preserves_dimension(cache in arb_cache(50), ratio in 0.0f64..1.5, kernel in 1usize..9) {
        let out = fuse(&cache, ratio, kernel, None).unwrap();
        let dim = cache.dimension();
        prop_assert!(out.iter().all(|t| Some(t.len()) == dim));
    }

    #[test]
    fn fuse_is_deterministic(cache in arb_cache(50), ratio in 0.0f64..1.0, kernel in 1usize..9) {
        let a = fuse(&cache, ratio, kernel, None).unwrap();
        let b = fuse(&cache, ratio, kernel, None).unwrap();
        prop_assert_eq!(a, b);
    }
}
