//! Simulated CPU-heavy work for backend processes.

/// Burn CPU for roughly `n` iterations.
///
/// Deterministic for a given `n`, so two backends given the same work size
/// produce the same value.
pub fn heavy_computation(n: u64) -> f64 {
    let mut result = 0.0;
    for i in 1..n {
        let x = i as f64;
        result += x.sqrt() * (x + 1.0).ln() * x.powi(2);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(heavy_computation(10_000), heavy_computation(10_000));
    }

    #[test]
    fn test_grows_with_work_size() {
        assert!(heavy_computation(20_000) > heavy_computation(10_000));
    }

    #[test]
    fn test_trivial_sizes() {
        assert_eq!(heavy_computation(0), 0.0);
        assert_eq!(heavy_computation(1), 0.0);
    }
}
