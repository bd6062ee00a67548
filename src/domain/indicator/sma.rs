//! Simple moving average.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) closes are undefined.

pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let warmup = period - 1;

    (0..closes.len())
        .map(|i| {
            if i < warmup {
                return None;
            }
            let window = &closes[i + 1 - period..=i];
            Some(window.iter().sum::<f64>() / period as f64)
        })
        .collect()
}
