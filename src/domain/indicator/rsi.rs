//! RSI (Relative Strength Index) over trailing simple means.
//!
//! gain[i] = max(C[i] - C[i-1], 0), loss[i] = max(C[i-1] - C[i], 0)
//! avg_gain / avg_loss: mean of the last n gains / losses
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n closes are undefined (need n price changes).

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || closes.len() < 2 {
        return vec![None; closes.len()];
    }

    let mut gains: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(closes.len() - 1);

    for w in closes.windows(2) {
        let change = w[1] - w[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = Vec::with_capacity(closes.len());
    values.push(None);

    for i in 1..closes.len() {
        // gains[i - 1] is the change ending at close i
        if i < period {
            values.push(None);
            continue;
        }

        let avg_gain = gains[i - period..i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[i - period..i].iter().sum::<f64>() / period as f64;

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        values.push(Some(rsi));
    }

    values
}
