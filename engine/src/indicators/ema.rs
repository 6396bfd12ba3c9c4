// Exponential smoothing shared by MACD and KDJ

/// Smoothing factor for an EMA with the given span: 2 / (span + 1).
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Recursive exponential smoothing seeded with the first value, no warm-up:
/// `y[0] = x[0]`, `y[i] = y[i-1] + alpha * (x[i] - y[i-1])`.
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut results = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for &value in values {
        let smoothed = match previous {
            None => value,
            Some(prev) => (value - prev) * alpha + prev,
        };
        results.push(smoothed);
        previous = Some(smoothed);
    }
    results
}
