//! Return-series feature text fed to the classifier.

/// Prefix of every encoded feature.
pub const FEATURE_PREFIX: &str = "Price movements: ";

/// Simple returns over a close window: `r[0] = 0`, `r[i] = c[i]/c[i-1] - 1`.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    for (i, &close) in closes.iter().enumerate() {
        if i == 0 {
            out.push(0.0);
        } else {
            out.push(close / closes[i - 1] - 1.0);
        }
    }
    out
}

/// `"Price movements: "` followed by each return with 4 decimals.
pub fn encode_feature(returns: &[f64]) -> String {
    let body: Vec<String> = returns.iter().map(|r| format!("{r:.4}")).collect();
    format!("{FEATURE_PREFIX}{}", body.join(" "))
}
