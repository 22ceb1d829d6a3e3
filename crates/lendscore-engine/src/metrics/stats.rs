pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1).
pub(crate) fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let center = mean(values)?;
    let variance = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::{mean, round1, round2, sample_std_dev};

    #[test]
    fn rounding_and_spread() {
        assert!((round1(33.333) - 33.3).abs() < 1e-9);
        assert!((round2(166.666) - 166.67).abs() < 1e-9);
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std_dev(&[5.0]), None);
        let spread = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(spread.is_some_and(|value| (value - 2.138_089_935).abs() < 1e-6));
    }
}
