pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// `part` as a percentage of `total`, or 0 when nothing was counted
pub fn percentage(part: u32, total: u32) -> f64 {
    match total {
        0 => 0.0,
        _ => (part as f64 / total as f64) * 100.0,
    }
}
