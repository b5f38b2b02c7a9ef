//! Read-time rating statistics. Nothing here is ever persisted; every
//! listing recomputes from the rating rows it was handed.

/// Arithmetic mean formatted to two decimals. Zero ratings yield `None`,
/// which serializes as an explicit `null` and is distinct from `"0.00"`.
pub fn average(values: &[i16]) -> Option<String> {
    if values.is_empty() {
        return None;
    }

    let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
    let avg = sum as f64 / values.len() as f64;

    Some(format!("{avg:.2}"))
}
