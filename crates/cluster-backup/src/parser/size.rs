use super::ParseError;

const KIB: f64 = 1024.0;

/// Convert a `"<number> <unit>"` size to bytes, the unit being one of `B`, `KiB`, `MiB`
/// or `GiB`.
pub fn convert_size_to_bytes(size: &str) -> Result<f64, ParseError> {
    let parts: Vec<&str> = size.split_whitespace().collect();
    let [value, unit] = parts.as_slice() else {
        return Err(ParseError::InvalidSize(size.to_string()));
    };

    let multiplier = match *unit {
        "B" => 1.0,
        "KiB" => KIB,
        "MiB" => KIB * KIB,
        "GiB" => KIB * KIB * KIB,
        _ => return Err(ParseError::UnknownUnit((*unit).to_string())),
    };

    let value: f64 = value
        .parse()
        .map_err(|e| ParseError::InvalidSizeValue((*value).to_string(), e))?;

    if !value.is_finite() || value < 0.0 {
        return Err(ParseError::InvalidSize(size.to_string()));
    }

    Ok(value * multiplier)
}
