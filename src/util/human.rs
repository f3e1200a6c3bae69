/// Format a raw byte count into a compact human-readable string: "1.5K", "312.7G".
///
/// Scales to the largest unit that keeps the value below 1024. Plain bytes
/// print as a bare integer with no suffix; every scaled unit gets one decimal.
pub fn fmt_size(bytes: u64) -> String {
    const UNITS: [char; 8] = ['K', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

    if bytes < 1024 {
        return bytes.to_string();
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, UNITS[unit])
}
