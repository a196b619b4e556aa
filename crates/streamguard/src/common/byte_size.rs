const UNITS: [&str; 5] = ["", "K", "M", "G", "T"];

/// Human-readable size with two decimals, e.g. `1.50 MB`.
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size > 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}B", UNITS[unit])
}
