/// Byte-order mark as it appears once decoded into a `str`.
pub const BOM: char = '\u{feff}';

/// Drop a leading byte-order mark (and any whitespace around it).
pub fn strip_bom(cell: &str) -> &str {
    cell.trim().trim_start_matches(BOM).trim()
}

/// Lines that still hold something after trimming, in order.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').filter(|line| !line.trim().is_empty())
}
