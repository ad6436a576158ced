use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '\u{2026}';

/// Kilobyte count in the largest unit that keeps the value at or above one.
/// Values below a megabyte stay whole kilobytes.
pub fn human_kb(kb: u64) -> String {
    const SCALED: [(u64, &str); 2] = [(1 << 20, "GB"), (1 << 10, "MB")];

    SCALED
        .iter()
        .find(|(per_unit, _)| kb >= *per_unit)
        .map(|&(per_unit, unit)| format!("{:.1} {unit}", kb as f64 / per_unit as f64))
        .unwrap_or_else(|| format!("{kb} KB"))
}

/// Clip `s` to `columns` display columns, marking the cut with an ellipsis.
pub fn fit_columns(s: &str, columns: usize) -> String {
    if s.width() <= columns {
        return s.to_owned();
    }
    let budget = columns.saturating_sub(1);
    let mut used = 0;
    let mut clipped: String = s
        .chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    clipped.push(ELLIPSIS);
    clipped
}
