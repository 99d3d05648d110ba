//! SI-prefixed quantity formatting for reports and plot labels.
//!
//! Pure presentation: no bearing on internal numeric state.

/// The prefix ladder at decade boundaries, smallest to largest.
const PREFIXES: [(&str, f64); 8] = [
    ("p", 1e-12),
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("", 1e0),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
];

/// Render a raw value with the SI prefix whose decade it falls in, e.g.
/// `format_quantity(6.6e-3, "W", 3)` → `"6.6mW"`. Values outside the
/// 1e-12..1e9 ladder clamp to the smallest/largest prefix. `decimals` bounds
/// the fractional digits; trailing zeros are trimmed.
pub fn format_quantity(value: f64, unit: &str, decimals: usize) -> String {
    let (prefix, scale) = pick_prefix(value);
    let scaled = value / scale;
    let rendered = trim_zeros(format!("{scaled:.decimals$}"));
    format!("{rendered}{prefix}{unit}")
}

fn pick_prefix(value: f64) -> (&'static str, f64) {
    let (first, last) = (PREFIXES[0], PREFIXES[PREFIXES.len() - 1]);
    if value < first.1 {
        return first;
    }
    if value > last.1 {
        return last;
    }
    for window in PREFIXES.windows(2) {
        if window[0].1 <= value && value < window[1].1 {
            return window[0];
        }
    }
    last
}

fn trim_zeros(rendered: String) -> String {
    if !rendered.contains('.') {
        return rendered;
    }
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(6.6e-3, "W", 3, "6.6mW")]
    #[case(19.8e-3, "W", 3, "19.8mW")]
    #[case(5.5e-9, "A", 2, "5.5nA")]
    #[case(1.0, "W", 1, "1W")]
    #[case(2.5e3, "W", 1, "2.5kW")]
    #[case(4.2e7, "Hz", 2, "42MHz")]
    fn test_prefix_selection(
        #[case] value: f64,
        #[case] unit: &str,
        #[case] decimals: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(format_quantity(value, unit, decimals), expected);
    }

    #[test]
    fn test_clamps_below_ladder() {
        // 1e-15 W clamps to the pico prefix.
        assert_eq!(format_quantity(1e-15, "W", 3), "0.001pW");
    }

    #[test]
    fn test_clamps_above_ladder() {
        assert_eq!(format_quantity(5e12, "W", 0), "5000GW");
    }

    #[test]
    fn test_decade_boundaries() {
        assert_eq!(format_quantity(1e-3, "W", 1), "1mW");
        assert_eq!(format_quantity(0.999e-3, "W", 0), "999uW");
    }
}
