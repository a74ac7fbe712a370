use regex::Regex;
use std::sync::LazyLock;

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.,]").unwrap());
static DECIMAL_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",([0-9]{2})$").unwrap());
static FLOAT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*(?:\.[0-9]*)?").unwrap());

/// Extracts a positive amount from displayed price text.
///
/// Handles `$19.99`, `€19,99`, `£1,299.00`, `₹1,999.00`, `1.999,00 €` and
/// similar. Anything that does not yield a finite amount above zero is not
/// a price.
pub fn parse_price(text: &str) -> Option<f64> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }

    let prefix = FLOAT_PREFIX.find(&normalized)?.as_str();
    let value: f64 = prefix.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

fn normalize(text: &str) -> String {
    let cleaned = NON_NUMERIC.replace_all(text, "");
    let ungrouped = strip_grouping_commas(&cleaned);

    // 歐式小數逗號: "1.999,00" -> "1999.00"
    match DECIMAL_COMMA.find(&ungrouped) {
        Some(m) => {
            let head: String = ungrouped[..m.start()]
                .chars()
                .filter(|c| *c != '.')
                .collect();
            format!("{}.{}", head, &ungrouped[m.start() + 1..])
        }
        None => ungrouped,
    }
}

/// Drops commas used as thousands separators: a digit, a comma, then exactly
/// three digits.
fn strip_grouping_commas(cleaned: &str) -> String {
    let bytes = cleaned.as_bytes();
    cleaned
        .char_indices()
        .filter(|&(i, c)| !(c == ',' && is_grouping_comma(bytes, i)))
        .map(|(_, c)| c)
        .collect()
}

fn is_grouping_comma(bytes: &[u8], at: usize) -> bool {
    let after_digit = at > 0 && bytes[at - 1].is_ascii_digit();
    let three_digits = bytes
        .get(at + 1..at + 4)
        .is_some_and(|group| group.iter().all(u8::is_ascii_digit));
    let group_closed = bytes.get(at + 4).map_or(true, |b| !b.is_ascii_digit());
    after_digit && three_digits && group_closed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_formats() {
        assert_eq!(parse_price("$19.99"), Some(19.99));
        assert_eq!(parse_price("€1,234.56"), Some(1234.56));
        assert_eq!(parse_price("£0.50"), Some(0.5));
        assert_eq!(parse_price("₹1,999.00"), Some(1999.0));
        assert_eq!(parse_price("  $24.00  "), Some(24.0));
    }

    #[test]
    fn test_parse_european_decimal_comma() {
        assert_eq!(parse_price("€19,99"), Some(19.99));
        assert_eq!(parse_price("1.999,00 €"), Some(1999.0));
        assert_eq!(parse_price("12.345.678,90"), Some(12345678.9));
        // without a decimal comma the float prefix stops at the second period
        assert_eq!(parse_price("1.234.567"), Some(1.234));
    }

    #[test]
    fn test_parse_multiple_thousands_groups() {
        assert_eq!(parse_price("$1,234,567.89"), Some(1234567.89));
        assert_eq!(parse_price("$50,000.00"), Some(50000.0));
    }

    #[test]
    fn test_ambiguous_grouping_keeps_comma() {
        // four digits after the comma is not a thousands group
        assert_eq!(parse_price("12,3456"), Some(12.0));
        // a bare three-digit group is read as thousands
        assert_eq!(parse_price("1,234"), Some(1234.0));
    }

    #[test]
    fn test_rejects_non_prices() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("$"), None);
        assert_eq!(parse_price("Free"), None);
        assert_eq!(parse_price("$0.00"), None);
        assert_eq!(parse_price("."), None);
        assert_eq!(parse_price(",5"), None);
    }

    #[test]
    fn test_negative_sign_is_stripped() {
        // only digits and separators survive the cleanup
        assert_eq!(parse_price("-$5.00"), Some(5.0));
        assert_eq!(parse_price("-0"), None);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = parse_price("US$ 2,499.95");
        let second = parse_price("US$ 2,499.95");
        assert_eq!(first, Some(2499.95));
        assert_eq!(first, second);
    }
}
