use scraper::ElementRef;

use super::{DECIMAL_SEPARATOR, THOUSANDS_SEPARATOR};

/// Raw cell content: every descendant text node concatenated, nested wrappers included.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Collapses whitespace runs (newlines included) to one space and trims.
pub(crate) fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// `"33.400"` -> `Some(33400)`. `None` means unparseable, which is distinct from `Some(0)`.
///
/// The document writes `.` as thousands separator and `,` as decimal separator; a
/// fractional part is truncated, never rounded.
pub(crate) fn parse_fiscal_value(text: &str) -> Option<i64> {
    let without_thousands = text.replace(THOUSANDS_SEPARATOR, "");
    let trimmed = without_thousands.trim();
    let integral = match trimmed.split_once(DECIMAL_SEPARATOR) {
        Some((whole, fraction)) => {
            if !fraction.trim().chars().all(|ch| ch.is_ascii_digit()) {
                return None;
            }
            whole.trim()
        }
        None => trimmed,
    };

    if integral.is_empty() || integral == "-" {
        return None;
    }

    integral.parse::<i64>().ok()
}

/// Power rating; a missing or malformed cell is `0`, never a reason to drop the row.
pub(crate) fn parse_power(text: &str) -> i64 {
    text.trim().parse::<i64>().unwrap_or(0)
}
