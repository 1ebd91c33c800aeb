//! Number formatting shared by the report renderers.

/// Formats an integer with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use sf_event_tools::utils::format::format_number;
///
/// assert_eq!(format_number(42), "42");
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
