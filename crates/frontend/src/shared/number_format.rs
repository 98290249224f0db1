//! pt-BR number formatting for tables, cards and chart labels

/// Formats with `.` as thousands separator and `,` as decimal separator
///
/// # Examples
///
/// ```
/// use frontend::shared::number_format::format_number_with_decimals;
/// assert_eq!(format_number_with_decimals(1234.567, 2), "1.234,57");
/// ```
pub fn format_number_with_decimals(value: f64, decimals: u8) -> String {
    let decimals = decimals.min(6) as usize;
    let formatted = format!("{:.*}", decimals, value);

    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    // "-0" after rounding
    let is_zero = digits.bytes().all(|b| b == b'0')
        && decimal_part.map_or(true, |d| d.bytes().all(|b| b == b'0'));
    let sign = if is_zero { "" } else { sign };

    match decimal_part {
        Some(d) => format!("{}{},{}", sign, grouped, d),
        None => format!("{}{}", sign, grouped),
    }
}

/// Grouped integer, e.g. `1.234.567`
pub fn format_number_int(value: f64) -> String {
    format_number_with_decimals(value, 0)
}

/// `R$ 1.234,56`
pub fn format_money(value: f64) -> String {
    format!("R$ {}", format_number_with_decimals(value, 2))
}

/// `R$ 1.235`, used for chart value labels
pub fn format_money_whole(value: f64) -> String {
    format!("R$ {}", format_number_with_decimals(value, 0))
}

/// Share of `total` with one decimal and a dot separator, `0%` when either side is zero
pub fn format_share(value: f64, total: f64) -> String {
    if total == 0.0 || value == 0.0 {
        return "0%".to_string();
    }
    format!("{:.1}%", value * 100.0 / total)
}
