//! Display formatting helpers shared by the wizard views and the CLI

/// Truncate a string to at most `max_bytes` bytes, ensuring the cut lands on a
/// valid UTF-8 char boundary. Returns the longest prefix that fits.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Shorten a wallet address to `prefix...suffix`.
/// Addresses that already fit are returned unchanged.
pub fn format_wallet_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= prefix_len + suffix_len {
        return address.to_string();
    }
    let head: String = chars[..prefix_len].iter().collect();
    let tail: String = chars[chars.len() - suffix_len..].iter().collect();
    format!("{}...{}", head, tail)
}

/// [`format_wallet_address`] with the 6 + 4 split used across the UI
pub fn short_address(address: &str) -> String {
    format_wallet_address(address, 6, 4)
}

/// Group the integer part with commas and keep at most `max_fraction`
/// decimals, dropping trailing zeros (`1234567.5` -> `1,234,567.5`).
pub fn format_grouped(value: f64, max_fraction: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// US-dollar amount with two decimals (`-1234.5` -> `-$1,234.50`)
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return String::new();
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", amount.abs());
    let (int_part, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let whole: f64 = int_part.parse().unwrap_or(0.0);
    format!("{}${}.{}", sign, format_grouped(whole, 0), frac)
}

/// Abbreviate with K/M/B/T (`1_500_000.0` -> `1.5M`)
pub fn format_large_number(num: f64, decimals: usize) -> String {
    const UNITS: [&str; 5] = ["", "K", "M", "B", "T"];

    if num == 0.0 {
        return "0".to_string();
    }
    if !num.is_finite() {
        return String::new();
    }

    let sign = if num < 0.0 { "-" } else { "" };
    let abs = num.abs();
    if abs < 1000.0 {
        return format!("{}{}", sign, trim_zero_fraction(&format!("{:.*}", decimals, abs)));
    }

    let unit = ((abs.log10() / 3.0).floor() as usize).min(UNITS.len() - 1);
    let scaled = abs / 1000f64.powi(unit as i32);
    format!(
        "{}{}{}",
        sign,
        trim_zero_fraction(&format!("{:.*}", decimals, scaled)),
        UNITS[unit]
    )
}

fn trim_zero_fraction(s: &str) -> &str {
    match s.split_once('.') {
        Some((int_part, frac)) if frac.chars().all(|c| c == '0') => int_part,
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_multibyte_boundary() {
        let s = "abc█def";
        assert_eq!(truncate_str(s, 3), "abc");
        assert_eq!(truncate_str(s, 4), "abc");
        assert_eq!(truncate_str(s, 6), "abc█");
        assert_eq!(truncate_str("", 5), "");
    }

    #[test]
    fn test_format_wallet_address() {
        assert_eq!(
            short_address("0xABCDEF0123456789ABCDEF0123456789ABCD1234"),
            "0xABCD...1234"
        );
        assert_eq!(short_address("0x12345678"), "0x12345678");
        assert_eq!(format_wallet_address("PhAAAABBBBCCCC", 4, 2), "PhAA...CC");
        assert_eq!(short_address(""), "");
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(1_000_000.0, 3), "1,000,000");
        assert_eq!(format_grouped(500_000.0, 3), "500,000");
        assert_eq!(format_grouped(1234.5, 3), "1,234.5");
        assert_eq!(format_grouped(0.1234567, 3), "0.123");
        assert_eq!(format_grouped(999.0, 0), "999");
        assert_eq!(format_grouped(-12345.0, 0), "-12,345");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-42.0), "-$42.00");
        assert_eq!(format_currency(f64::NAN), "");
    }

    #[test]
    fn test_format_large_number() {
        assert_eq!(format_large_number(0.0, 1), "0");
        assert_eq!(format_large_number(999.0, 1), "999");
        assert_eq!(format_large_number(1500.0, 1), "1.5K");
        assert_eq!(format_large_number(1_000_000.0, 1), "1M");
        assert_eq!(format_large_number(2_500_000_000.0, 1), "2.5B");
        assert_eq!(format_large_number(-3_000_000_000_000.0, 1), "-3T");
    }
}
