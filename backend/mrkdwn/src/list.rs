//! List marker text.

use crate::ir::{ListKind, Numbering};

/// Bullets by unordered nesting depth; deeper levels reuse the last one.
const BULLETS: [&str; 3] = ["•", "◦", "▪"];

pub fn bullet(depth: usize) -> &'static str {
    BULLETS[depth.min(BULLETS.len() - 1)]
}

/// Marker for the item numbered `number` in a list of `kind`.
pub fn marker(kind: ListKind, number: i64, depth: usize) -> String {
    match kind {
        ListKind::Unordered => bullet(depth).to_string(),
        ListKind::Ordered { numbering, .. } => format!("{}.", format_number(numbering, number)),
    }
}

/// Largest number with a standard roman form.
const ROMAN_MAX: u64 = 3999;

/// Alphabetic and roman styles have no representation for numbers below one
/// and fall back to decimal, as do roman styles above 3999.
pub fn format_number(numbering: Numbering, number: i64) -> String {
    let n = match u64::try_from(number) {
        Ok(n) if n >= 1 => n,
        _ => return number.to_string(),
    };
    match numbering {
        Numbering::Decimal => n.to_string(),
        Numbering::LowerAlpha => to_alpha(n),
        Numbering::UpperAlpha => to_alpha(n).to_uppercase(),
        Numbering::LowerRoman | Numbering::UpperRoman if n > ROMAN_MAX => n.to_string(),
        Numbering::LowerRoman => to_roman(n),
        Numbering::UpperRoman => to_roman(n).to_uppercase(),
    }
}

/// 1 → a, 26 → z, 27 → aa.
fn to_alpha(n: u64) -> String {
    let mut letters = Vec::new();
    let mut num = n;
    while num > 0 {
        num -= 1;
        letters.push((b'a' + (num % 26) as u8) as char);
        num /= 26;
    }
    letters.iter().rev().collect()
}

fn to_roman(n: u64) -> String {
    const VALUES: [(u64, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut num = n;
    let mut roman = String::new();
    for (value, numeral) in VALUES {
        while num >= value {
            roman.push_str(numeral);
            num -= value;
        }
    }
    roman
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullets_by_depth() {
        assert_eq!(bullet(0), "•");
        assert_eq!(bullet(1), "◦");
        assert_eq!(bullet(2), "▪");
        assert_eq!(bullet(7), "▪");
    }

    #[test]
    fn alpha_numbering() {
        assert_eq!(format_number(Numbering::LowerAlpha, 1), "a");
        assert_eq!(format_number(Numbering::LowerAlpha, 26), "z");
        assert_eq!(format_number(Numbering::LowerAlpha, 27), "aa");
        assert_eq!(format_number(Numbering::UpperAlpha, 28), "AB");
    }

    #[test]
    fn roman_numbering() {
        assert_eq!(format_number(Numbering::LowerRoman, 4), "iv");
        assert_eq!(format_number(Numbering::UpperRoman, 1994), "MCMXCIV");
    }

    #[test]
    fn roman_falls_back_to_decimal_past_3999() {
        assert_eq!(format_number(Numbering::UpperRoman, 3999), "MMMCMXCIX");
        assert_eq!(format_number(Numbering::LowerRoman, 4000), "4000");
        assert_eq!(format_number(Numbering::LowerRoman, 5_000_000), "5000000");
        assert_eq!(format_number(Numbering::LowerRoman, i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn alpha_handles_the_largest_numbers() {
        assert_eq!(format_number(Numbering::LowerAlpha, i64::MAX).len(), 14);
    }

    #[test]
    fn non_positive_numbers_stay_decimal() {
        assert_eq!(format_number(Numbering::LowerRoman, 0), "0");
        assert_eq!(format_number(Numbering::UpperAlpha, -2), "-2");
    }

    #[test]
    fn ordered_marker_has_period() {
        let kind = ListKind::Ordered {
            numbering: Numbering::Decimal,
            start: 1,
        };
        assert_eq!(marker(kind, 12, 0), "12.");
        assert_eq!(marker(ListKind::Unordered, 3, 1), "◦");
    }
}
