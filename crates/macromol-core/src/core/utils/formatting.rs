/// Formats a number for a fixed-width PDB column.
///
/// The value is rounded to `decimals` places and printed with at most that many fractional
/// digits (trailing zeros dropped). A magnitude of at least 10⁶ or a zero fractional part is
/// printed as `<integer>.0`, which also covers rounding that carries into the integer part.
/// The result is left-justified in `width` characters, and an absent value is `width` spaces.
pub fn format_number(value: Option<f64>, width: usize, decimals: usize) -> String {
    let Some(value) = value else {
        return " ".repeat(width);
    };
    let text = number_text(value, decimals);
    format!("{:<width$}", text, width = width)
}

fn number_text(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0.0".to_string();
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.abs() >= 1e6 || rounded.fract() == 0.0 {
        return format!("{}.0", integer_part(rounded));
    }
    let fixed = format!("{:.*}", decimals, rounded);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn integer_part(value: f64) -> String {
    let truncated = value.trunc();
    if truncated == 0.0 && value.is_sign_negative() {
        "-0".to_string()
    } else {
        format!("{:.0}", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_become_blank_fields() {
        assert_eq!(format_number(None, 8, 3), "        ");
        assert_eq!(format_number(None, 6, 2), "      ");
    }

    #[test]
    fn coordinates_are_rounded_and_left_justified() {
        assert_eq!(format_number(Some(12.681), 8, 3), "12.681  ");
        assert_eq!(format_number(Some(-25.2114), 8, 3), "-25.211 ");
        assert_eq!(format_number(Some(15.56), 6, 2), "15.56 ");
    }

    #[test]
    fn trailing_zeros_are_dropped() {
        assert_eq!(format_number(Some(1.5), 6, 2), "1.5   ");
        assert_eq!(format_number(Some(0.25), 6, 3), "0.25  ");
    }

    #[test]
    fn whole_numbers_keep_a_single_zero_fraction() {
        assert_eq!(format_number(Some(1.0), 6, 2), "1.0   ");
        assert_eq!(format_number(Some(-3.0), 8, 3), "-3.0    ");
        assert_eq!(format_number(Some(0.0), 6, 2), "0.0   ");
    }

    #[test]
    fn rounding_carry_increments_integer_part() {
        assert_eq!(format_number(Some(0.9996), 8, 3), "1.0     ");
        assert_eq!(format_number(Some(9.9999), 8, 3), "10.0    ");
        assert_eq!(format_number(Some(-1.99999), 8, 3), "-2.0    ");
    }

    #[test]
    fn large_magnitudes_drop_the_fraction() {
        assert_eq!(format_number(Some(1234567.891), 8, 3), "1234567.0");
        assert_eq!(format_number(Some(-2.0e7), 8, 3), "-20000000.0");
    }

    #[test]
    fn tiny_values_never_use_scientific_notation() {
        assert_eq!(format_number(Some(1e-9), 8, 3), "0.0     ");
        assert_eq!(format_number(Some(0.0004), 8, 3), "0.0     ");
    }
}
