/// Rounds to a whole number and groups thousands with commas.
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
	grouped.push('-');
    }
    for (i,c) in digits.chars().enumerate() {
	if i > 0 && (digits.len() - i) % 3 == 0 {
	    grouped.push(',');
	}
	grouped.push(c);
    }
    grouped
}

/// Exactly two decimals.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}", value)
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn groups_thousands() {
	assert_eq!(format_count(0.0), "0");
	assert_eq!(format_count(999.0), "999");
	assert_eq!(format_count(1000.0), "1,000");
	assert_eq!(format_count(83_166_711.0), "83,166,711");
	assert_eq!(format_count(1_234_567.4), "1,234,567");
	assert_eq!(format_count(99.5), "100");
	assert_eq!(format_count(-1234.0), "-1,234");
	assert_eq!(format_count(-0.2), "0");
    }

    #[test]
    fn two_decimal_percentages() {
	assert_eq!(format_percent(3.14159), "3.14");
	assert_eq!(format_percent(50.0), "50.00");
	assert_eq!(format_percent(0.005_1), "0.01");
    }

}
