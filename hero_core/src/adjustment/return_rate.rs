//! How long an adjustment lasts before its points fade

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const MONTH: f64 = 2.628e6;
const YEAR: f64 = 3.154e7;

/// Seconds before a DELAYEDRETURNRATE option fades, `None` if unknown
pub fn return_seconds(option: &str) -> Option<f64> {
    let seconds = match option.to_ascii_uppercase().as_str() {
        "MINUTE" => MINUTE,
        "FIVEMINUTES" => 5.0 * MINUTE,
        "20MINUTES" => 20.0 * MINUTE,
        "HOUR" => HOUR,
        "6HOURS" => 6.0 * HOUR,
        "DAY" => DAY,
        "WEEK" => 7.0 * DAY,
        "MONTH" => MONTH,
        "SEASON" => 3.0 * MONTH,
        "YEAR" => YEAR,
        "FIVEYEARS" => 5.0 * YEAR,
        "TWENTYFIVEYEARS" => 25.0 * YEAR,
        "CENTURY" => 100.0 * YEAR,
        _ => return None,
    };
    Some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_options() {
        assert_eq!(return_seconds("MINUTE"), Some(60.0));
        assert_eq!(return_seconds("20MINUTES"), Some(1200.0));
        assert_eq!(return_seconds("week"), Some(604_800.0));
        assert_eq!(return_seconds("SEASON"), Some(7.884e6));
        assert_eq!(return_seconds("CENTURY"), Some(3.154e9));
    }

    #[test]
    fn test_unknown_option() {
        assert_eq!(return_seconds("FORTNIGHT"), None);
    }
}
