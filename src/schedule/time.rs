//! `HH:MM` arithmetic for scheduled departure/arrival times.
//!
//! Times carry no date or timezone. A duration whose arrival is not after the
//! departure wraps past midnight, so identical STD/STA is a full 24 hours.

use chrono::{NaiveTime, Timelike};

use crate::error::{Error, Result};

pub const MINUTES_PER_DAY: i32 = 1440;

/// Parse a zero-padded `HH:MM` string into minutes since midnight.
pub fn parse_time(hhmm: &str) -> Result<i32> {
    let bytes = hhmm.as_bytes();
    let well_shaped = bytes.len() == 5
        && bytes[2] == b':'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit);
    if !well_shaped {
        return Err(Error::InvalidTime(hhmm.to_string()));
    }
    let t = NaiveTime::parse_from_str(hhmm, "%H:%M")
        .map_err(|_| Error::InvalidTime(hhmm.to_string()))?;
    Ok((t.hour() * 60 + t.minute()) as i32)
}

/// Block minutes from `std` to `sta`.
pub fn duration(std: &str, sta: &str) -> Result<i32> {
    let start = parse_time(std)?;
    let mut end = parse_time(sta)?;
    if end <= start {
        end += MINUTES_PER_DAY;
    }
    Ok(end - start)
}

/// Format minutes as `HH:MM`, wrapping any value into a single day.
pub fn format_time(minutes: i32) -> String {
    let m = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Move a time by `delta` minutes, wrapping around midnight.
pub fn shift_time(hhmm: &str, delta: i32) -> Result<String> {
    Ok(format_time(parse_time(hhmm)? + delta))
}

/// Normalized `[start, end)` of a flight in minutes, `end` extended past 1440
/// for overnight rotations.
pub fn interval(std: &str, sta: &str) -> Result<(i32, i32)> {
    let start = parse_time(std)?;
    Ok((start, start + duration(std, sta)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("00:00").unwrap(), 0);
        assert_eq!(parse_time("14:30").unwrap(), 870);
        assert_eq!(parse_time("23:59").unwrap(), 1439);
    }

    #[test]
    fn test_parse_time_rejects_malformed() {
        for bad in ["", "9:05", "24:00", "12:60", "12-30", "ab:cd", "12:300", " 12:30"] {
            assert!(
                matches!(parse_time(bad), Err(Error::InvalidTime(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_duration_same_day() {
        assert_eq!(duration("10:00", "11:30").unwrap(), 90);
    }

    #[test]
    fn test_duration_wraps_overnight() {
        assert_eq!(duration("22:00", "02:00").unwrap(), 240);
        assert_eq!(duration("23:30", "00:45").unwrap(), 75);
    }

    #[test]
    fn test_duration_overnight_formula_holds_for_every_hour_pair() {
        for s in 1..24 {
            for a in 0..s {
                let std = format!("{s:02}:00");
                let sta = format!("{a:02}:00");
                let d = duration(&std, &sta).unwrap();
                let expected = (MINUTES_PER_DAY - parse_time(&std).unwrap()) + parse_time(&sta).unwrap();
                assert_eq!(d, expected);
                assert!((0..MINUTES_PER_DAY).contains(&d));
            }
        }
    }

    #[test]
    fn test_equal_times_are_a_full_day() {
        assert_eq!(duration("00:00", "00:00").unwrap(), 1440);
        assert_eq!(duration("13:15", "13:15").unwrap(), 1440);
    }

    #[test]
    fn test_format_time_wraps_negative_and_large_values() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(-30), "23:30");
        assert_eq!(format_time(1440 + 75), "01:15");
        assert_eq!(format_time(-1440 * 2 - 1), "23:59");
    }

    #[test]
    fn test_format_parse_round_trip_every_minute() {
        for m in 0..MINUTES_PER_DAY {
            let t = format_time(m);
            assert_eq!(format_time(parse_time(&t).unwrap()), t);
        }
    }

    #[test]
    fn test_shift_time() {
        assert_eq!(shift_time("10:00", 120).unwrap(), "12:00");
        assert_eq!(shift_time("00:30", -45).unwrap(), "23:45");
        assert!(shift_time("1000", 5).is_err());
    }

    #[test]
    fn test_interval_extends_overnight_end() {
        assert_eq!(interval("23:30", "00:45").unwrap(), (1410, 1485));
        assert_eq!(interval("08:00", "09:00").unwrap(), (480, 540));
    }
}
