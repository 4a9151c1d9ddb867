use chrono::{DateTime, Utc};

/// GPS epoch start (1980-01-06T00:00:00Z) as a unix timestamp.
pub const GPS_EPOCH_UNIX_S: i64 = 315_964_800;

/// Seconds in one GPS week.
pub const SECONDS_IN_WEEK: u32 = 604_800;

/// Convert GPS week + seconds-of-week to a UTC timestamp.
///
/// `utc = GPS_EPOCH + gps_week * 604800 + seconds_of_week`, with fractional
/// seconds preserved. No leap-second correction is applied. `seconds_of_week`
/// must be finite and non-negative.
pub fn gps_to_datetime(gps_week: u16, seconds_of_week: f64) -> DateTime<Utc> {
    let whole = seconds_of_week.div_euclid(1.0) as i64;
    let frac = seconds_of_week.rem_euclid(1.0);

    let mut secs = GPS_EPOCH_UNIX_S + i64::from(gps_week) * i64::from(SECONDS_IN_WEEK) + whole;
    let mut nanos = (frac * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        secs += 1;
        nanos = 0;
    }

    DateTime::from_timestamp(secs, nanos).expect("GPS time outside representable range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_start() {
        assert_eq!(
            gps_to_datetime(0, 0.0).to_rfc3339(),
            "1980-01-06T00:00:00+00:00"
        );
    }

    #[test]
    fn known_week_start() {
        // GPS week 2190 began on 2021-12-26.
        assert_eq!(
            gps_to_datetime(2190, 0.0).to_rfc3339(),
            "2021-12-26T00:00:00+00:00"
        );
    }

    #[test]
    fn fractional_seconds_survive() {
        let t = gps_to_datetime(2190, 1.25);
        assert_eq!(t.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn strictly_increasing_within_a_week() {
        let mut prev = gps_to_datetime(2190, 0.0);
        for sow in [0.001, 1.0, 59.5, 86400.0, 604799.999] {
            let t = gps_to_datetime(2190, sow);
            assert!(t > prev, "expected {t} > {prev} at sow={sow}");
            prev = t;
        }
    }

    #[test]
    fn consistent_across_week_boundary() {
        assert_eq!(
            gps_to_datetime(2190, SECONDS_IN_WEEK as f64),
            gps_to_datetime(2191, 0.0)
        );
    }
}
