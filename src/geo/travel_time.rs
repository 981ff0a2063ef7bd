pub const WALK_SPEED_KMH: f64 = 5.0;
pub const DEFAULT_DRIVE_SPEED_KMH: f64 = 80.0;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Walk,
    Drive,
}

impl TravelMode {
    /// Unrecognized modes are treated as driving.
    pub fn parse(mode: &str) -> Self {
        match mode {
            "walk" => TravelMode::Walk,
            _ => TravelMode::Drive,
        }
    }

    /// Effective speed for this mode. The supplied speed only matters when
    /// driving, and only if it is a positive number.
    pub fn speed_kmh(self, speed: Option<f64>) -> f64 {
        match self {
            TravelMode::Walk => WALK_SPEED_KMH,
            TravelMode::Drive => speed
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(DEFAULT_DRIVE_SPEED_KMH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEstimate {
    pub minutes: i64,
    pub time_string: String,
}

impl TimeEstimate {
    fn zero() -> Self {
        Self {
            minutes: 0,
            time_string: format_minutes(0),
        }
    }
}

pub fn estimate_time(distance_km: f64, mode: TravelMode, speed: Option<f64>) -> TimeEstimate {
    if distance_km.is_nan() || distance_km <= 0.0 {
        return TimeEstimate::zero();
    }

    let speed = mode.speed_kmh(speed);
    // a vanishing speed overflows to infinity, which saturates at i64::MAX
    let minutes = (distance_km / speed * 60.0).round() as i64;

    TimeEstimate {
        minutes,
        time_string: format_minutes(minutes),
    }
}

pub fn format_minutes(minutes: i64) -> String {
    if minutes < MINUTES_PER_HOUR {
        format!("{} minutes", minutes)
    } else if minutes < MINUTES_PER_DAY {
        format!("{}h {}m", minutes / MINUTES_PER_HOUR, minutes % MINUTES_PER_HOUR)
    } else {
        let days = minutes / MINUTES_PER_DAY;
        let hours = (minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
        // taken from the total; equal to the day remainder's minutes since 1440 % 60 == 0
        let mins = minutes % MINUTES_PER_HOUR;
        format!("{}d {}h {}m", days, hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("walk", TravelMode::Walk)]
    #[case("drive", TravelMode::Drive)]
    #[case("fly", TravelMode::Drive)]
    #[case("", TravelMode::Drive)]
    #[case("WALK", TravelMode::Drive)]
    fn parses_modes(#[case] raw: &str, #[case] expected: TravelMode) {
        assert_eq!(TravelMode::parse(raw), expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(0.0))]
    #[case(Some(40.0))]
    #[case(Some(300.0))]
    fn walking_ignores_supplied_speed(#[case] speed: Option<f64>) {
        assert_eq!(TravelMode::Walk.speed_kmh(speed), 5.0);
    }

    #[rstest]
    #[case(None, 80.0)]
    #[case(Some(0.0), 80.0)]
    #[case(Some(-10.0), 80.0)]
    #[case(Some(f64::NAN), 80.0)]
    #[case(Some(40.0), 40.0)]
    fn driving_speed_resolution(#[case] speed: Option<f64>, #[case] expected: f64) {
        assert_eq!(TravelMode::Drive.speed_kmh(speed), expected);
    }

    #[rstest]
    fn zero_distance_is_zero_minutes(
        #[values(TravelMode::Walk, TravelMode::Drive)] mode: TravelMode,
        #[values(None, Some(0.0), Some(40.0))] speed: Option<f64>,
    ) {
        let estimate = estimate_time(0.0, mode, speed);
        assert_eq!(estimate.minutes, 0);
        assert_eq!(estimate.time_string, "0 minutes");
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(-5.0)]
    fn degenerate_distances_are_zero_minutes(#[case] distance: f64) {
        assert_eq!(estimate_time(distance, TravelMode::Drive, None), TimeEstimate::zero());
    }

    #[rstest]
    #[case(0, "0 minutes")]
    #[case(59, "59 minutes")]
    #[case(60, "1h 0m")]
    #[case(61, "1h 1m")]
    #[case(1439, "23h 59m")]
    #[case(1440, "1d 0h 0m")]
    #[case(1501, "1d 1h 1m")]
    #[case(4000, "2d 18h 40m")]
    fn formats_by_range(#[case] minutes: i64, #[case] expected: &str) {
        assert_eq!(format_minutes(minutes), expected);
    }

    #[test]
    fn walking_ten_km_takes_two_hours() {
        let estimate = estimate_time(10.0, TravelMode::Walk, Some(100.0));
        assert_eq!(estimate.minutes, 120);
        assert_eq!(estimate.time_string, "2h 0m");
    }

    #[test]
    fn driving_uses_custom_speed() {
        let estimate = estimate_time(100.0, TravelMode::Drive, Some(40.0));
        assert_eq!(estimate.minutes, 150);
        assert_eq!(estimate.time_string, "2h 30m");
    }

    #[test]
    fn vanishing_speed_is_never_zero_minutes() {
        let estimate = estimate_time(10.0, TravelMode::Drive, Some(5e-324));
        assert_eq!(estimate.minutes, i64::MAX);
        assert_ne!(estimate.time_string, "0 minutes");
        assert!(estimate.time_string.ends_with('m'));
    }

    #[test]
    fn minutes_are_rounded() {
        // 1 km at 80 km/h is 0.75 minutes
        assert_eq!(estimate_time(1.0, TravelMode::Drive, None).minutes, 1);
    }

    fn parse_readable(readable: &str) -> i64 {
        if let Some(minutes) = readable.strip_suffix(" minutes") {
            return minutes.parse().unwrap();
        }
        readable
            .split_whitespace()
            .map(|part| {
                let (value, unit) = part.split_at(part.len() - 1);
                let value: i64 = value.parse().unwrap();
                match unit {
                    "d" => value * MINUTES_PER_DAY,
                    "h" => value * MINUTES_PER_HOUR,
                    "m" => value,
                    other => panic!("unexpected unit {}", other),
                }
            })
            .sum()
    }

    #[rstest]
    #[case(3.0, 80.0)]
    #[case(55.0, 80.0)]
    #[case(120.0, 45.0)]
    #[case(1000.0, 50.0)]
    #[case(5000.0, 60.0)]
    fn readable_string_round_trips_to_minutes(#[case] distance: f64, #[case] speed: f64) {
        let estimate = estimate_time(distance, TravelMode::Drive, Some(speed));
        assert_eq!(parse_readable(&estimate.time_string), estimate.minutes);
    }

    #[test]
    fn day_branch_minutes_match_both_remainder_conventions() {
        // total % 60 versus the minutes left after removing days and hours
        for minutes in 1440..(5 * MINUTES_PER_DAY) {
            let from_total = minutes % MINUTES_PER_HOUR;
            let from_remainder = (minutes % MINUTES_PER_DAY) % MINUTES_PER_HOUR;
            assert_eq!(from_total, from_remainder);
        }
    }
}
