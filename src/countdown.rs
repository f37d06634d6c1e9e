use serde::Serialize;
use thiserror::Error;
use time::macros::format_description;
use time::{Date, Month};

/// Birthday input that could not be read as a calendar date.
#[derive(Debug, Error)]
#[error("invalid birthday {input:?}: not a valid YYYY-MM-DD calendar date")]
pub struct InvalidBirthday {
    pub input: String,
}

/// Urgency of an upcoming birthday, most urgent first.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Urgent,
    Soon,
    Upcoming,
    Distant,
}

/// Derived countdown fields attached to recipient responses. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Countdown {
    pub days_until: u32,
    pub tier: Tier,
    pub display_date: String,
}

impl Countdown {
    pub fn compute(birthday: Date, today: Date) -> Self {
        let days = days_until(birthday, today);
        Self {
            days_until: days,
            tier: classify(days),
            display_date: format_display_date(birthday),
        }
    }
}

/// Parses an ISO-8601 `YYYY-MM-DD` birthday. A trailing time component
/// (as stored rows may carry) is ignored.
pub fn parse_birthday(input: &str) -> Result<Date, InvalidBirthday> {
    let trimmed = input.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(date_part, &format).map_err(|_| InvalidBirthday {
        input: input.to_string(),
    })
}

/// Next calendar occurrence of `birthday`'s month/day on or after `today`.
///
/// The stored year is discarded. A projection that lands strictly before
/// `today` rolls to next year; landing exactly on `today` stays put, so a
/// birthday today reports zero days, never 365/366. Feb 29 projected onto
/// a non-leap year becomes Mar 1 of that year.
pub fn next_occurrence(birthday: Date, today: Date) -> Date {
    let candidate = project(birthday.month(), birthday.day(), today.year());
    if candidate < today {
        project(birthday.month(), birthday.day(), today.year() + 1)
    } else {
        candidate
    }
}

fn project(month: Month, day: u8, year: i32) -> Date {
    Date::from_calendar_date(year, month, day).unwrap_or_else(|_| {
        // Only Feb 29 in a non-leap year can overflow; roll forward.
        Date::from_calendar_date(year, Month::March, 1).expect("Mar 1 exists in every year")
    })
}

/// Whole days from `today` until the next occurrence of `birthday`.
/// Always in `[0, 366]`.
pub fn days_until(birthday: Date, today: Date) -> u32 {
    (next_occurrence(birthday, today) - today).whole_days() as u32
}

pub fn classify(days_until: u32) -> Tier {
    match days_until {
        0 => Tier::Urgent,
        1..=7 => Tier::Soon,
        8..=30 => Tier::Upcoming,
        _ => Tier::Distant,
    }
}

/// "Month day" label from the UTC month/day components, e.g. "March 14".
pub fn format_display_date(birthday: Date) -> String {
    format!("{} {}", birthday.month(), birthday.day())
}

/// Age in completed years as of `today`, one less when the birthday has
/// not yet occurred this year.
pub fn age_on(birthday: Date, today: Date) -> i32 {
    let mut age = today.year() - birthday.year();
    if (today.month() as u8, today.day()) < (birthday.month() as u8, birthday.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn birthday_today_is_zero_days_and_urgent() {
        let days = days_until(date!(2000 - 03 - 14), date!(2024 - 03 - 14));
        assert_eq!(days, 0);
        assert_eq!(classify(days), Tier::Urgent);
    }

    #[test]
    fn birthday_tomorrow_is_one_day_and_soon() {
        let days = days_until(date!(2000 - 03 - 15), date!(2024 - 03 - 14));
        assert_eq!(days, 1);
        assert_eq!(classify(days), Tier::Soon);
    }

    #[test]
    fn tier_boundaries_at_seven_and_eight_days() {
        let today = date!(2024 - 03 - 14);
        let seven = days_until(date!(2000 - 03 - 21), today);
        let eight = days_until(date!(2000 - 03 - 22), today);
        assert_eq!(seven, 7);
        assert_eq!(classify(seven), Tier::Soon);
        assert_eq!(eight, 8);
        assert_eq!(classify(eight), Tier::Upcoming);
    }

    #[test]
    fn tier_boundaries_at_thirty_and_thirty_one_days() {
        assert_eq!(classify(30), Tier::Upcoming);
        assert_eq!(classify(31), Tier::Distant);
    }

    #[test]
    fn passed_birthday_wraps_into_next_year() {
        let today = date!(2024 - 12 - 30);
        let next = next_occurrence(date!(2000 - 01 - 05), today);
        assert_eq!(next, date!(2025 - 01 - 05));
        assert_eq!(days_until(date!(2000 - 01 - 05), today), 6);
    }

    #[test]
    fn stored_year_is_ignored() {
        let today = date!(2024 - 03 - 14);
        assert_eq!(
            days_until(date!(1987 - 03 - 20), today),
            days_until(date!(2010 - 03 - 20), today),
        );
    }

    #[test]
    fn feb_29_rolls_to_mar_1_in_non_leap_years() {
        // 2023 is not a leap year: the projection becomes Mar 1 2023,
        // which is exactly "today" here, so no roll-over to 2024.
        let birthday = date!(2000 - 02 - 29);
        assert_eq!(
            next_occurrence(birthday, date!(2023 - 03 - 01)),
            date!(2023 - 03 - 01)
        );
        assert_eq!(days_until(birthday, date!(2023 - 03 - 01)), 0);

        // One day later the Mar 1 projection has passed; the next
        // occurrence is the real Feb 29 of leap year 2024.
        assert_eq!(
            next_occurrence(birthday, date!(2023 - 03 - 02)),
            date!(2024 - 02 - 29)
        );
        assert_eq!(days_until(birthday, date!(2023 - 03 - 02)), 364);
    }

    #[test]
    fn next_occurrence_is_never_before_today_and_days_stay_bounded() {
        let birthdays = [
            date!(1990 - 01 - 01),
            date!(1990 - 06 - 15),
            date!(1990 - 12 - 31),
            date!(2000 - 02 - 28),
            date!(2000 - 03 - 01),
        ];
        let todays = [
            date!(2023 - 01 - 01),
            date!(2023 - 06 - 15),
            date!(2023 - 12 - 31),
            date!(2024 - 02 - 29),
            date!(2024 - 12 - 30),
        ];
        for b in birthdays {
            for t in todays {
                let next = next_occurrence(b, t);
                assert!(next >= t, "next {next} before today {t}");
                let days = days_until(b, t);
                assert!(days < 366, "days {days} out of range for {b} from {t}");
                // Pure function: same inputs, same output.
                assert_eq!(days, days_until(b, t));
            }
        }
    }

    #[test]
    fn display_date_uses_month_name_and_day_only() {
        assert_eq!(format_display_date(date!(2000 - 03 - 14)), "March 14");
        assert_eq!(format_display_date(date!(1999 - 12 - 01)), "December 1");
    }

    #[test]
    fn parse_accepts_plain_dates_and_timestamps() {
        assert_eq!(parse_birthday("2000-03-14").unwrap(), date!(2000 - 03 - 14));
        assert_eq!(
            parse_birthday("2000-03-14T00:00:00Z").unwrap(),
            date!(2000 - 03 - 14)
        );
        assert_eq!(
            parse_birthday("  2000-03-14 12:30:00  ").unwrap(),
            date!(2000 - 03 - 14)
        );
    }

    #[test]
    fn parse_rejects_garbage_and_impossible_dates() {
        assert!(parse_birthday("").is_err());
        assert!(parse_birthday("march 14").is_err());
        assert!(parse_birthday("2000-13-01").is_err());
        assert!(parse_birthday("2001-02-29").is_err());
        let err = parse_birthday("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn age_counts_completed_years_only() {
        let birthday = date!(2000 - 03 - 14);
        assert_eq!(age_on(birthday, date!(2024 - 03 - 13)), 23);
        assert_eq!(age_on(birthday, date!(2024 - 03 - 14)), 24);
        assert_eq!(age_on(birthday, date!(2024 - 03 - 15)), 24);
    }

    #[test]
    fn countdown_bundles_all_derived_fields() {
        let c = Countdown::compute(date!(2000 - 03 - 20), date!(2024 - 03 - 14));
        assert_eq!(c.days_until, 6);
        assert_eq!(c.tier, Tier::Soon);
        assert_eq!(c.display_date, "March 20");
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Urgent).unwrap(), "\"urgent\"");
        assert_eq!(serde_json::to_string(&Tier::Distant).unwrap(), "\"distant\"");
    }
}
