//! Calendar-day parsing and the record-date conventions shared by the
//! food and food-record endpoints.
//!
//! Record dates are stored as naive timestamps after shifting the client's
//! UTC instant by a fixed number of hours (`RECORD_UTC_OFFSET_HOURS`). The
//! shift ignores daylight saving.

use time::{
    format_description::FormatItem, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, Time,
};

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

pub fn parse_day(raw: &str) -> anyhow::Result<Date> {
    Ok(Date::parse(raw.trim(), DAY_FORMAT)?)
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn format_day(day: Date) -> String {
    day.format(DAY_FORMAT).unwrap_or_else(|_| day.to_string())
}

pub fn format_timestamp(ts: PrimitiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).unwrap_or_else(|_| ts.to_string())
}

/// `instant` in UTC moved by whole hours, sub-second part dropped.
fn shift_utc(instant: OffsetDateTime, offset_hours: i64) -> Option<OffsetDateTime> {
    let secs = instant
        .unix_timestamp()
        .checked_add(offset_hours.checked_mul(3600)?)?;
    OffsetDateTime::from_unix_timestamp(secs).ok()
}

/// Manual food entries: shifted instant, truncated to the minute. `None`
/// when the shift leaves the representable range.
pub fn meal_record_timestamp(instant: OffsetDateTime, offset_hours: i64) -> Option<PrimitiveDateTime> {
    let shifted = shift_utc(instant, offset_hours)?;
    let time = Time::from_hms(shifted.hour(), shifted.minute(), 0).ok()?;
    Some(PrimitiveDateTime::new(shifted.date(), time))
}

/// Photo captures: calendar day of the shifted instant, time of day of the
/// original UTC instant (whole seconds). `None` when out of range.
pub fn capture_timestamp(instant: OffsetDateTime, offset_hours: i64) -> Option<PrimitiveDateTime> {
    let utc = shift_utc(instant, 0)?;
    let day = shift_utc(instant, offset_hours)?.date();
    let time = Time::from_hms(utc.hour(), utc.minute(), utc.second()).ok()?;
    Some(PrimitiveDateTime::new(day, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_calendar_days() {
        assert_eq!(parse_day("2025-03-14").unwrap(), date!(2025 - 03 - 14));
        assert_eq!(parse_day(" 2025-03-14 ").unwrap(), date!(2025 - 03 - 14));
        assert!(parse_day("14/03/2025").is_err());
        assert!(parse_day("2025-02-30").is_err());
    }

    #[test]
    fn formats_days_and_timestamps() {
        assert_eq!(format_day(date!(2025 - 01 - 05)), "2025-01-05");
        assert_eq!(
            format_timestamp(datetime!(2025-01-05 07:08:09)),
            "2025-01-05 07:08:09"
        );
    }

    #[test]
    fn meal_record_timestamp_shifts_and_drops_seconds() {
        let instant = datetime!(2025-03-14 20:45:33.250 UTC);
        assert_eq!(
            meal_record_timestamp(instant, 10),
            Some(datetime!(2025-03-15 06:45:00))
        );
    }

    #[test]
    fn capture_timestamp_keeps_utc_time_of_day() {
        let instant = datetime!(2025-03-14 20:45:33.900 UTC);
        assert_eq!(
            capture_timestamp(instant, 10),
            Some(datetime!(2025-03-15 20:45:33))
        );
    }

    #[test]
    fn non_utc_inputs_are_normalised_first() {
        let instant = datetime!(2025-03-15 06:00:00 +10:00);
        assert_eq!(
            meal_record_timestamp(instant, 10),
            Some(datetime!(2025-03-15 06:00:00))
        );
    }

    #[test]
    fn shifts_past_the_last_representable_day_are_none() {
        let instant = datetime!(9999-12-31 20:00:00 UTC);
        assert_eq!(meal_record_timestamp(instant, 10), None);
        assert_eq!(capture_timestamp(instant, 10), None);
        assert_eq!(
            capture_timestamp(instant, 2),
            Some(datetime!(9999-12-31 20:00:00))
        );

        // valid local time whose UTC equivalent is already out of range
        let west = datetime!(9999-12-31 22:00:00 -5);
        assert_eq!(meal_record_timestamp(west, 0), None);
        assert_eq!(capture_timestamp(west, 0), None);
    }
}
