// src/dates.rs
//! Civil date computation in the digest's fixed reference timezone
//! (US Eastern). The partition key for a digest run is the calendar date
//! in that zone, not in UTC.
//!
//! DST rule (post-2007 US): offset is UTC-4 from 2:00 local on the second
//! Sunday of March until 2:00 local on the first Sunday of November, and
//! UTC-5 otherwise. Implemented locally; the corpus carries no tz database.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};

/// The civil date in US Eastern for a given UTC instant.
pub fn eastern_civil_date(utc: DateTime<Utc>) -> NaiveDate {
    let offset_hours = eastern_offset_hours(utc);
    let offset = FixedOffset::east_opt(offset_hours * 3600).expect("valid eastern offset");
    utc.with_timezone(&offset).date_naive()
}

/// Today's civil date string (`YYYY-MM-DD`) in US Eastern.
pub fn today_date_iso() -> String {
    eastern_civil_date(Utc::now()).format("%Y-%m-%d").to_string()
}

fn eastern_offset_hours(utc: DateTime<Utc>) -> i32 {
    let year = utc.year();
    // 2:00 EST = 7:00 UTC on the second Sunday of March.
    let dst_start = nth_weekday(year, 3, Weekday::Sun, 2).and_then(|d| {
        Utc.with_ymd_and_hms(year, 3, d.day(), 7, 0, 0).single()
    });
    // 2:00 EDT = 6:00 UTC on the first Sunday of November.
    let dst_end = nth_weekday(year, 11, Weekday::Sun, 1).and_then(|d| {
        Utc.with_ymd_and_hms(year, 11, d.day(), 6, 0, 0).single()
    });
    match (dst_start, dst_end) {
        (Some(start), Some(end)) if utc >= start && utc < end => -4,
        _ => -5,
    }
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single().unwrap()
    }

    #[test]
    fn winter_uses_est() {
        // 2026-01-15 04:30 UTC is 23:30 on Jan 14 in EST.
        assert_eq!(
            eastern_civil_date(at(2026, 1, 15, 4, 30)),
            NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
        );
    }

    #[test]
    fn summer_uses_edt() {
        // 2026-06-15 03:30 UTC is 23:30 on Jun 14 in EDT.
        assert_eq!(
            eastern_civil_date(at(2026, 6, 15, 3, 30)),
            NaiveDate::from_ymd_opt(2026, 6, 14).unwrap()
        );
    }

    #[test]
    fn dst_start_boundary() {
        // DST starts 2026-03-08 07:00 UTC.
        assert_eq!(eastern_offset_hours(at(2026, 3, 8, 6, 59)), -5);
        assert_eq!(eastern_offset_hours(at(2026, 3, 8, 7, 0)), -4);
    }

    #[test]
    fn dst_end_boundary() {
        // DST ends 2026-11-01 06:00 UTC.
        assert_eq!(eastern_offset_hours(at(2026, 11, 1, 5, 59)), -4);
        assert_eq!(eastern_offset_hours(at(2026, 11, 1, 6, 0)), -5);
    }

    #[test]
    fn date_iso_shape() {
        let s = today_date_iso();
        assert_eq!(s.len(), 10);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[7..8], "-");
    }
}
