use libc::time_t;

use crate::errno::Errno;
use crate::time::Time;
use crate::time::calendar::{CalendarTime, Zone};

#[test]
fn test_utc_breakdown_of_a_known_instant() {
    // One day after the epoch: Friday, January 2 1970.
    let cal = CalendarTime::from_time(Time::from_raw(86_400), Zone::Utc).unwrap();

    assert_eq!(cal.year, 1970);
    assert_eq!(cal.month, 1);
    assert_eq!(cal.day, 2);
    assert_eq!((cal.hour, cal.minute, cal.second), (0, 0, 0));
    assert_eq!(cal.weekday, 5);
    assert_eq!(cal.year_day, 1);
}

#[test]
fn test_fields_are_civil_not_kernel() {
    // January reads as 1 and the year is absolute, unlike the kernel's
    // zero-based month and 1900-based year.
    let cal = CalendarTime::from_time(Time::EPOCH, Zone::Utc).unwrap();
    assert_eq!(cal.month, 1);
    assert_eq!(cal.year, 1970);
}

#[test]
fn test_leap_day_breakdown() {
    let cal = CalendarTime::from_time(Time::from_raw(1_709_164_800), Zone::Utc).unwrap();
    assert_eq!((cal.year, cal.month, cal.day), (2024, 2, 29));
}

#[test]
fn test_whole_second_utc_roundtrip() {
    for raw in [0i64, 86_399, 951_868_800, 1_700_000_000] {
        let time = Time::from_raw(raw as time_t);
        let cal = CalendarTime::from_time(time, Zone::Utc).unwrap();
        assert_eq!(cal.to_time(Zone::Utc), time);
    }
}

#[test]
fn test_whole_second_local_roundtrip() {
    // Holds in any zone: the daylight-saving flag rides along with the
    // breakdown, so recomposition cannot land an hour off.
    let time = Time::from_raw(1_700_000_000);
    let cal = CalendarTime::from_time(time, Zone::Local).unwrap();
    assert_eq!(cal.to_time(Zone::Local), time);
}

#[test]
fn test_utc_composition_of_a_known_date() {
    let cal = CalendarTime {
        year: 2000,
        month: 1,
        day: 1,
        ..CalendarTime::default()
    };
    assert_eq!(cal.to_time(Zone::Utc), Time::from_raw(946_684_800));
}

#[test]
fn test_out_of_range_fields_normalize() {
    // Month 13 of 1999 is January 2000.
    let cal = CalendarTime {
        year: 1999,
        month: 13,
        day: 1,
        ..CalendarTime::default()
    };
    assert_eq!(cal.to_time(Zone::Utc), Time::from_raw(946_684_800));
}

#[test]
fn test_unrepresentable_instant_is_an_error() {
    let far = Time::from_raw(time_t::MAX);
    assert_eq!(
        CalendarTime::from_time(far, Zone::Utc).unwrap_err(),
        Errno::EOVERFLOW
    );
}

#[test]
fn test_display_matches_asctime_layout() {
    let cal = CalendarTime::from_time(Time::from_raw(86_400), Zone::Utc).unwrap();
    assert_eq!(cal.to_string(), "Fri Jan  2 00:00:00 1970");
}
