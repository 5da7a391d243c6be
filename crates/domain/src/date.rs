use crate::{document::Timestamp, timezone::TimezoneRegistry};
use chrono::{prelude::*, Duration};
use chrono_tz::Tz;

/// How far back to look for the offset in force before a DST gap
const GAP_LOOKBACK_HOURS: [i64; 3] = [1, 3, 24];

/// Projects a canonical instant into the local time of `timezone`.
///
/// A naive input is taken to already be UTC. When `timezone` is not a
/// valid identifier the instant is returned unchanged so reads never fail
/// because of a bad profile setting.
pub fn to_local(
    registry: &TimezoneRegistry,
    instant: Option<&Timestamp>,
    timezone: &str,
) -> Option<Timestamp> {
    let instant = instant?;
    let local = match registry.resolve(timezone) {
        Ok(tz) => Timestamp::Zoned(instant.to_utc().with_timezone(&tz)),
        Err(_) if instant.is_naive() => Timestamp::Utc(instant.to_utc()),
        Err(_) => instant.clone(),
    };
    Some(local)
}

/// Converts a timestamp supplied in the local time of `timezone` to its
/// canonical UTC form.
///
/// Timestamps carrying an offset are only re-expressed in UTC. Naive ones are
/// read as wall-clock time in `timezone`, or as UTC when `timezone` is invalid.
pub fn to_canonical(
    registry: &TimezoneRegistry,
    local: Option<&Timestamp>,
    timezone: &str,
) -> Option<DateTime<Utc>> {
    let local = local?;
    let canonical = match local {
        Timestamp::Naive(naive) => match registry.resolve(timezone) {
            Ok(tz) => localize(&tz, naive),
            Err(_) => Utc.from_utc_datetime(naive),
        },
        aware => aware.to_utc(),
    };
    Some(canonical)
}

/// Resolves a wall-clock time in `tz` to an instant.
///
/// A time repeated by a DST fall-back resolves to its earlier occurrence.
/// A time skipped by a DST spring-forward is read with the offset in force
/// just before the gap, so 02:30 on a New York spring-forward day becomes
/// 07:30 UTC.
pub fn localize(tz: &Tz, naive: &NaiveDateTime) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(naive).earliest() {
        return dt.with_timezone(&Utc);
    }

    for hours in GAP_LOOKBACK_HOURS.iter() {
        let before_gap = tz
            .from_local_datetime(&(*naive - Duration::hours(*hours)))
            .earliest();
        if let Some(before_gap) = before_gap {
            let offset = before_gap.offset().fix().local_minus_utc();
            return Utc.from_utc_datetime(&(*naive - Duration::seconds(offset as i64)));
        }
    }
    Utc.from_utc_datetime(naive)
}

/// Human readable date used in reminder messages, e.g.
/// `January 01, 2024 at 12:00 PM`
pub fn format_date<T: TimeZone>(date: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    date.format("%B %d, %Y at %I:%M %p").to_string()
}
