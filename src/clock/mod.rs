//! clock
//!
//! Current time in a named zone or city.
//!
//! Lookup never fails: an unknown name falls back to UTC and the report
//! says so through `resolved`.

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::{Tz, TZ_VARIANTS};
use log::info;
use serde::Serialize;

/// City names accepted in place of IANA zone names.
///
/// Cities whose name is the last segment of their zone ("Tokyo",
/// "Los Angeles") resolve without an entry here.
const CITY_TIMEZONES: &[(&str, Tz)] = &[
    ("beijing", Tz::Asia__Shanghai),
    ("bengaluru", Tz::Asia__Kolkata),
    ("bangalore", Tz::Asia__Kolkata),
    ("delhi", Tz::Asia__Kolkata),
    ("mumbai", Tz::Asia__Kolkata),
    ("new delhi", Tz::Asia__Kolkata),
    ("munich", Tz::Europe__Berlin),
    ("frankfurt", Tz::Europe__Berlin),
    ("hamburg", Tz::Europe__Berlin),
    ("barcelona", Tz::Europe__Madrid),
    ("milan", Tz::Europe__Rome),
    ("geneva", Tz::Europe__Zurich),
    ("washington", Tz::America__New_York),
    ("boston", Tz::America__New_York),
    ("miami", Tz::America__New_York),
    ("san francisco", Tz::America__Los_Angeles),
    ("seattle", Tz::America__Los_Angeles),
    ("austin", Tz::America__Chicago),
    ("dallas", Tz::America__Chicago),
    ("houston", Tz::America__Chicago),
    ("montreal", Tz::America__Toronto),
    ("rio de janeiro", Tz::America__Sao_Paulo),
    ("osaka", Tz::Asia__Tokyo),
    ("kyoto", Tz::Asia__Tokyo),
    ("canberra", Tz::Australia__Sydney),
    ("wellington", Tz::Pacific__Auckland),
    ("ho chi minh city", Tz::Asia__Ho_Chi_Minh),
];

/// Time reading for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeReport {
    /// RFC 3339 timestamp with the zone's offset
    pub iso: String,
    /// IANA zone name used
    pub timezone: String,
    /// False when the requested name was not recognised and UTC was used
    pub resolved: bool,
}

/// Current time in `zone`, a zone name or city. Absent means UTC.
pub fn current_time(zone: Option<&str>) -> TimeReport {
    time_at(Utc::now(), zone)
}

/// The instant `now` expressed in `zone`.
pub fn time_at(now: DateTime<Utc>, zone: Option<&str>) -> TimeReport {
    let requested = zone.map(str::trim).filter(|z| !z.is_empty());

    let (tz, resolved) = match requested {
        None => (Tz::UTC, true),
        Some(name) => match resolve_timezone(name) {
            Some(tz) => (tz, true),
            None => {
                info!("unknown timezone or city '{}', using UTC", name);
                (Tz::UTC, false)
            }
        },
    };

    TimeReport {
        iso: now
            .with_timezone(&tz)
            .to_rfc3339_opts(SecondsFormat::Secs, false),
        timezone: tz.name().to_string(),
        resolved,
    }
}

/// Resolve an IANA zone name or a city name, ignoring case.
pub fn resolve_timezone(name: &str) -> Option<Tz> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if let Ok(tz) = name.parse::<Tz>() {
        return Some(tz);
    }
    if let Some(tz) = TZ_VARIANTS
        .iter()
        .find(|tz| tz.name().eq_ignore_ascii_case(name))
    {
        return Some(*tz);
    }

    let city = name.to_lowercase();
    if let Some((_, tz)) = CITY_TIMEZONES.iter().find(|(c, _)| *c == city) {
        return Some(*tz);
    }

    // "new york" -> America/New_York
    let segment = city.replace(' ', "_");
    TZ_VARIANTS.iter().copied().find(|tz| {
        tz.name()
            .rsplit_once('/')
            .is_some_and(|(_, last)| last.eq_ignore_ascii_case(&segment))
    })
}
