// ── Lenient timestamp decoding ──
//
// The server emits RFC 3339 for most columns, but some older columns
// come out as naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` (UTC by convention).
// Anything else decodes as `None` rather than failing the whole model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_rfc3339_and_naive() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).single();
        assert_eq!(parse("2024-03-01T08:30:00+00:00"), expected);
        assert_eq!(parse("2024-03-01T08:30:00"), expected);
        assert_eq!(parse("yesterday"), None);
    }
}
