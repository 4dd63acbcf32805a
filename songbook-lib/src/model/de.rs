//! Lenient deserializers for values the CMS reports in more than one shape.

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error as _;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

/// An aggregate count, sent as a number or as a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count(pub usize);

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => usize::try_from(n)
                .map(Count)
                .map_err(|_| D::Error::custom(format!("negative count {}", n))),
            NumberOrString::String(s) => s
                .trim()
                .parse()
                .map(Count)
                .map_err(|_| D::Error::custom(format!("invalid count '{}'", s))),
        }
    }
}

/// An optional count; unparsable values become `None`.
pub fn opt_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => u64::try_from(n).ok(),
        Some(NumberOrString::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// An identifier that may be numeric or textual, kept as text.
pub fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::String(s) => s,
    })
}

/// A timestamp in RFC 3339 form or without an offset (taken as UTC).
pub fn opt_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    match NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Ok(Some(naive.and_utc())),
        Err(_) => {
            log::debug!("ignoring unparsable timestamp '{}'", raw);
            Ok(None)
        }
    }
}

/// A value where `null` means the type's default.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_count")]
        count: Option<u64>,
        #[serde(default, deserialize_with = "opt_timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "nullable")]
        tags: Vec<String>,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_count_shapes() {
        assert_eq!(serde_json::from_str::<Count>("7").unwrap(), Count(7));
        assert_eq!(serde_json::from_str::<Count>("\" 12 \"").unwrap(), Count(12));
        assert!(serde_json::from_str::<Count>("\"many\"").is_err());
        assert!(serde_json::from_str::<Count>("-1").is_err());
    }

    #[test]
    fn test_optional_fields() {
        let s = sample(r#"{"count":"3","tags":null}"#);
        assert_eq!(s.count, Some(3));
        assert!(s.tags.is_empty());
        assert_eq!(s.at, None);

        let s = sample(r#"{"count":"n/a"}"#);
        assert_eq!(s.count, None);
    }

    #[test]
    fn test_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(sample(r#"{"at":"2024-03-01T12:30:00.000Z"}"#).at, Some(expected));
        assert_eq!(sample(r#"{"at":"2024-03-01T12:30:00"}"#).at, Some(expected));
        assert_eq!(sample(r#"{"at":"yesterday"}"#).at, None);
        assert_eq!(sample(r#"{"at":null}"#).at, None);
    }
}
