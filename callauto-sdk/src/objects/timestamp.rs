//! Lenient RFC 3339 timestamps.
//!
//! A timestamp the service formats unexpectedly must not cost us the whole
//! event, so unparseable values decode as `None`.

use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match OffsetDateTime::parse(&value, &Rfc3339) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(value = %value, error = %e, "Ignoring unparseable timestamp");
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use time::OffsetDateTime;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "super::deserialize")]
        at: Option<OffsetDateTime>,
    }

    #[test]
    fn test_seven_digit_fraction() {
        let holder: Holder =
            serde_json::from_str(r#"{"at":"2023-05-12T18:52:11.1234567+00:00"}"#).unwrap();
        assert!(holder.at.is_some());
    }

    #[test]
    fn test_garbage_is_none() {
        let holder: Holder = serde_json::from_str(r#"{"at":"yesterday"}"#).unwrap();
        assert!(holder.at.is_none());
        let holder: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(holder.at.is_none());
    }
}
