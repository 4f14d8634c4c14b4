mod ticket;

pub use ticket::{remaining_seconds, Ticket};

use serde::Deserializer;

/// Helper to deserialize an id as either string or integer
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct WithId {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
    }

    #[test]
    fn test_deserialize_id_accepts_string() {
        let parsed: WithId = serde_json::from_str(r#"{"id":"TICKET_42"}"#).unwrap();
        assert_eq!(parsed.id, "TICKET_42");
    }

    #[test]
    fn test_deserialize_id_accepts_integer() {
        let parsed: WithId = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(parsed.id, "42");
    }

    #[test]
    fn test_deserialize_id_rejects_object() {
        let parsed = serde_json::from_str::<WithId>(r#"{"id":{"nested":true}}"#);
        assert!(parsed.is_err());
    }
}
