//! Serde helpers for byte sizes written as "10MB", "512KiB" or a bare number.
//!
//! Sizes are written back as exact byte counts so a generated config file
//! reloads to the same limits.

use bytesize::ByteSize;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

pub fn serialize<S>(size: &ByteSize, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(size.as_u64())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<ByteSize, D::Error>
where
    D: Deserializer<'de>,
{
    struct ByteSizeVisitor;

    impl<'de> Visitor<'de> for ByteSizeVisitor {
        type Value = ByteSize;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a size in bytes (number) or human-readable string (e.g., '10MB', '512KiB')")
        }

        fn visit_u64<E>(self, bytes: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(ByteSize::b(bytes))
        }

        fn visit_i64<E>(self, bytes: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(bytes)
                .map(ByteSize::b)
                .map_err(|_| de::Error::custom(format!("Negative size: {bytes}")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse::<ByteSize>()
                .map_err(|e| de::Error::custom(format!("Invalid size '{value}': {e}")))
        }
    }

    deserializer.deserialize_any(ByteSizeVisitor)
}

#[cfg(test)]
mod tests {
    use bytesize::ByteSize;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super")]
        size: ByteSize,
    }

    #[test]
    fn test_parses_units() {
        let holder: Holder = toml::from_str(r#"size = "10MB""#).unwrap();
        assert_eq!(holder.size.as_u64(), 10_000_000);

        let holder: Holder = toml::from_str(r#"size = "2KiB""#).unwrap();
        assert_eq!(holder.size.as_u64(), 2048);

        let holder: Holder = toml::from_str("size = 1234").unwrap();
        assert_eq!(holder.size.as_u64(), 1234);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(toml::from_str::<Holder>(r#"size = "lots""#).is_err());
        assert!(toml::from_str::<Holder>("size = -1").is_err());
    }

    #[test]
    fn test_serializes_exact_bytes() {
        let text = toml::to_string(&Holder {
            size: ByteSize::b(50_000_000),
        })
        .unwrap();
        assert_eq!(text.trim(), "size = 50000000");
    }
}
