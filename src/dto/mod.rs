//! Wire payloads exchanged with the judge backend: outbound drafts and
//! patches, photo uploads, and the tolerant judgement decode.

pub mod catalog;
pub mod judgement;
pub mod validation;

/// Tolerant parsing of server timestamps.
///
/// The backend has emitted both RFC 3339 strings and offset-less ISO-8601
/// (assumed UTC). Anything unparseable collapses to the UNIX epoch rather
/// than failing the whole payload.
pub(crate) mod server_time {
    use serde::{Deserialize, Deserializer};
    use time::{
        OffsetDateTime, PrimitiveDateTime,
        format_description::well_known::{Iso8601, Rfc3339},
    };

    pub(crate) fn parse(raw: &str) -> OffsetDateTime {
        if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
            return parsed;
        }
        if let Ok(parsed) = PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT) {
            return parsed.assume_utc();
        }
        OffsetDateTime::UNIX_EPOCH
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(parse(&raw))
    }
}
