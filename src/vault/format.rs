//! Canonical plaintext payload of a vault.
//!
//! Before sealing, the record sequence is serialized as:
//!
//! ```text
//! {"version":1,"records":[{...},{...}]}
//! ```
//!
//! - **version**: payload schema version (currently `1`).
//! - **records**: records in insertion order.
//!
//! Payloads written by the earlier browser build are a bare JSON array
//! of records with no envelope; `decode_records` accepts those too.
//! The browser XORed UTF-16 code units, so its payloads are Latin-1
//! whenever a record holds a non-ASCII character.  Bytes that are not
//! valid UTF-8 are therefore read as Latin-1.
//!
//! Parse errors are reported by position only.  serde_json messages can
//! quote the offending input, which may be a secret.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::record::CredentialRecord;
use crate::errors::{CredVaultError, Result};

/// Current payload schema version.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    records: &'a [CredentialRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Envelope {
        version: u32,
        records: Vec<CredentialRecord>,
    },
    Bare(Vec<CredentialRecord>),
}

/// Serialize `records` into the canonical payload bytes.
pub fn encode_records(records: &[CredentialRecord]) -> Result<Vec<u8>> {
    serde_json::to_vec(&EnvelopeRef {
        version: CURRENT_VERSION,
        records,
    })
    .map_err(|e| {
        CredVaultError::SerializationError(format!(
            "record payload could not be encoded ({:?})",
            e.classify()
        ))
    })
}

/// Parse payload bytes back into a record sequence.
///
/// Every failure is a `VaultCorrupted` error: bad JSON, unknown schema
/// version, duplicate ids, or records with empty fields.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<CredentialRecord>> {
    let latin1: Zeroizing<String>;
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            latin1 = Zeroizing::new(bytes.iter().map(|&b| char::from(b)).collect());
            latin1.as_str()
        }
    };

    // Untagged enums swallow the underlying error, so check syntax first
    // to get a useful position.
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        CredVaultError::VaultCorrupted(format!(
            "payload is not valid JSON (line {}, column {})",
            e.line(),
            e.column()
        ))
    })?;

    let payload: Payload = serde_json::from_value(value).map_err(|_| {
        CredVaultError::VaultCorrupted("payload does not contain a valid record list".into())
    })?;

    let records = match payload {
        Payload::Envelope { version, records } => {
            if version != CURRENT_VERSION {
                return Err(CredVaultError::VaultCorrupted(format!(
                    "unsupported payload version {version}, expected {CURRENT_VERSION}"
                )));
            }
            records
        }
        Payload::Bare(records) => records,
    };

    let mut seen = HashSet::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        record
            .check()
            .map_err(|why| CredVaultError::VaultCorrupted(format!("record #{index}: {why}")))?;
        if !seen.insert(record.id.as_str()) {
            return Err(CredVaultError::VaultCorrupted(format!(
                "record #{index}: duplicate id"
            )));
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::record::Category;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, category: Category) -> CredentialRecord {
        CredentialRecord {
            id: id.into(),
            service: format!("svc-{id}"),
            username: "user".into(),
            secret: "pw".into(),
            category,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn envelope_preserves_order() {
        let records = vec![
            record("b", Category::Work),
            record("a", Category::Banking),
            record("c", Category::Work),
        ];
        let bytes = encode_records(&records).unwrap();
        assert_eq!(decode_records(&bytes).unwrap(), records);
    }

    #[test]
    fn empty_envelope_decodes_to_empty() {
        let bytes = encode_records(&[]).unwrap();
        assert_eq!(bytes, br#"{"version":1,"records":[]}"#);
        assert!(decode_records(&bytes).unwrap().is_empty());
    }

    #[test]
    fn accepts_bare_browser_array() {
        let legacy = br#"[{"id":"1712345678901","service":"Gmail","username":"bob@example.com",
            "password":"hunter2","category":"social","createdAt":"2024-04-05T19:34:38.901Z"}]"#;
        let records = decode_records(legacy).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1712345678901");
        assert_eq!(records[0].category, Category::Social);
        assert_eq!(records[0].secret, "hunter2");
    }

    #[test]
    fn latin1_browser_array_is_transcoded() {
        let mut legacy = br#"[{"id":"1","service":"Caf"#.to_vec();
        legacy.push(0xE9);
        legacy.extend_from_slice(br#"","username":"a","password":"caf"#);
        legacy.push(0xE9);
        legacy.extend_from_slice(br#"","category":"work","createdAt":"2024-01-01T00:00:00.000Z"}]"#);
        assert!(std::str::from_utf8(&legacy).is_err());

        let records = decode_records(&legacy).unwrap();
        assert_eq!(records[0].service, "Caf\u{e9}");
        assert_eq!(records[0].secret, "caf\u{e9}");
    }

    #[test]
    fn utf8_payload_is_not_reinterpreted() {
        let mut r = record("a", Category::Work);
        r.secret = "caf\u{e9}".into();
        let bytes = encode_records(&[r]).unwrap();
        assert_eq!(decode_records(&bytes).unwrap()[0].secret, "caf\u{e9}");
    }

    #[test]
    fn rejects_unknown_version() {
        let err = decode_records(br#"{"version":9,"records":[]}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported payload version 9"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let records = vec![record("x", Category::Work), record("x", Category::Social)];
        let bytes = serde_json::to_vec(&records).unwrap();
        assert!(matches!(
            decode_records(&bytes),
            Err(CredVaultError::VaultCorrupted(_))
        ));
    }

    #[test]
    fn rejects_unknown_category() {
        let bad = br#"[{"id":"1","service":"s","username":"u","password":"p",
            "category":"games","createdAt":"2024-04-05T19:34:38Z"}]"#;
        assert!(matches!(
            decode_records(bad),
            Err(CredVaultError::VaultCorrupted(_))
        ));
    }

    #[test]
    fn parse_errors_do_not_echo_input() {
        let err = decode_records(b"{\"records\": [\"hunter2-secret\"").unwrap_err();
        assert!(!err.to_string().contains("hunter2"));

        let err = decode_records(br#"{"version":1,"records":["hunter2-secret"]}"#).unwrap_err();
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn rejects_non_list_json() {
        assert!(decode_records(b"42").is_err());
        assert!(decode_records(b"{}").is_err());
        assert!(decode_records(b"").is_err());
    }
}
