//! Decode snapshot documents produced by the polling collaborator.

use serde::Deserialize;
use thiserror::Error;

use super::types::{Snapshot, SnapshotSet};

/// Error type for snapshot decoding
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The document is not valid snapshot JSON
    #[error("invalid snapshot document: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot in an array document has no account id
    #[error("snapshot #{index} has an empty account_id")]
    MissingAccount { index: usize },

    /// Two snapshots in an array document share an account id
    #[error("duplicate snapshot for account: {account}")]
    DuplicateAccount { account: String },
}

/// Accepted top-level shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<Snapshot>),
    Keyed(SnapshotSet),
}

/// Parse a JSON document into a snapshot set.
///
/// The document is either an array of snapshots or an object keyed by
/// account id. In the keyed form an empty `account_id` inherits the key.
pub fn parse_snapshots(json: &str) -> Result<SnapshotSet, SnapshotError> {
    let document: Document = serde_json::from_str(json)?;
    let mut set = SnapshotSet::new();

    match document {
        Document::List(list) => {
            for (index, snapshot) in list.into_iter().enumerate() {
                if snapshot.account_id.is_empty() {
                    return Err(SnapshotError::MissingAccount { index });
                }
                if set.contains_key(&snapshot.account_id) {
                    return Err(SnapshotError::DuplicateAccount {
                        account: snapshot.account_id,
                    });
                }
                set.insert(snapshot.account_id.clone(), snapshot);
            }
        }
        Document::Keyed(keyed) => {
            for (key, mut snapshot) in keyed {
                if snapshot.account_id.is_empty() {
                    snapshot.account_id = key.clone();
                }
                set.insert(key, snapshot);
            }
        }
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Status;

    #[test]
    fn test_parse_array_document() {
        let json = r#"[
            {"provider_id": "openai", "account_id": "work", "status": "ok",
             "metrics": {"total_cost_usd": {"used": 12.5, "unit": "USD"}}},
            {"provider_id": "cursor", "account_id": "home", "status": "near_limit"}
        ]"#;

        let set = parse_snapshots(json).expect("Should parse array");
        assert_eq!(set.len(), 2);
        assert_eq!(set["work"].metric_used("total_cost_usd"), Some(12.5));
        assert_eq!(set["home"].status, Status::NearLimit);
    }

    #[test]
    fn test_parse_keyed_document_fills_account() {
        let json = r#"{"team": {"provider_id": "anthropic", "account_id": ""}}"#;
        let set = parse_snapshots(json).expect("Should parse keyed");
        assert_eq!(set["team"].account_id, "team");
        assert_eq!(set["team"].status, Status::Unknown);
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let json = r#"[
            {"provider_id": "openai", "account_id": "a"},
            {"provider_id": "openai", "account_id": "a"}
        ]"#;
        assert!(matches!(
            parse_snapshots(json),
            Err(SnapshotError::DuplicateAccount { .. })
        ));
    }

    #[test]
    fn test_missing_account_rejected() {
        let json = r#"[{"provider_id": "openai", "account_id": ""}]"#;
        assert!(matches!(
            parse_snapshots(json),
            Err(SnapshotError::MissingAccount { index: 0 })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_snapshots("{"), Err(SnapshotError::Json(_))));
    }
}
