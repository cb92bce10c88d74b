//! Reconciliation filter derivation
//!
//! Priority is strict: `external_id`, then `id`, then the missing-key policy.
//! The identifier value is used as found, including `null`.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use shared::database::Filter;
use shared::types::Document;
use uuid::Uuid;

/// Field carrying the synthetic key of records without an identifier.
pub const SEED_HASH_FIELD: &str = "_seed_hash";

const IDENTIFIER_FIELDS: [&str; 2] = ["external_id", "id"];

/// What to do with a record that has neither `external_id` nor `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Fresh random key per run: the record is inserted again every time.
    #[default]
    InsertOnly,
    /// Key derived from the record's content: unchanged records converge.
    ContentHash,
    /// Refuse the record and abort the rest of its file.
    Reject,
}

impl FromStr for MissingKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insertOnly" | "insert-only" | "insert_only" => Ok(MissingKeyPolicy::InsertOnly),
            "contentHash" | "content-hash" | "content_hash" => Ok(MissingKeyPolicy::ContentHash),
            "reject" => Ok(MissingKeyPolicy::Reject),
            other => Err(format!(
                "unknown policy {:?}, expected insertOnly, contentHash or reject",
                other
            )),
        }
    }
}

impl fmt::Display for MissingKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingKeyPolicy::InsertOnly => "insertOnly",
            MissingKeyPolicy::ContentHash => "contentHash",
            MissingKeyPolicy::Reject => "reject",
        })
    }
}

/// Filter locating the stored counterpart of `record`.
///
/// Returns `None` only under [`MissingKeyPolicy::Reject`] for a record
/// without an identifier.
pub fn reconciliation_filter(
    collection: &str,
    record: &Document,
    policy: MissingKeyPolicy,
) -> Option<Filter> {
    for field in IDENTIFIER_FIELDS {
        if let Some(value) = record.get(field) {
            return Some(Filter::eq(field, value.clone()));
        }
    }

    match policy {
        MissingKeyPolicy::InsertOnly => Some(Filter::eq(
            SEED_HASH_FIELD,
            format!("{}_{}", collection, Uuid::new_v4()),
        )),
        MissingKeyPolicy::ContentHash => Some(Filter::eq(SEED_HASH_FIELD, content_hash(record))),
        MissingKeyPolicy::Reject => None,
    }
}

/// SHA-256 hex digest of the record's canonical (key-sorted) JSON.
fn content_hash(record: &Document) -> String {
    let mut hasher = Sha256::new();
    // Serializing a Document cannot fail: keys are strings and values are JSON.
    if let Ok(json) = record.to_canonical_json() {
        hasher.update(&json);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared::types::Value;

    #[test]
    fn test_external_id_wins_over_id() {
        let record = Document::new().with("external_id", "ext-1").with("id", "c1");
        let filter = reconciliation_filter("companies", &record, MissingKeyPolicy::Reject);
        assert_eq!(filter, Some(Filter::eq("external_id", "ext-1")));
    }

    #[test]
    fn test_id_used_when_external_id_absent() {
        let record = Document::new().with("id", 7i64).with("name", "x");
        let filter = reconciliation_filter("users", &record, MissingKeyPolicy::Reject);
        assert_eq!(filter, Some(Filter::eq("id", 7i64)));
    }

    #[test]
    fn test_null_identifier_is_still_an_identifier() {
        let record = Document::new().with("external_id", Value::Null);
        let filter = reconciliation_filter("posts", &record, MissingKeyPolicy::Reject);
        assert_eq!(filter, Some(Filter::eq("external_id", Value::Null)));
    }

    #[test]
    fn test_insert_only_key_differs_every_call() {
        let record = Document::new().with("title", "hello");
        let a = reconciliation_filter("posts", &record, MissingKeyPolicy::InsertOnly).unwrap();
        let b = reconciliation_filter("posts", &record, MissingKeyPolicy::InsertOnly).unwrap();

        assert_ne!(a, b);
        let key = a.as_document().get_str(SEED_HASH_FIELD).unwrap();
        assert!(key.starts_with("posts_"));
    }

    #[test]
    fn test_content_hash_is_stable_across_key_order() {
        let a = Document::new().with("title", "hello").with("votes", 3i64);
        let b = Document::new().with("votes", 3i64).with("title", "hello");

        let fa = reconciliation_filter("posts", &a, MissingKeyPolicy::ContentHash).unwrap();
        let fb = reconciliation_filter("posts", &b, MissingKeyPolicy::ContentHash).unwrap();
        assert_eq!(fa, fb);

        let hash = fa.as_document().get_str(SEED_HASH_FIELD).unwrap();
        assert_eq!(hash.len(), 64);

        let changed = Document::new().with("title", "hello").with("votes", 4i64);
        let fc = reconciliation_filter("posts", &changed, MissingKeyPolicy::ContentHash).unwrap();
        assert_ne!(fa, fc);
    }

    #[test]
    fn test_reject_yields_no_filter() {
        let record = Document::new().with("title", "hello");
        assert_eq!(reconciliation_filter("posts", &record, MissingKeyPolicy::Reject), None);
    }

    #[test]
    fn test_policy_parse_and_display() {
        assert_eq!("contentHash".parse::<MissingKeyPolicy>(), Ok(MissingKeyPolicy::ContentHash));
        assert_eq!("insert-only".parse::<MissingKeyPolicy>(), Ok(MissingKeyPolicy::InsertOnly));
        assert!("sometimes".parse::<MissingKeyPolicy>().is_err());
        assert_eq!(MissingKeyPolicy::default().to_string(), "insertOnly");
    }
}
