//! Recipient identifiers

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// One addressee of an envelope, usually an E.164 phone number.
///
/// Opaque to the engine. Blank ids and ids that clash with counter
/// attributes are refused by [`Envelope::new`](crate::Envelope::new), nothing
/// else is checked. Backed by `Arc<str>` because every recipient is copied
/// into its result, its attribute key and log fields.
///
/// ```
/// use contracts::RecipientId;
///
/// let id = RecipientId::from("+15148887777");
/// assert_eq!(id, "+15148887777");
/// assert_eq!(id.clone().as_str(), id.as_str());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RecipientId(Arc<str>);

impl RecipientId {
    pub fn new(s: &str) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Deref for RecipientId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

// Derived Hash hashes the inner str, so &str lookups stay consistent
impl Borrow<str> for RecipientId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecipientId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecipientId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<RecipientId> for String {
    fn from(id: RecipientId) -> Self {
        id.0.to_string()
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RecipientId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for RecipientId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_clones_point_at_one_buffer() {
        let original = RecipientId::from("+15148887777");
        let copy = original.clone();
        assert!(std::ptr::eq(original.as_str(), copy.as_str()));
    }

    #[test]
    fn test_blank_detection() {
        assert!(RecipientId::new("").is_blank());
        assert!(RecipientId::new("   \t").is_blank());
        assert!(!RecipientId::new("+1A").is_blank());
    }

    #[test]
    fn test_set_membership_by_str() {
        let failing: HashSet<RecipientId> = ["+1A", "+1B"].into_iter().map(Into::into).collect();
        assert!(failing.contains("+1A"));
        assert!(!failing.contains("+1C"));
    }

    #[test]
    fn test_wire_form_is_a_bare_string() {
        let id = RecipientId::from("+15148887779");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"+15148887779\"");
        assert_eq!(serde_json::from_str::<RecipientId>(&json).unwrap(), id);
    }
}
