//! Envelope - validated unit of work
//!
//! Built once from validated input and immutable afterwards.

use serde::Serialize;

use crate::{ContractError, RecipientId, ATTR_COUNT_FAILURE, ATTR_COUNT_SUCCESS, STATUS_PREFIX};

/// Recipients plus the message body sent to each of them.
///
/// Invariants enforced by [`Envelope::new`]:
/// - at least one recipient
/// - no blank recipient
/// - no recipient whose `status.<recipient>` key is a counter key
/// - non-blank body
///
/// Serializes back to the wire shape `{"to": [...], "body": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    #[serde(rename = "to")]
    recipients: Vec<RecipientId>,
    body: String,
}

impl Envelope {
    /// Create an envelope, checking its invariants.
    ///
    /// # Errors
    /// Returns [`ContractError::MalformedEnvelope`] when an invariant does not hold.
    pub fn new(recipients: Vec<RecipientId>, body: impl Into<String>) -> Result<Self, ContractError> {
        let body = body.into();

        if recipients.is_empty() {
            return Err(ContractError::malformed("'to' must name at least one recipient"));
        }
        if let Some(idx) = recipients.iter().position(RecipientId::is_blank) {
            return Err(ContractError::malformed(format!(
                "'to[{idx}]' is blank"
            )));
        }
        if let Some(idx) = recipients.iter().position(shadows_counter) {
            return Err(ContractError::malformed(format!(
                "'to[{idx}]' ({}) clashes with an outcome counter key",
                recipients[idx]
            )));
        }
        if body.trim().is_empty() {
            return Err(ContractError::malformed("'body' is blank"));
        }

        Ok(Self { recipients, body })
    }

    /// Recipients in delivery order
    pub fn recipients(&self) -> &[RecipientId] {
        &self.recipients
    }

    /// Message body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Number of recipients
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    /// Always false for a constructed envelope; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// `status.<recipient>` would overwrite an aggregate counter attribute
fn shadows_counter(recipient: &RecipientId) -> bool {
    [ATTR_COUNT_SUCCESS, ATTR_COUNT_FAILURE]
        .iter()
        .any(|key| key.strip_prefix(STATUS_PREFIX) == Some(recipient.as_str()))
}
