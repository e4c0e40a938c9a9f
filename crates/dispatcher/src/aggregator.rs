//! Outcome aggregation
//!
//! Turns the ordered per-recipient results of one envelope into a
//! classification plus the flat attribute set written next to the original
//! body.

use std::collections::BTreeMap;

use contracts::{
    AggregateOutcome, Classification, DispatchResult, ATTR_COUNT_FAILURE, ATTR_COUNT_SUCCESS,
};

/// Aggregate per-recipient results
///
/// Pure: the same input always yields the same outcome and `results` is only
/// read. An empty slice classifies as [`Classification::AllSucceeded`].
///
/// When a recipient appears twice its attribute holds the later result while
/// both results are counted. Counter keys are written last; `Envelope::new`
/// rejects recipients whose status key would collide with them.
pub fn aggregate(results: &[DispatchResult]) -> AggregateOutcome {
    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let failed = results.len() - succeeded;

    let mut attributes: BTreeMap<String, String> = results
        .iter()
        .map(|r| (r.attribute_key(), r.outcome.detail().to_string()))
        .collect();
    attributes.insert(ATTR_COUNT_SUCCESS.to_string(), succeeded.to_string());
    attributes.insert(ATTR_COUNT_FAILURE.to_string(), failed.to_string());

    AggregateOutcome {
        per_recipient: results.to_vec(),
        classification: classify(succeeded, failed),
        attributes,
    }
}

/// Classification from success and failure counts
pub fn classify(succeeded: usize, failed: usize) -> Classification {
    match (succeeded, failed) {
        (_, 0) => Classification::AllSucceeded,
        (0, _) => Classification::AllFailed,
        _ => Classification::PartialFailure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(to: &str, id: &str) -> DispatchResult {
        DispatchResult::success(to.into(), id)
    }

    fn bad(to: &str, reason: &str) -> DispatchResult {
        DispatchResult::failure(to.into(), reason)
    }

    #[test]
    fn test_all_succeeded() {
        let outcome = aggregate(&[ok("+1A", "m-1"), ok("+1B", "m-2")]);
        assert_eq!(outcome.classification, Classification::AllSucceeded);
        assert_eq!(outcome.attributes["status.+1A"], "m-1");
        assert_eq!(outcome.attributes["status.count.success"], "2");
        assert_eq!(outcome.attributes["status.count.failure"], "0");
    }

    #[test]
    fn test_all_failed_still_has_full_attributes() {
        let outcome = aggregate(&[bad("+1A", "invalid number"), bad("+1B", "rate limit timeout")]);
        assert_eq!(outcome.classification, Classification::AllFailed);
        assert_eq!(outcome.attributes.len(), 4);
        assert_eq!(outcome.attributes["status.+1B"], "rate limit timeout");
        assert_eq!(outcome.attributes["status.count.failure"], "2");
    }

    #[test]
    fn test_mixed_is_partial_failure() {
        let outcome = aggregate(&[bad("+1A", "invalid number"), ok("+1B", "m-1")]);
        assert_eq!(outcome.classification, Classification::PartialFailure);
        assert_eq!(outcome.success_count(), 1);
        assert_eq!(outcome.failure_count(), 1);
    }

    #[test]
    fn test_aggregate_is_pure() {
        let results = vec![bad("+1A", "x"), ok("+1B", "m-1")];
        let snapshot = results.clone();
        let first = aggregate(&results);
        let second = aggregate(&results);
        assert_eq!(first, second);
        assert_eq!(results, snapshot);
        assert_eq!(first.per_recipient, results);
    }

    #[test]
    fn test_duplicate_recipient_last_write_wins() {
        let outcome = aggregate(&[bad("+1A", "busy"), ok("+1A", "m-2")]);
        assert_eq!(outcome.attributes["status.+1A"], "m-2");
        assert_eq!(outcome.attributes["status.count.success"], "1");
        assert_eq!(outcome.attributes["status.count.failure"], "1");
        assert_eq!(outcome.classification, Classification::PartialFailure);
    }

    #[test]
    fn test_empty_results() {
        let outcome = aggregate(&[]);
        assert_eq!(outcome.classification, Classification::AllSucceeded);
        assert_eq!(outcome.attributes.len(), 2);
    }
}
