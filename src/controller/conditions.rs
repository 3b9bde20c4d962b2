//! Condition management helpers following Kubernetes API conventions

use chrono::Utc;

use crate::crd::Condition;

/// Standard condition types following Kubernetes conventions
pub const CONDITION_TYPE_READY: &str = "Ready";
pub const CONDITION_TYPE_PROGRESSING: &str = "Progressing";
pub const CONDITION_TYPE_DEGRADED: &str = "Degraded";

/// Standard condition statuses
pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";

/// Update or add a condition to the conditions list
///
/// The transition time only moves when the status changes.
pub fn set_condition(
    conditions: &mut Vec<Condition>,
    type_: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) {
    let now = Utc::now().to_rfc3339();

    if let Some(existing) = conditions.iter_mut().find(|c| c.type_ == type_) {
        if existing.status != status {
            existing.last_transition_time = now;
        }
        existing.status = status.to_string();
        existing.reason = reason.to_string();
        existing.message = message.to_string();
        existing.observed_generation = observed_generation;
    } else {
        conditions.push(Condition {
            type_: type_.to_string(),
            status: status.to_string(),
            last_transition_time: now,
            reason: reason.to_string(),
            message: message.to_string(),
            observed_generation,
        });
    }
}

/// Find a condition by type
pub fn find_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

pub fn is_condition_true(conditions: &[Condition], type_: &str) -> bool {
    find_condition(conditions, type_)
        .map(|c| c.status == CONDITION_STATUS_TRUE)
        .unwrap_or(false)
}

pub fn remove_condition(conditions: &mut Vec<Condition>, type_: &str) {
    conditions.retain(|c| c.type_ != type_);
}

/// Record a successful apply: Ready, not progressing, not degraded
pub fn mark_ready(
    conditions: &mut Vec<Condition>,
    generation: Option<i64>,
    reason: &str,
    message: &str,
) {
    set_condition(
        conditions,
        CONDITION_TYPE_READY,
        CONDITION_STATUS_TRUE,
        reason,
        message,
        generation,
    );
    set_condition(
        conditions,
        CONDITION_TYPE_PROGRESSING,
        CONDITION_STATUS_FALSE,
        reason,
        "Remote resource matches the spec",
        generation,
    );
    remove_condition(conditions, CONDITION_TYPE_DEGRADED);
}

/// Record a failed apply
///
/// A retriable failure leaves the resource progressing; anything else marks
/// it degraded until the spec or the remote side changes.
pub fn mark_failed(
    conditions: &mut Vec<Condition>,
    generation: Option<i64>,
    reason: &str,
    message: &str,
    retriable: bool,
) {
    set_condition(
        conditions,
        CONDITION_TYPE_READY,
        CONDITION_STATUS_FALSE,
        reason,
        message,
        generation,
    );
    if retriable {
        set_condition(
            conditions,
            CONDITION_TYPE_PROGRESSING,
            CONDITION_STATUS_TRUE,
            "Retrying",
            message,
            generation,
        );
        remove_condition(conditions, CONDITION_TYPE_DEGRADED);
    } else {
        set_condition(
            conditions,
            CONDITION_TYPE_PROGRESSING,
            CONDITION_STATUS_FALSE,
            reason,
            message,
            generation,
        );
        set_condition(
            conditions,
            CONDITION_TYPE_DEGRADED,
            CONDITION_STATUS_TRUE,
            reason,
            message,
            generation,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_condition_adds_new() {
        let mut conditions = Vec::new();
        set_condition(
            &mut conditions,
            CONDITION_TYPE_READY,
            CONDITION_STATUS_TRUE,
            "Reconciled",
            "Channel is in sync",
            Some(3),
        );

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].type_, CONDITION_TYPE_READY);
        assert_eq!(conditions[0].observed_generation, Some(3));
    }

    #[test]
    fn test_transition_time_moves_only_on_status_change() {
        let mut conditions = vec![Condition {
            type_: CONDITION_TYPE_READY.to_string(),
            status: CONDITION_STATUS_FALSE.to_string(),
            last_transition_time: "2024-01-01T00:00:00Z".to_string(),
            reason: "RemoteError".to_string(),
            message: "StartChannel failed".to_string(),
            observed_generation: None,
        }];

        set_condition(
            &mut conditions,
            CONDITION_TYPE_READY,
            CONDITION_STATUS_FALSE,
            "RemoteError",
            "UpdateChannel failed",
            None,
        );
        assert_eq!(conditions[0].last_transition_time, "2024-01-01T00:00:00Z");
        assert_eq!(conditions[0].message, "UpdateChannel failed");

        set_condition(
            &mut conditions,
            CONDITION_TYPE_READY,
            CONDITION_STATUS_TRUE,
            "Reconciled",
            "ok",
            None,
        );
        assert_ne!(conditions[0].last_transition_time, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_failure_then_recovery() {
        let mut conditions = Vec::new();

        mark_failed(&mut conditions, Some(1), "RemoteError", "bad request", false);
        assert!(!is_condition_true(&conditions, CONDITION_TYPE_READY));
        assert!(is_condition_true(&conditions, CONDITION_TYPE_DEGRADED));

        mark_ready(&mut conditions, Some(2), "Reconciled", "in sync");
        assert!(is_condition_true(&conditions, CONDITION_TYPE_READY));
        assert!(find_condition(&conditions, CONDITION_TYPE_DEGRADED).is_none());
    }

    #[test]
    fn test_retriable_failure_is_progressing() {
        let mut conditions = Vec::new();
        mark_failed(&mut conditions, None, "RemoteError", "throttled", true);

        assert!(is_condition_true(&conditions, CONDITION_TYPE_PROGRESSING));
        assert!(find_condition(&conditions, CONDITION_TYPE_DEGRADED).is_none());
    }
}
