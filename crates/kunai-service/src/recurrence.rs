//! Master/occurrence rules.
//!
//! A to-do is either a master (no parent) or an occurrence overriding one
//! instance of its parent. An occurrence may not be recurring itself.

use kunai_core::constants::INVALID_RECURRENCE_MESSAGE;
use kunai_core::types::TodoId;
use kunai_db::db::TodoStore;
use kunai_db::db::enums::{DateKind, RuleKind};
use kunai_db::db::model::TodoValues;
use kunai_rfc::rfc::ical::timezone::known_timezones;

use crate::error::{ServiceError, ServiceResult};

fn invalid_recurrence() -> ServiceError {
    ServiceError::ValidationError(INVALID_RECURRENCE_MESSAGE.to_string())
}

/// ## Summary
/// Rejects a change set that marks a block as an occurrence and also gives
/// it recurrence data.
///
/// ## Errors
/// Returns `ServiceError::ValidationError` when the invariant is violated.
pub fn validate_values(values: &TodoValues) -> ServiceResult<()> {
    let occurrence = matches!(values.fields.recurrence, Some(Some(_)))
        || matches!(values.fields.parent, Some(Some(_)));
    if occurrence && values.creates_recurrence_data() {
        return Err(invalid_recurrence());
    }
    Ok(())
}

/// ## Summary
/// Checks a stored to-do against the master/occurrence rules.
///
/// - an occurrence has no recurrence or exception dates or rules, and no
///   occurrences of its own
/// - `recurrence` is set exactly when `parent` is set
/// - a parent shares the occurrence's `uuid` and calendar and is a master
/// - `timezone`, when set, names a known zone
///
/// ## Errors
/// Returns `ServiceError::ValidationError` describing the first failed rule.
pub async fn validate(store: &mut dyn TodoStore, id: TodoId) -> ServiceResult<()> {
    let todo = store.get_todo(id).await?;

    if todo.parent.is_some() || todo.recurrence.is_some() {
        let recurring = !store.dates_of(id, DateKind::Recurrence).await?.is_empty()
            || !store.dates_of(id, DateKind::Exception).await?.is_empty()
            || !store.rules_of(id, RuleKind::Recurrence).await?.is_empty()
            || !store.rules_of(id, RuleKind::Exception).await?.is_empty()
            || !store.occurrences_of(id).await?.is_empty();
        if recurring {
            tracing::debug!(%id, "Occurrence carries recurrence data");
            return Err(invalid_recurrence());
        }
    }

    match (todo.parent, todo.recurrence) {
        (Some(parent_id), Some(_)) => {
            let parent = store.get_todo(parent_id).await?;
            if parent.uuid != todo.uuid || parent.calendar != todo.calendar || !parent.is_master()
            {
                return Err(ServiceError::ValidationError(format!(
                    "Parent {parent_id} is not a master of the same to-do and calendar"
                )));
            }
        }
        (None, None) => {}
        _ => {
            return Err(ServiceError::ValidationError(
                "Recurrence must be set exactly for occurrences".to_string(),
            ));
        }
    }

    if let Some(timezone) = &todo.timezone
        && !known_timezones().any(|name| name == timezone)
    {
        return Err(ServiceError::ValidationError(format!(
            "Unknown timezone: {timezone}"
        )));
    }
    Ok(())
}
