//! `VTODO` decoding into the diff language.
//!
//! Each field is decoded on its own. A property that is absent clears its
//! field; on a create that is the same as leaving the default.

use chrono_tz::Tz;
use kunai_core::types::{AttendeeId, CalendarId, CategoryId, LocationId, TodoId};
use kunai_db::db::TodoStore;
use kunai_db::db::enums::{Classification, DateKind, RuleKind, TodoStatus};
use kunai_db::db::model::{
    AttendeeValues, CategoryOp, ChildOp, Todo, TodoFields, TodoValues,
};
use kunai_rfc::rfc::ical::build::serialize_component;
use kunai_rfc::rfc::ical::core::{Component, ICalendar, names};
use kunai_rfc::rfc::ical::timezone::resolve_tzid;

use super::local_datetime;
use crate::codec::{alarm, attendee, date, rule, strip_mailto};
use crate::error::{ServiceError, ServiceResult};

/// Decodes `VTODO` blocks relative to the server's local zone.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    local: Tz,
}

impl Decoder {
    #[must_use]
    pub const fn new(local: Tz) -> Self {
        Self { local }
    }

    /// ## Summary
    /// Decodes a document into a change set for `existing`, or for a new
    /// to-do in `calendar` when `existing` is `None`.
    ///
    /// Without an explicit `block` the first `VTODO` is the master and every
    /// other top-level `VTODO` is decoded as one of its occurrences. They are
    /// matched to existing occurrences by their `RECURRENCE-ID`; unmatched
    /// existing occurrences are deleted.
    ///
    /// ## Side Effects
    /// Categories and locations named by the document are created when
    /// missing.
    ///
    /// ## Errors
    /// Returns `ServiceError::ParseError` when the document has no `VTODO`,
    /// or a database error from the lookups.
    #[tracing::instrument(skip_all, fields(existing = ?existing.map(|t| t.id), calendar = %calendar))]
    pub async fn decode(
        &self,
        store: &mut dyn TodoStore,
        existing: Option<&Todo>,
        ical: &ICalendar,
        calendar: CalendarId,
        block: Option<&Component>,
    ) -> ServiceResult<TodoValues> {
        let (master, overrides) = if let Some(block) = block {
            (block, Vec::new())
        } else {
            let mut todos = ical.todos().into_iter();
            let master = todos
                .next()
                .ok_or_else(|| ServiceError::ParseError("calendar has no VTODO".to_string()))?;
            (master, todos.collect())
        };

        let mut values = self
            .decode_block(store, existing, ical, calendar, master)
            .await?;

        let mut unmatched = match existing {
            Some(todo) => store.occurrences_of(todo.id).await?,
            None => Vec::new(),
        };
        let uuid = existing
            .map(|todo| todo.uuid.clone())
            .or_else(|| values.fields.uuid.clone());

        for block in overrides {
            let recurrence = block
                .get_property(names::RECURRENCE_ID)
                .and_then(|prop| local_datetime(prop, self.local));
            let matched = recurrence.and_then(|recurrence| {
                unmatched
                    .iter()
                    .position(|occurrence| occurrence.recurrence == Some(recurrence))
                    .map(|index| unmatched.remove(index))
            });

            let mut occurrence = self
                .decode_block(store, matched.as_ref(), ical, calendar, block)
                .await?;
            occurrence.fields.uuid.clone_from(&uuid);
            match matched {
                Some(matched) => values
                    .occurrences
                    .push(ChildOp::Write(matched.id, occurrence)),
                None => values.occurrences.push(ChildOp::Create(occurrence)),
            }
        }

        if !unmatched.is_empty() {
            let ids: Vec<TodoId> = unmatched.iter().map(|todo| todo.id).collect();
            tracing::debug!(count = ids.len(), "Deleting occurrences missing from document");
            values.occurrences.push(ChildOp::Delete(ids));
        }
        Ok(values)
    }

    async fn decode_block(
        &self,
        store: &mut dyn TodoStore,
        existing: Option<&Todo>,
        ical: &ICalendar,
        calendar: CalendarId,
        vtodo: &Component,
    ) -> ServiceResult<TodoValues> {
        let mut fields = self.decode_fields(vtodo);
        if existing.is_none() {
            fields.uuid = Some(
                vtodo
                    .uid()
                    .map(str::trim)
                    .filter(|uid| !uid.is_empty())
                    .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string),
            );
        }
        fields.calendar = Some(calendar);
        fields.location = Some(match vtodo.get_property(names::LOCATION) {
            Some(prop) => Some(resolve_location(store, prop.as_text()).await?),
            None => None,
        });
        if let Some(timezone) = adopted_timezone(ical) {
            fields.timezone = Some(Some(timezone));
        }
        fields.vtodo = Some(Some(serialize_component(vtodo)));

        let mut values = TodoValues::from_fields(fields);
        values.categories = Some(decode_categories(store, vtodo).await?);
        values.attendees = decode_attendees(store, existing, vtodo).await?;
        self.decode_recurrence_sets(&mut values, existing.is_some(), vtodo);

        if existing.is_some() {
            values.alarms.push(ChildOp::DeleteAll);
        }
        values.alarms.extend(
            vtodo
                .alarms()
                .into_iter()
                .map(|valarm| ChildOp::Create(alarm::to_values(valarm))),
        );
        Ok(values)
    }

    /// Fields read straight from the block's properties.
    fn decode_fields(&self, vtodo: &Component) -> TodoFields {
        let text = |name: &str| vtodo.get_property(name).map(|prop| prop.as_text().to_string());
        let datetime = |name: &str| {
            vtodo
                .get_property(name)
                .and_then(|prop| local_datetime(prop, self.local))
        };

        TodoFields {
            summary: Some(text(names::SUMMARY)),
            description: Some(text(names::DESCRIPTION)),
            percent_complete: Some(
                vtodo
                    .get_property(names::PERCENT_COMPLETE)
                    .and_then(|prop| prop.value.as_integer()),
            ),
            completed: Some(datetime(names::COMPLETED)),
            dtstart: Some(datetime(names::DTSTART)),
            due: Some(datetime(names::DUE)),
            recurrence: Some(datetime(names::RECURRENCE_ID)),
            status: Some(text(names::STATUS).and_then(|status| {
                let parsed = TodoStatus::from_ical(&status);
                if parsed.is_none() {
                    tracing::warn!(%status, "Clearing unknown STATUS");
                }
                parsed
            })),
            classification: Some(
                text(names::CLASS)
                    .and_then(|class| Classification::from_ical(&class))
                    .unwrap_or_default(),
            ),
            organizer: Some(
                vtodo
                    .get_property(names::ORGANIZER)
                    .map(|prop| strip_mailto(prop.as_text().trim()).to_string()),
            ),
            ..TodoFields::default()
        }
    }

    /// `RDATE`, `EXDATE`, `RRULE` and `EXRULE` are replaced wholesale.
    fn decode_recurrence_sets(&self, values: &mut TodoValues, update: bool, vtodo: &Component) {
        if update {
            values.rdates.push(ChildOp::DeleteAll);
            values.exdates.push(ChildOp::DeleteAll);
            values.rrules.push(ChildOp::DeleteAll);
            values.exrules.push(ChildOp::DeleteAll);
        }
        for (name, kind) in [
            (names::RDATE, DateKind::Recurrence),
            (names::EXDATE, DateKind::Exception),
        ] {
            let ops = match kind {
                DateKind::Recurrence => &mut values.rdates,
                DateKind::Exception => &mut values.exdates,
            };
            for prop in vtodo.get_properties(name) {
                ops.extend(
                    date::to_values(prop, self.local)
                        .into_iter()
                        .map(ChildOp::Create),
                );
            }
        }
        for (name, kind) in [
            (names::RRULE, RuleKind::Recurrence),
            (names::EXRULE, RuleKind::Exception),
        ] {
            let ops = match kind {
                RuleKind::Recurrence => &mut values.rrules,
                RuleKind::Exception => &mut values.exrules,
            };
            for prop in vtodo.get_properties(name) {
                ops.extend(rule::to_values(prop, self.local).map(ChildOp::Create));
            }
        }
    }
}

/// Zone of the document's first `VTIMEZONE`, when it names a known zone.
fn adopted_timezone(ical: &ICalendar) -> Option<String> {
    let vtimezone = ical.timezones().into_iter().next()?;
    let tzid = vtimezone.get_property(names::TZID)?.as_text();
    let resolved = resolve_tzid(tzid);
    if resolved.is_none() {
        tracing::debug!(%tzid, "VTIMEZONE does not name a known zone");
    }
    resolved.map(|tz| tz.name().to_string())
}

/// Finds the first location with this exact name, creating it if needed.
async fn resolve_location(
    store: &mut dyn TodoStore,
    name: &str,
) -> ServiceResult<LocationId> {
    if let Some(location) = store.find_location(name).await? {
        return Ok(location.id);
    }
    Ok(store.insert_location(name).await?)
}

/// Resolves category names to ids, creating the missing ones.
async fn decode_categories(
    store: &mut dyn TodoStore,
    vtodo: &Component,
) -> ServiceResult<CategoryOp> {
    let props = vtodo.get_properties(names::CATEGORIES);
    if props.is_empty() {
        return Ok(CategoryOp::UnlinkAll);
    }

    let mut wanted: Vec<String> = Vec::new();
    for prop in props {
        let labels = match prop.value.as_text_list() {
            Some(list) => list.to_vec(),
            None => vec![prop.as_text().to_string()],
        };
        for name in labels {
            let name = name.trim().to_string();
            if !name.is_empty() && !wanted.contains(&name) {
                wanted.push(name);
            }
        }
    }

    let found = store.find_categories(&wanted).await?;
    let mut ids: Vec<CategoryId> = Vec::with_capacity(wanted.len());
    for name in &wanted {
        let id = match found.iter().find(|category| category.name == *name) {
            Some(category) => category.id,
            None => store.insert_category(name).await?,
        };
        ids.push(id);
    }
    Ok(CategoryOp::Set(ids))
}

/// Attendees are matched to existing ones by email. Existing attendees
/// missing from the block are deleted.
async fn decode_attendees(
    store: &mut dyn TodoStore,
    existing: Option<&Todo>,
    vtodo: &Component,
) -> ServiceResult<Vec<ChildOp<AttendeeId, AttendeeValues>>> {
    let mut remaining: Vec<(String, AttendeeId)> = match existing {
        Some(todo) => store
            .attendees_of(todo.id)
            .await?
            .into_iter()
            .map(|attendee| (attendee.email, attendee.id))
            .collect(),
        None => Vec::new(),
    };

    let mut ops = Vec::new();
    for prop in vtodo.get_properties(names::ATTENDEE) {
        let Some(values) = attendee::to_values(prop) else {
            continue;
        };
        match remaining.iter().position(|(email, _)| *email == values.email) {
            Some(index) => {
                let (_, id) = remaining.remove(index);
                ops.push(ChildOp::Write(id, values));
            }
            None => ops.push(ChildOp::Create(values)),
        }
    }
    if !remaining.is_empty() {
        ops.push(ChildOp::Delete(
            remaining.into_iter().map(|(_, id)| id).collect(),
        ));
    }
    Ok(ops)
}
