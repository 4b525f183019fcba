//! `VTODO` encoding from stored to-dos.
//!
//! The stored raw block seeds the output so that properties this crate does
//! not own survive; owned properties are then overwritten or removed.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use kunai_core::constants::MAILTO_PREFIX;
use kunai_db::db::TodoStore;
use kunai_db::db::enums::{Classification, DateKind, RuleKind};
use kunai_db::db::model::Todo;
use kunai_rfc::rfc::ical::core::{Component, ComponentKind, ICalendar, Property, names};
use kunai_rfc::rfc::ical::parse::parse_component;
use kunai_rfc::rfc::ical::timezone::{from_local, local_to_utc, minimal_vtimezone, resolve_tzid};

use crate::codec::{alarm, attendee, date, rule};
use crate::error::ServiceResult;

/// Encodes stored to-dos relative to the server's local zone.
#[derive(Debug, Clone)]
pub struct Encoder {
    local: Tz,
    product_id: String,
}

impl Encoder {
    #[must_use]
    pub fn new(local: Tz, product_id: impl Into<String>) -> Self {
        Self {
            local,
            product_id: product_id.into(),
        }
    }

    /// ## Summary
    /// Encodes a to-do and its occurrences into one document.
    ///
    /// Timestamps are written in the to-do's own timezone, else
    /// `user_timezone`, else the local zone. A minimal `VTIMEZONE` is added
    /// for every zone other than UTC.
    ///
    /// ## Errors
    /// Returns a database error if a sub-record cannot be loaded.
    #[tracing::instrument(skip_all, fields(todo = %todo.id, uuid = %todo.uuid))]
    pub async fn encode(
        &self,
        store: &mut dyn TodoStore,
        todo: &Todo,
        user_timezone: Option<Tz>,
    ) -> ServiceResult<ICalendar> {
        let occurrences = store.occurrences_of(todo.id).await?;
        let mut zones: Vec<Tz> = Vec::new();
        let mut blocks = Vec::with_capacity(occurrences.len() + 1);
        for item in std::iter::once(todo).chain(&occurrences) {
            let target = self.target_zone(item, user_timezone);
            if target != Tz::UTC && target != Tz::Etc__UTC && !zones.contains(&target) {
                zones.push(target);
            }
            blocks.push(self.encode_block(store, item, target).await?);
        }

        let mut ical = ICalendar::new(&self.product_id);
        let created_utc = local_to_utc(todo.create_date, self.local).value;
        for tz in zones {
            ical.add_component(minimal_vtimezone(tz, created_utc));
        }
        for block in blocks {
            ical.add_component(block);
        }
        Ok(ical)
    }

    /// The zone timestamps of `todo` are written in.
    fn target_zone(&self, todo: &Todo, user_timezone: Option<Tz>) -> Tz {
        todo.timezone
            .as_deref()
            .and_then(resolve_tzid)
            .or(user_timezone)
            .unwrap_or(self.local)
    }

    async fn encode_block(
        &self,
        store: &mut dyn TodoStore,
        todo: &Todo,
        target: Tz,
    ) -> ServiceResult<Component> {
        let mut vtodo = seed(todo);
        let datetime = |name: &str, value: NaiveDateTime| {
            Property::datetime(name, from_local(value, self.local, target))
        };

        set_or_remove(
            &mut vtodo,
            names::SUMMARY,
            non_empty(todo.summary.as_ref())
                .map(|summary| Property::text(names::SUMMARY, summary.to_string())),
        );
        set_or_remove(
            &mut vtodo,
            names::PERCENT_COMPLETE,
            todo.percent_complete
                .map(|percent| Property::integer(names::PERCENT_COMPLETE, percent)),
        );
        set_or_remove(
            &mut vtodo,
            names::DESCRIPTION,
            non_empty(todo.description.as_ref()).map(|description| {
                Property::text(names::DESCRIPTION, description.to_string())
            }),
        );
        set_or_remove(
            &mut vtodo,
            names::COMPLETED,
            todo.completed.map(|completed| {
                Property::datetime(names::COMPLETED, local_to_utc(completed, self.local))
            }),
        );
        set_or_remove(
            &mut vtodo,
            names::DTSTART,
            todo.dtstart.map(|dtstart| datetime(names::DTSTART, dtstart)),
        );
        set_or_remove(
            &mut vtodo,
            names::DUE,
            todo.due.map(|due| datetime(names::DUE, due)),
        );

        vtodo.set_property(datetime(names::CREATED, todo.create_date));
        vtodo.set_property(datetime(names::DTSTAMP, todo.last_modified()));
        vtodo.set_property(datetime(names::LAST_MODIFIED, todo.last_modified()));

        let recurrence_id = match (todo.recurrence, todo.parent) {
            (Some(recurrence), Some(_)) => Some(datetime(names::RECURRENCE_ID, recurrence)),
            _ => None,
        };
        set_or_remove(&mut vtodo, names::RECURRENCE_ID, recurrence_id);

        set_or_remove(
            &mut vtodo,
            names::STATUS,
            todo.status
                .map(|status| Property::text(names::STATUS, status.to_ical())),
        );
        vtodo.set_property(Property::text(names::UID, todo.uuid.clone()));
        vtodo.set_property(Property::integer(names::SEQUENCE, todo.sequence));

        let mut categories = Vec::with_capacity(todo.categories.len());
        for id in &todo.categories {
            categories.push(store.get_category(*id).await?.name);
        }
        set_or_remove(
            &mut vtodo,
            names::CATEGORIES,
            (!categories.is_empty()).then(|| Property::text_list(names::CATEGORIES, categories)),
        );

        let foreign_class = vtodo
            .get_property(names::CLASS)
            .is_some_and(|class| Classification::from_ical(class.as_text()).is_none());
        if !foreign_class {
            vtodo.set_property(Property::text(names::CLASS, todo.classification.to_ical()));
        }

        let location = match todo.location {
            Some(id) => Some(Property::text(
                names::LOCATION,
                store.get_location(id).await?.name,
            )),
            None => None,
        };
        set_or_remove(&mut vtodo, names::LOCATION, location);

        set_or_remove(
            &mut vtodo,
            names::ORGANIZER,
            non_empty(todo.organizer.as_ref()).map(|email| {
                Property::cal_address(names::ORGANIZER, format!("{MAILTO_PREFIX}{email}"))
            }),
        );

        self.rebuild_children(store, todo, target, &mut vtodo).await?;
        Ok(vtodo)
    }

    /// Attendees, recurrence sets and alarms are rebuilt from the stored
    /// sub-records, in stored order.
    async fn rebuild_children(
        &self,
        store: &mut dyn TodoStore,
        todo: &Todo,
        target: Tz,
        vtodo: &mut Component,
    ) -> ServiceResult<()> {
        vtodo.remove_property(names::ATTENDEE);
        for record in store.attendees_of(todo.id).await? {
            vtodo.add_property(attendee::from_record(&record));
        }

        for (name, kind) in [
            (names::RDATE, DateKind::Recurrence),
            (names::EXDATE, DateKind::Exception),
        ] {
            vtodo.remove_property(name);
            for record in store.dates_of(todo.id, kind).await? {
                vtodo.add_property(date::to_property(name, &record, self.local, target));
            }
        }

        for (name, kind) in [
            (names::RRULE, RuleKind::Recurrence),
            (names::EXRULE, RuleKind::Exception),
        ] {
            vtodo.remove_property(name);
            for record in store.rules_of(todo.id, kind).await? {
                vtodo.add_property(rule::to_property(name, &record, self.local));
            }
        }

        vtodo.remove_children(ComponentKind::Alarm);
        for record in store.alarms_of(todo.id).await? {
            match alarm::from_record(&record) {
                Ok(valarm) => vtodo.add_child(valarm),
                Err(err) => {
                    tracing::warn!(alarm = %record.id, error = %err, "Skipping unreadable alarm");
                }
            }
        }
        Ok(())
    }
}

/// The stored raw block, or an empty `VTODO`.
fn seed(todo: &Todo) -> Component {
    let Some(raw) = todo.vtodo.as_deref() else {
        return Component::todo();
    };
    match parse_component(raw) {
        Ok(component) if component.kind == ComponentKind::Todo => component,
        Ok(component) => {
            tracing::warn!(todo = %todo.id, name = %component.name, "Stored block is not a VTODO");
            Component::todo()
        }
        Err(err) => {
            tracing::warn!(todo = %todo.id, error = %err, "Stored VTODO does not parse");
            Component::todo()
        }
    }
}

/// An empty text field counts as unset.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|value| !value.is_empty())
}

fn set_or_remove(vtodo: &mut Component, name: &str, property: Option<Property>) {
    match property {
        Some(property) => vtodo.set_property(property),
        None => {
            vtodo.remove_property(name);
        }
    }
}
