//! Entry points used by the collection transport: storing a document,
//! reading one back and listing a calendar.

use kunai_core::constants::TODO_ENTRY_SUFFIX;
use kunai_core::types::{CalendarId, TodoId};
use kunai_db::db::{TodoFilter, TodoStore};
use kunai_db::db::model::{Todo, TodoValues};
use kunai_rfc::rfc::ical::build::serialize;
use kunai_rfc::rfc::ical::core::ICalendar;
use kunai_rfc::rfc::ical::parse::parse;
use kunai_rfc::rfc::ical::timezone::resolve_tzid;

use super::TodoService;
use crate::context::Context;
use crate::error::{ServiceError, ServiceResult};

impl TodoService {
    /// ## Summary
    /// Decodes a document for `existing`, or for a new to-do in `calendar`.
    ///
    /// ## Side Effects
    /// Categories and locations named by the document are created when
    /// missing.
    ///
    /// ## Errors
    /// Returns `ServiceError::ParseError` when the document has no `VTODO`.
    pub async fn decode(
        &self,
        store: &mut dyn TodoStore,
        existing: Option<&Todo>,
        ical: &ICalendar,
        calendar: CalendarId,
    ) -> ServiceResult<TodoValues> {
        self.decoder
            .decode(store, existing, ical, calendar, None)
            .await
    }

    /// ## Summary
    /// Encodes a to-do and its occurrences for the acting user.
    ///
    /// ## Errors
    /// Returns a database error if the to-do or a sub-record cannot be
    /// loaded.
    pub async fn encode(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo: &Todo,
    ) -> ServiceResult<ICalendar> {
        let user = store.get_user(ctx.user).await?;
        let user_timezone = user.timezone.as_deref().and_then(resolve_tzid);
        self.encoder.encode(store, todo, user_timezone).await
    }

    /// ## Summary
    /// Stores a document in `calendar`, creating a to-do or rewriting
    /// `existing`.
    ///
    /// ## Side Effects
    /// Creates or writes the to-do with its occurrences, fanning out to
    /// attendees.
    ///
    /// ## Errors
    /// - `ServiceError::ParseError` when the body is not a calendar with a
    ///   `VTODO`
    /// - `ServiceError::AccessDenied` when the user does not own `calendar`
    /// - `ServiceError::ValidationError` when the document breaks the
    ///   master/occurrence rules
    #[tracing::instrument(skip(self, store, body), fields(user = %ctx.user, %calendar, ?existing, body_len = body.len()))]
    pub async fn put(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        calendar: CalendarId,
        existing: Option<TodoId>,
        body: &str,
    ) -> ServiceResult<TodoId> {
        self.authorize(store, ctx, calendar).await?;
        let ical = parse(body)?;
        tracing::debug!(todos = ical.todos().len(), "Document parsed");

        if let Some(id) = existing {
            let todo = store.get_todo(id).await?;
            if todo.calendar != calendar || !todo.is_master() {
                return Err(ServiceError::NotFound(format!(
                    "to-do {id} in calendar {calendar}"
                )));
            }
            let values = self.decode(store, Some(&todo), &ical, calendar).await?;
            self.write(store, ctx, &[id], values).await?;
            return Ok(id);
        }

        let values = self.decode(store, None, &ical, calendar).await?;
        self.create(store, ctx, values).await
    }

    /// ## Summary
    /// Serializes the document holding to-do `id`.
    ///
    /// An occurrence is served as part of its master's document.
    ///
    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    #[tracing::instrument(skip(self, store), fields(user = %ctx.user))]
    pub async fn get(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: TodoId,
    ) -> ServiceResult<String> {
        let mut todo = store.get_todo(id).await?;
        self.authorize(store, ctx, todo.calendar).await?;
        if let Some(parent) = todo.parent {
            todo = store.get_todo(parent).await?;
        }
        let ical = self.encode(store, ctx, &todo).await?;
        Ok(serialize(&ical))
    }

    /// ## Summary
    /// Collection entries of `calendar`, one `<uuid>.ics` per master.
    ///
    /// Served from the listing cache when possible. A transaction holding
    /// uncommitted changes bypasses the cache both ways.
    ///
    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own
    /// `calendar`.
    #[tracing::instrument(skip(self, store), fields(user = %ctx.user))]
    pub async fn list(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        calendar: CalendarId,
    ) -> ServiceResult<Vec<String>> {
        self.authorize(store, ctx, calendar).await?;
        let shared = !store.has_pending_changes();
        if shared && let Some(entries) = self.cache.get(&self.database, calendar) {
            tracing::trace!(count = entries.len(), "Listing served from cache");
            return Ok(entries);
        }

        let ids = store
            .find_todos(&TodoFilter::default().calendar(calendar).parent(None))
            .await?;
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let todo = store.get_todo(id).await?;
            entries.push(format!("{}{TODO_ENTRY_SUFFIX}", todo.uuid));
        }
        if shared {
            self.cache.put(&self.database, calendar, entries.clone());
        } else {
            tracing::trace!(%calendar, "Listing read from uncommitted state, not cached");
        }
        Ok(entries)
    }

    /// ## Summary
    /// The master to-do behind a collection entry name, if any.
    ///
    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own
    /// `calendar`.
    pub async fn resolve_entry(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        calendar: CalendarId,
        entry: &str,
    ) -> ServiceResult<Option<TodoId>> {
        self.authorize(store, ctx, calendar).await?;
        let uuid = entry.strip_suffix(TODO_ENTRY_SUFFIX).unwrap_or(entry);
        let ids = store
            .find_todos(
                &TodoFilter::default()
                    .calendar(calendar)
                    .uuid(uuid)
                    .parent(None),
            )
            .await?;
        Ok(ids.first().copied())
    }
}
