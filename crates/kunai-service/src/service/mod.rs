//! The to-do service.
//!
//! Wraps the store's record operations with defaults, validation, attendee
//! fan-out and listing cache invalidation. Every call takes the transaction
//! it runs in, so a to-do, its sub-records and its fan-out copies change
//! together or not at all.

mod children;
mod duplicate;
mod fanout;
mod todo;
mod transport;


pub use duplicate::DuplicateDefaults;
pub use todo::on_change_status;

use std::sync::Arc;

use chrono_tz::Tz;
use kunai_core::config::Settings;
use kunai_core::types::{CalendarId, UserId};
use kunai_db::db::TodoStore;

use crate::cache::ListingCache;
use crate::context::Context;
use crate::error::{ServiceError, ServiceResult};
use crate::vtodo::{Decoder, Encoder};

pub struct TodoService {
    local: Tz,
    database: String,
    decoder: Decoder,
    encoder: Encoder,
    cache: Arc<dyn ListingCache>,
}

impl std::fmt::Debug for TodoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoService")
            .field("local", &self.local)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl TodoService {
    /// ## Summary
    /// Builds the service from loaded settings.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if `calendar.timezone` is unknown.
    pub fn new(settings: &Settings, cache: Arc<dyn ListingCache>) -> ServiceResult<Self> {
        Ok(Self::with_timezone(
            settings.local_timezone()?,
            &settings.calendar.product_id,
            &settings.database.name,
            cache,
        ))
    }

    #[must_use]
    pub fn with_timezone(
        local: Tz,
        product_id: &str,
        database: &str,
        cache: Arc<dyn ListingCache>,
    ) -> Self {
        Self {
            local,
            database: database.to_string(),
            decoder: Decoder::new(local),
            encoder: Encoder::new(local, product_id),
            cache,
        }
    }

    #[must_use]
    pub const fn local_timezone(&self) -> Tz {
        self.local
    }

    #[must_use]
    pub const fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    #[must_use]
    pub const fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// A context for `user`, stamped with the current local time.
    #[must_use]
    pub fn context(&self, user: UserId) -> Context {
        Context::current(user, self.local)
    }

    /// ## Summary
    /// Checks that the acting user owns `calendar`.
    ///
    /// ## Errors
    /// Returns `ServiceError::AccessDenied` unless the context is escalated
    /// or the user owns the calendar.
    async fn authorize(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        calendar: CalendarId,
    ) -> ServiceResult<()> {
        if ctx.escalated {
            return Ok(());
        }
        let calendar = store.get_calendar(calendar).await?;
        if calendar.owner != ctx.user {
            tracing::debug!(user = %ctx.user, calendar = %calendar.id, "Calendar not owned by acting user");
            return Err(ServiceError::AccessDenied(format!(
                "calendar {} is not owned by user {}",
                calendar.id, ctx.user
            )));
        }
        Ok(())
    }

    fn invalidate_cache(&self) {
        self.cache.invalidate(&self.database);
    }
}
