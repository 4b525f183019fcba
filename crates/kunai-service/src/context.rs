//! The acting user of a service call.

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use kunai_core::types::UserId;

/// Who is acting, whether access checks are bypassed, and the wall-clock
/// time the call is stamped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub user: UserId,
    /// Superuser mode used by fan-out to write into other users' calendars.
    pub escalated: bool,
    /// Local wall-clock time used for creation and modification stamps.
    pub now: NaiveDateTime,
}

impl Context {
    #[must_use]
    pub const fn new(user: UserId, now: NaiveDateTime) -> Self {
        Self {
            user,
            escalated: false,
            now,
        }
    }

    /// A context stamped with the current time in the `local` zone.
    #[must_use]
    pub fn current(user: UserId, local: Tz) -> Self {
        Self::new(user, Utc::now().with_timezone(&local).naive_local())
    }

    /// The same user acting without access checks.
    #[must_use]
    pub const fn sudo(&self) -> Self {
        Self {
            escalated: true,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sudo_keeps_user_and_time() {
        let ctx = Context::current(UserId(3), chrono_tz::UTC);
        let sudo = ctx.sudo();
        assert!(sudo.escalated);
        assert!(!ctx.escalated);
        assert_eq!(sudo.user, ctx.user);
        assert_eq!(sudo.now, ctx.now);
    }
}
