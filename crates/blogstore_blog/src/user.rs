//! Users.

use crate::first;
use blogstore_core::{CoreResult, Filter, Query, Record};

/// Email column, stored lowercase.
pub const EMAIL: &str = "user_email";
/// Role column.
pub const ROLE: &str = "user_role";
/// Role of the blog administrator.
pub const ADMIN_ROLE: &str = "adminRole";

blog_repository!(
    /// Repository of the `user` table.
    UserRepository,
    "user"
);

impl UserRepository {
    /// Finds a user by email, ignoring case and surrounding whitespace.
    pub fn by_email(&self, email: &str) -> CoreResult<Option<Record>> {
        let normalized = email.trim().to_lowercase();
        first(self, Query::new().filter(Filter::eq(EMAIL, normalized)))
    }

    /// The administrator.
    pub fn admin(&self) -> CoreResult<Option<Record>> {
        first(self, Query::new().filter(Filter::eq(ROLE, ADMIN_ROLE)))
    }

    /// Returns true if `email` belongs to the administrator.
    pub fn is_admin_email(&self, email: &str) -> CoreResult<bool> {
        Ok(self
            .by_email(email)?
            .is_some_and(|user| user.opt_str(ROLE).as_deref() == Some(ADMIN_ROLE)))
    }
}
