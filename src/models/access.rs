//! Viewer capabilities.
//!
//! Every role/ownership decision goes through [`Viewer`] so that handlers and
//! services never compare role strings themselves.

use crate::error::{AppError, AppResult};

use super::user::Role;

/// Client-side pages used as redirect hints
pub mod pages {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/auth/login";
    pub const VERIFY_OTP: &str = "/auth/verify-otp";
    pub const MY_RENTALS: &str = "/my-rentals";
    pub const STUDENT_DASHBOARD: &str = "/dashboard/student";
    pub const STUDENT_ADMIN_DASHBOARD: &str = "/dashboard/student-admin";
    pub const SUPER_ADMIN_DASHBOARD: &str = "/dashboard/super-admin";
}

/// Outcome of a capability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Access::Allow
        } else {
            Access::Deny
        }
    }

    pub fn is_allowed(self) -> bool {
        self == Access::Allow
    }

    /// Turn a denial into a 403 with the given message
    pub fn or_forbidden(self, message: &str) -> AppResult<()> {
        match self {
            Access::Allow => Ok(()),
            Access::Deny => Err(AppError::Authorization(message.to_string())),
        }
    }
}

/// The authenticated requester, reduced to what access decisions need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: i32,
    pub role: Role,
}

impl Viewer {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Dashboard page matching the viewer's role
    pub fn dashboard(&self) -> &'static str {
        match self.role {
            Role::SuperAdmin => pages::SUPER_ADMIN_DASHBOARD,
            Role::StudentAdmin => pages::STUDENT_ADMIN_DASHBOARD,
            Role::Student => pages::STUDENT_DASHBOARD,
        }
    }

    /// Adding games to the catalog
    pub fn can_list_games(&self) -> Access {
        Access::from_bool(self.is_admin())
    }

    /// Editing a game, toggling its availability and deciding on its rentals
    pub fn can_manage_game(&self, added_by: Option<i32>) -> Access {
        Access::from_bool(self.is_super_admin() || added_by == Some(self.user_id))
    }

    pub fn require_game_manager(&self, added_by: Option<i32>) -> AppResult<()> {
        self.can_manage_game(added_by)
            .or_forbidden("You don't have permission to manage this game.")
    }

    /// Paying for a rental
    pub fn can_pay_for(&self, renter_id: i32) -> Access {
        Access::from_bool(renter_id == self.user_id)
    }

    /// Revenue and spending figures of another user's profile
    pub fn can_see_financials_of(&self, target_id: i32) -> Access {
        Access::from_bool(self.is_super_admin() || target_id == self.user_id)
    }

    /// The student admin dashboard (own games and their rentals)
    pub fn can_view_admin_dashboard(&self) -> Access {
        Access::from_bool(self.is_admin())
    }

    /// Global dashboards and user management
    pub fn can_oversee(&self) -> Access {
        Access::from_bool(self.is_super_admin())
    }

    pub fn require_super_admin(&self) -> AppResult<()> {
        self.can_oversee()
            .or_forbidden("Super administrator privileges required")
    }
}
