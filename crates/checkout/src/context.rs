//! Caller identity for ownership checks.

use domain::UserId;

/// The authenticated caller of a checkout operation.
///
/// Built by the HTTP layer from the upstream auth output; the engine only
/// consults it for ownership and admin checks. How the identity was
/// established is outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// The authenticated user.
    pub user_id: UserId,

    /// Whether the caller holds the admin role.
    pub admin: bool,
}

impl Caller {
    /// Creates a regular user caller.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            admin: false,
        }
    }

    /// Creates an admin caller.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            admin: true,
        }
    }

    /// Returns true if the caller owns an order placed by `owner`.
    pub fn owns(&self, owner: UserId) -> bool {
        self.user_id == owner
    }

    /// Returns true if the caller may act on an order placed by `owner`.
    ///
    /// Admins may act on any order.
    pub fn can_act_on(&self, owner: UserId) -> bool {
        self.admin || self.owns(owner)
    }
}
