//! Role-derived capabilities used to decide which operations to offer.
//!
//! These checks are advisory: the backend enforces authority and answers 403
//! when a caller oversteps. The client uses them to avoid offering operations
//! that are bound to fail.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{Role, User};

/// Something a signed-in user may be allowed to do beyond self-service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Review (approve/reject) leave requests and see leave statistics.
    ReviewLeave,
    /// Create, generate and update salary records.
    ManagePayroll,
    /// Approve registrations, edit accounts and roles.
    ManageUsers,
}

impl Capability {
    /// Roles granting this capability.
    pub fn granted_to(&self) -> &'static [Role] {
        match self {
            Capability::ReviewLeave => &[Role::Admin, Role::Hr, Role::Manager],
            Capability::ManagePayroll | Capability::ManageUsers => &[Role::Admin, Role::Hr],
        }
    }
}

/// Capabilities resolved from a set of roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    roles: BTreeSet<Role>,
}

impl AccessPolicy {
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self::from_roles(user.roles.iter().copied())
    }

    pub fn allows(&self, capability: Capability) -> bool {
        capability
            .granted_to()
            .iter()
            .any(|role| self.roles.contains(role))
    }

    pub fn has_management_access(&self) -> bool {
        self.allows(Capability::ReviewLeave)
    }

    pub fn can_manage_payroll(&self) -> bool {
        self.allows(Capability::ManagePayroll)
    }

    pub fn can_manage_users(&self) -> bool {
        self.allows(Capability::ManageUsers)
    }

    /// All capabilities granted, in a stable order.
    pub fn capabilities(&self) -> Vec<Capability> {
        [
            Capability::ReviewLeave,
            Capability::ManagePayroll,
            Capability::ManageUsers,
        ]
        .into_iter()
        .filter(|c| self.allows(*c))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employees_have_no_management_capabilities() {
        let policy = AccessPolicy::from_roles([Role::Employee]);
        assert!(policy.capabilities().is_empty());
    }

    #[test]
    fn managers_review_leave_only() {
        let policy = AccessPolicy::from_roles([Role::Employee, Role::Manager]);
        assert!(policy.has_management_access());
        assert!(!policy.can_manage_payroll());
        assert!(!policy.can_manage_users());
    }

    #[test]
    fn hr_and_admin_get_everything() {
        for role in [Role::Hr, Role::Admin] {
            let policy = AccessPolicy::from_roles([role]);
            assert_eq!(
                policy.capabilities(),
                vec![
                    Capability::ReviewLeave,
                    Capability::ManagePayroll,
                    Capability::ManageUsers
                ]
            );
        }
    }
}
