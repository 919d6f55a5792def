use serde::{Deserialize, Serialize};

/// Role granted to a user account by an administrator.
///
/// The backend is the authority on what each role may do; the client only uses
/// roles to decide which operations are worth offering.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Admin,
    Hr,
    Manager,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Employee, Role::Admin, Role::Hr, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Manager => "manager",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
