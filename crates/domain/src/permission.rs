use serde::{Deserialize, Serialize};

use crate::{DocTypeName, RoleName};

/// Role entity in the permission store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Unique role name.
    pub name: RoleName,
    /// Whether holders may use the desk UI.
    pub desk_access: bool,
}

impl RoleDefinition {
    /// Creates a role with desk access enabled.
    #[must_use]
    pub fn with_desk_access(name: RoleName) -> Self {
        Self {
            name,
            desk_access: true,
        }
    }
}

/// Per-doctype permission entry for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocPermission {
    /// Document type the entry applies to.
    pub doctype: DocTypeName,
    /// Role receiving the capabilities.
    pub role: RoleName,
    /// Field permission level.
    pub permlevel: u8,
    /// Read records.
    pub read: bool,
    /// Print records.
    pub print: bool,
    /// Run reports.
    pub report: bool,
    /// Update records.
    pub write: bool,
    /// Create records.
    pub create: bool,
    /// Delete records.
    pub delete: bool,
    /// Submit records.
    pub submit: bool,
    /// Email records.
    pub email: bool,
    /// Share records.
    pub share: bool,
}

impl DocPermission {
    /// Builds a level-0 read, print and report entry without any write capability.
    #[must_use]
    pub fn read_only(doctype: DocTypeName, role: RoleName) -> Self {
        Self {
            doctype,
            role,
            permlevel: 0,
            read: true,
            print: true,
            report: true,
            write: false,
            create: false,
            delete: false,
            submit: false,
            email: false,
            share: false,
        }
    }

    /// Returns whether the entry grants any mutating capability.
    #[must_use]
    pub fn allows_mutation(&self) -> bool {
        self.write || self.create || self.delete || self.submit
    }
}

#[cfg(test)]
mod tests {
    use super::DocPermission;
    use crate::{DocTypeName, RoleName};

    #[test]
    fn read_only_entry_never_mutates() {
        let entry = DocPermission::read_only(
            DocTypeName::new("GWP Reference").unwrap_or_else(|_| unreachable!()),
            RoleName::new("Scope 1 Access").unwrap_or_else(|_| unreachable!()),
        );

        assert!(entry.read && entry.print && entry.report);
        assert!(!entry.allows_mutation());
        assert_eq!(entry.permlevel, 0);
    }
}
