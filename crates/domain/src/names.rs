//! Typed identifiers for roles, workspaces, modules and the records that own them.
//!
//! Every identifier is a name string in the underlying store. The newtypes keep
//! those strings from being used in the wrong position while preserving the
//! lookup-by-name semantics.

use climoro_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonEmptyString);

        impl $name {
            /// Creates a validated name.
            pub fn new(value: impl Into<String>) -> AppResult<Self> {
                NonEmptyString::new(value).map(Self)
            }

            /// Wraps a compile-time literal.
            #[must_use]
            pub fn from_static(value: &'static str) -> Self {
                Self(NonEmptyString::from_static(value))
            }

            /// Returns the underlying name.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str(self.0.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = climoro_core::AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::new(value)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

name_type!(
    /// Name of an access role, e.g. `Scope 1 Stationary Access`.
    RoleName
);

name_type!(
    /// Human label of a workspace page, e.g. `Stationary Emissions`.
    WorkspaceLabel
);

name_type!(
    /// Storage key of a workspace record.
    WorkspaceName
);

name_type!(
    /// Application module name, e.g. `Scope 1` or `Setup`.
    ModuleName
);

name_type!(
    /// Document type that permission entries are attached to.
    DocTypeName
);

name_type!(
    /// Company name used to group onboarding records and users.
    CompanyName
);

name_type!(
    /// User account key (the login email in the underlying store).
    UserId
);
