//! Reconciliation targets.

use std::fmt;

/// A unit of reconciliation: one place on the platform where secrets live.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyncTarget {
    /// Repository-level secrets.
    Repository { owner: String, name: String },
    /// Secrets of one deployment environment of a repository.
    Environment {
        owner: String,
        name: String,
        environment: String,
    },
    /// Organization-level secrets.
    Organization { name: String },
}

impl SyncTarget {
    pub fn repository(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Repository {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn environment(
        owner: impl Into<String>,
        name: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self::Environment {
            owner: owner.into(),
            name: name.into(),
            environment: environment.into(),
        }
    }

    pub fn organization(name: impl Into<String>) -> Self {
        Self::Organization { name: name.into() }
    }

    /// Whether this is an organization target.
    pub fn is_organization(&self) -> bool {
        matches!(self, Self::Organization { .. })
    }

    /// The owning account: repository owner or organization name.
    pub fn account(&self) -> &str {
        match self {
            Self::Repository { owner, .. } | Self::Environment { owner, .. } => owner,
            Self::Organization { name } => name,
        }
    }

    /// `owner/name` of the repository this target belongs to, if any.
    pub fn repository_name(&self) -> Option<String> {
        match self {
            Self::Repository { owner, name } | Self::Environment { owner, name, .. } => {
                Some(format!("{}/{}", owner, name))
            }
            Self::Organization { .. } => None,
        }
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repository { owner, name } => write!(f, "{}/{}", owner, name),
            Self::Environment {
                owner,
                name,
                environment,
            } => write!(f, "{}/{} (env {})", owner, name, environment),
            Self::Organization { name } => write!(f, "org {}", name),
        }
    }
}
