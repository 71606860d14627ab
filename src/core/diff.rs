//! Inventory diff.
//!
//! Classifies declared secrets against the names currently registered at a
//! target. Values are not looked at here.

use std::collections::BTreeSet;

use crate::core::types::SecretName;

/// What has to happen to one secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Change {
    /// Declared, not registered remotely.
    Create,
    /// Declared and already registered remotely.
    Update,
    /// Registered remotely, not declared, and unspecified secrets are deleted.
    Delete,
}

impl Change {
    pub fn is_delete(self) -> bool {
        matches!(self, Self::Delete)
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// A single entry in a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    name: SecretName,
    change: Change,
}

impl DiffEntry {
    pub fn new(name: SecretName, change: Change) -> Self {
        Self { name, change }
    }

    /// The secret name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn change(&self) -> Change {
        self.change
    }
}

/// The full diff for one target.
///
/// Creates and updates come first, deletes after, which is the order the
/// apply step issues them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    entries: Vec<DiffEntry>,
}

impl Diff {
    /// Compute the diff.
    ///
    /// # Arguments
    ///
    /// * `desired` - Declared secret names
    /// * `observed` - Names registered remotely, as fetched for this run
    /// * `delete_unspecified` - Whether undeclared remote names are deleted
    ///
    /// Every classification is made against `observed` as given; nothing
    /// is removed from it while the pass runs.
    pub fn compute<'a, I>(
        desired: I,
        observed: &BTreeSet<SecretName>,
        delete_unspecified: bool,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let desired: BTreeSet<&str> = desired.into_iter().collect();

        let mut entries: Vec<DiffEntry> = desired
            .iter()
            .map(|name| {
                let change = if observed.contains(*name) {
                    Change::Update
                } else {
                    Change::Create
                };
                DiffEntry::new((*name).to_string(), change)
            })
            .collect();

        if delete_unspecified {
            entries.extend(
                observed
                    .iter()
                    .filter(|name| !desired.contains(name.as_str()))
                    .map(|name| DiffEntry::new(name.clone(), Change::Delete)),
            );
        }

        Self { entries }
    }

    /// All entries.
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    /// Only entries with the given change.
    pub fn with_change(&self, change: Change) -> Vec<&DiffEntry> {
        self.entries.iter().filter(|e| e.change == change).collect()
    }

    /// Only create entries.
    pub fn creates(&self) -> Vec<&DiffEntry> {
        self.with_change(Change::Create)
    }

    /// Only update entries.
    pub fn updates(&self) -> Vec<&DiffEntry> {
        self.with_change(Change::Update)
    }

    /// Only delete entries.
    pub fn deletes(&self) -> Vec<&DiffEntry> {
        self.with_change(Change::Delete)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
