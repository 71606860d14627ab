//! Workflow secret references.
//!
//! Finds `${{ secrets.NAME }}` interpolations in workflow definitions and
//! indexes which files reference which secret. The result is advisory: it
//! only feeds the in-use deletion warning.

use regex::bytes::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use crate::core::types::{SecretName, WorkflowFile};
use crate::core::validation::normalize_name;

static SECRET_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\{\s*secrets\.([^}\s]+)\s*\}\}")
        .expect("secret reference pattern is valid")
});

/// Secret name to the set of workflow files referencing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedSecrets {
    files: BTreeMap<SecretName, BTreeSet<WorkflowFile>>,
}

impl UsedSecrets {
    /// Scan workflow texts keyed by file name.
    pub fn scan<'a, I, B>(files: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, B)>,
        B: AsRef<[u8]>,
    {
        let mut used = Self::default();
        for (file, text) in files {
            for capture in SECRET_REFERENCE.captures_iter(text.as_ref()) {
                let name = normalize_name(&String::from_utf8_lossy(&capture[1]));
                used.insert(name, file.clone());
            }
        }
        used
    }

    /// Record that `file` references `name`.
    pub fn insert(&mut self, name: impl Into<SecretName>, file: impl Into<WorkflowFile>) {
        self.files.entry(name.into()).or_default().insert(file.into());
    }

    /// Add every reference of `other`, prefixing its file names with `qualifier:`.
    pub fn merge_qualified(&mut self, qualifier: &str, other: &UsedSecrets) {
        for (name, files) in &other.files {
            for file in files {
                self.insert(name.clone(), format!("{}:{}", qualifier, file));
            }
        }
    }

    /// Files referencing `name`, if any.
    pub fn files(&self, name: &str) -> Option<&BTreeSet<WorkflowFile>> {
        self.files.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Referenced secret names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Convenience wrapper over [`UsedSecrets::scan`] for an owned map.
pub fn scan_references(files: &BTreeMap<WorkflowFile, Vec<u8>>) -> UsedSecrets {
    UsedSecrets::scan(files.iter())
}
