//! Environment lookups for `fromEnv` secrets.
//!
//! Realization reads through [`EnvLookup`] instead of the process
//! environment directly, so callers can supply fixed values.

use std::collections::{BTreeMap, HashMap};

/// Key-value lookup used when realizing `fromEnv` secrets.
pub trait EnvLookup {
    /// Value of the variable, or `None` if it is not set.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}
