//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::BTreeMap;

/// A secret name as registered on the platform (e.g., DEPLOY_TOKEN).
pub type SecretName = String;

/// A sealed secret value (base64 of the sealed-box ciphertext).
pub type SealedValue = String;

/// Identifier of the public key a value was sealed for.
pub type KeyId = String;

/// Numeric repository identifier.
pub type RepositoryId = u64;

/// Workflow file name (e.g., `ci.yml`).
pub type WorkflowFile = String;

/// Organization repository ids keyed by repository name.
pub type RepositoryIds = BTreeMap<String, RepositoryId>;
