//! Secretsync - Declarative GitHub Actions secrets for repositories,
//! environments and organizations.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── sync          # Plan, gate and apply
//! │   ├── validate      # Offline configuration check
//! │   ├── report        # Plan and apply rendering
//! │   └── output        # Terminal helpers
//! └── core/             # Core library components
//!     ├── config        # secrets.yml model and loading
//!     ├── secrets       # Value realization
//!     ├── seal          # Sealed-box encryption
//!     ├── scan          # Workflow secret references
//!     ├── diff          # Inventory diff
//!     ├── visibility    # Organization secret scoping
//!     ├── plan          # Per-target plan assembly
//!     ├── planner       # Run planning against a remote
//!     ├── apply         # Ordered, gated apply
//!     └── remote/       # Remote secrets API
//!         ├── mod       # Remote trait
//!         ├── github    # REST implementation
//!         └── memory    # In-memory implementation
//! ```
//!
//! # Features
//!
//! - Values sealed locally with the target's public key
//! - Repository, environment and organization targets
//! - Deletion of undeclared secrets, guarded by workflow references
//! - Dry runs that show the full plan without touching anything

pub mod cli;
pub mod core;
pub mod error;
