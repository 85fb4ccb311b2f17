//! # Keygen-Kit: Declarative Short-Lived Credentials
//!
//! `keygen-kit` is the lifecycle engine behind an infrastructure-as-code
//! provider for short-lived cryptographic credentials: age identities,
//! AWS KMS random byte strings, data keys and data-key pairs.
//!
//! The crate owns the part that is easy to get subtly wrong: deciding
//! whether a previously provisioned credential is still valid, whether a
//! requested change can be applied in place, or whether the credential must
//! be destroyed and regenerated, and in which order. The actual key
//! generation primitives (the age library, the KMS SDK) stay outside,
//! behind the [`CredentialGenerator`] trait.
//!
//! ## Core Concepts
//!
//! - **[`LifecycleEngine`]**: Create / Diff / Update / Delete per resource
//!   instance, with injected clock and generator.
//! - **[`CredentialSpec`]**: the declarative configuration of one resource
//!   kind, described to the generic engine by a static [`KindDescriptor`].
//! - **[`RenewalPolicy`]**: the time-boxed validity shared by every kind;
//!   expiry surfaces in a diff as a replacement under the reserved
//!   `"expired"` field.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keygen_kit::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Error> {
//!     let engine = LifecycleEngine::new(Arc::new(EntropyGenerator::with_os_rng()));
//!     let desired = KmsRandom::new(RenewalPolicy::new(24, 2), 32);
//!
//!     // Create
//!     let created = engine.create("session-salt", &desired, false)?.unwrap();
//!
//!     // Diff: nothing changed, nothing to do
//!     let diff = engine.diff(&created.id, &desired, &created.state);
//!     assert!(!diff.has_changes);
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod descriptor;
pub mod diff;
pub mod generator;
pub mod kinds;
pub mod lifecycle;
pub mod renewal;

// --- Core re-exports ---
pub use common::errors::Error;
pub use common::sensitive::Sensitive;
pub use descriptor::{CredentialSpec, KindDescriptor, ResourceKind};
pub use generator::{CredentialGenerator, EntropyGenerator, GeneratedMaterial, GeneratorRequest};
pub use lifecycle::{DiffResponse, LifecycleEngine, Materialized};
pub use renewal::RenewalPolicy;

// --- Prelude ---
// A collection of the most commonly used traits, structs, and enums.
pub mod prelude {
    pub use crate::common::errors::Error;
    pub use crate::common::sensitive::Sensitive;
    pub use crate::common::traits::{Clock, OsRandom, RandomSource, SystemClock};
    pub use crate::descriptor::{CredentialSpec, FieldValue, KindDescriptor, ResourceKind};
    pub use crate::diff::{ChangeKind, DiffReport, PlanAction};
    pub use crate::generator::{
        CredentialGenerator, EntropyGenerator, GeneratedMaterial, GeneratorRequest,
    };
    pub use crate::kinds::{
        AgeIdentity, DataKeyPairSpec, DataKeySpec, KmsDataKey, KmsDataKeyPair, KmsRandom,
    };
    pub use crate::lifecycle::{CreatedInstance, DiffResponse, LifecycleEngine, Materialized};
    pub use crate::renewal::RenewalPolicy;
}
