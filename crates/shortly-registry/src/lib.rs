//! The shortly link registry.
//!
//! [`Registry`] owns the slug-to-link mapping: it generates slugs, rejects
//! collisions, runs the safety checklist and writes the whole mapping back
//! to its [`KeyValueStore`] after every change. Presentation concerns
//! (prompts, clipboard, navigation) belong to the caller.
//!
//! # Example
//!
//! ```rust
//! use shortly_core::ManualClock;
//! use shortly_generator::RandomGenerator;
//! use shortly_registry::{Registry, RegistrySettings};
//! use shortly_storage::MemoryStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new(
//!     MemoryStore::new(),
//!     RandomGenerator::seeded(7),
//!     ManualClock::at_millis(0),
//!     RegistrySettings::default(),
//! );
//! registry.load()?;
//!
//! let created = registry.create_short_link("https://example.com", "")?;
//! let record = registry.resolve(created.slug.as_str())?;
//! assert_eq!(record.original, "https://example.com");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod direct_open;
pub mod registry;
pub mod settings;

pub use direct_open::{requested_slug, share_url, GO_PARAM};
pub use registry::{CreatedLink, Registry};
pub use settings::{CorruptStatePolicy, RegistrySettings, DEFAULT_STORAGE_KEY};
pub use shortly_core::error::Result;
pub use shortly_core::{
    evaluate_safety, KeyValueStore, LinkRecord, RegistryError, SafetyWarning, Slug,
};
