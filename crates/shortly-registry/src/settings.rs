use typed_builder::TypedBuilder;

/// Key the whole link mapping is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "shortly_demo_links_v1";

/// Total number of generated slugs tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 6;

/// What [`Registry::load`](crate::Registry::load) does when the stored blob
/// exists but cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptStatePolicy {
    /// Report [`RegistryError::CorruptState`](shortly_core::RegistryError::CorruptState)
    /// and leave the registry untouched.
    #[default]
    Fail,
    /// Log a warning and start from an empty mapping. The bad blob is
    /// overwritten by the next successful mutation.
    Reset,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct RegistrySettings {
    #[builder(default = DEFAULT_STORAGE_KEY.to_string(), setter(into))]
    pub storage_key: String,
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,
    #[builder(default)]
    pub corrupt_state: CorruptStatePolicy,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
