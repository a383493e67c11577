use crate::settings::{CorruptStatePolicy, RegistrySettings};
use shortly_core::error::Result;
use shortly_core::{
    evaluate_safety, Clock, KeyValueStore, LinkMap, LinkRecord, RegistryError, SafetyWarning,
    Slug, StorageError, SystemClock,
};
use shortly_generator::Generator;
use tracing::{debug, info, trace, warn};
use url::Url;

/// The outcome of a successful [`Registry::create_short_link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedLink {
    pub slug: Slug,
    pub record: LinkRecord,
    /// Advisory output of the safety checklist. Never a reason to fail.
    pub warnings: Vec<SafetyWarning>,
}

/// The link registry.
///
/// This wraps a [`KeyValueStore`], a [`Generator`] and a [`Clock`] to handle:
/// - slug selection (custom or generated, with bounded collision retry)
/// - URL validation and the safety checklist
/// - persisting the whole mapping after every mutation
///
/// The in-memory mapping and the stored blob are kept in step: a mutation
/// whose save fails is undone before the error is returned.
#[derive(Debug)]
pub struct Registry<S, G, C = SystemClock> {
    store: S,
    generator: G,
    clock: C,
    settings: RegistrySettings,
    links: LinkMap,
}

impl<S: KeyValueStore, G: Generator, C: Clock> Registry<S, G, C> {
    /// Creates an empty registry. Call [`Registry::load`] to pick up
    /// previously saved links.
    pub fn new(store: S, generator: G, clock: C, settings: RegistrySettings) -> Self {
        Self {
            store,
            generator,
            clock,
            settings,
            links: LinkMap::new(),
        }
    }

    /// Creates a registry and immediately loads it from `store`.
    pub fn open(store: S, generator: G, clock: C, settings: RegistrySettings) -> Result<Self> {
        let mut registry = Self::new(store, generator, clock, settings);
        registry.load()?;
        Ok(registry)
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.links.contains_key(slug)
    }

    /// Replaces the in-memory mapping with the stored one.
    ///
    /// A missing blob is an empty mapping. An unparsable blob is handled
    /// according to [`RegistrySettings::corrupt_state`].
    pub fn load(&mut self) -> Result<()> {
        let key = self.settings.storage_key.as_str();

        let Some(blob) = self.store.get(key)? else {
            debug!(key, "no stored links, starting empty");
            self.links = LinkMap::new();
            return Ok(());
        };

        match serde_json::from_str::<LinkMap>(&blob) {
            Ok(links) => {
                debug!(key, count = links.len(), "loaded links");
                self.links = links;
                Ok(())
            }
            Err(err) => match self.settings.corrupt_state {
                CorruptStatePolicy::Fail => Err(RegistryError::CorruptState(format!(
                    "stored links under '{key}' do not parse: {err}"
                ))),
                CorruptStatePolicy::Reset => {
                    warn!(key, error = %err, "stored links are corrupt, starting empty");
                    self.links = LinkMap::new();
                    Ok(())
                }
            },
        }
    }

    /// Writes the whole mapping to the store as one blob.
    pub fn save(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.links)
            .map_err(|e| StorageError::Io(format!("failed to serialize links: {e}")))?;
        self.store.set(&self.settings.storage_key, &blob)?;
        trace!(count = self.links.len(), bytes = blob.len(), "saved links");
        Ok(())
    }

    /// Validates `original_url`, picks a slug, stores the link and returns it
    /// along with any safety warnings.
    ///
    /// An empty `custom_slug` means "generate one". A non-empty one is used
    /// verbatim and is never retried on collision.
    pub fn create_short_link(&mut self, original_url: &str, custom_slug: &str) -> Result<CreatedLink> {
        let original = original_url.trim();
        if original.is_empty() {
            return Err(RegistryError::EmptyInput);
        }
        Url::parse(original).map_err(|e| RegistryError::InvalidUrl(format!("{original}: {e}")))?;

        let warnings = evaluate_safety(original);
        if !warnings.is_empty() {
            debug!(url = original, ?warnings, "url raised safety warnings");
        }

        let slug = if custom_slug.is_empty() {
            self.free_generated_slug()?
        } else {
            if self.links.contains_key(custom_slug) {
                return Err(RegistryError::SlugTaken(custom_slug.to_string()));
            }
            Slug::new(custom_slug)?
        };

        let record = LinkRecord::new(original, self.clock.now());
        self.links.insert(slug.clone(), record.clone());

        if let Err(err) = self.save() {
            self.links.remove(&slug);
            return Err(err);
        }

        info!(slug = %slug, url = original, "created short link");
        Ok(CreatedLink {
            slug,
            record,
            warnings,
        })
    }

    fn free_generated_slug(&mut self) -> Result<Slug> {
        let attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=attempts {
            let candidate: Slug = self.generator.generate().into();
            if !self.links.contains_key(&candidate) {
                return Ok(candidate);
            }
            debug!(slug = %candidate, attempt, "generated slug collided");
        }

        Err(RegistryError::SlugExhausted { attempts })
    }

    /// Removes the link for `slug` and persists the result.
    ///
    /// Returns `true` if a link was removed. An unknown slug is not an error
    /// and causes no write.
    pub fn delete_link(&mut self, slug: &str) -> Result<bool> {
        let Some((key, record)) = self.links.remove_entry(slug) else {
            trace!(slug, "delete of unknown slug ignored");
            return Ok(false);
        };

        if let Err(err) = self.save() {
            self.links.insert(key, record);
            return Err(err);
        }

        info!(slug, "deleted short link");
        Ok(true)
    }

    /// Looks up the link for `slug`.
    pub fn resolve(&self, slug: &str) -> Result<LinkRecord> {
        match self.links.get(slug) {
            Some(record) => {
                debug!(slug, url = %record.original, "resolved slug");
                Ok(record.clone())
            }
            None => {
                trace!(slug, "slug not found");
                Err(RegistryError::NotFound(slug.to_string()))
            }
        }
    }

    /// Resolves a direct-open request: either a bare slug or a share URL
    /// carrying the slug in its `go` parameter.
    ///
    /// The request is matched verbatim, like custom slugs are stored.
    pub fn open_request(&self, request: &str) -> Result<(Slug, LinkRecord)> {
        let slug = match crate::direct_open::requested_slug(request) {
            Some(slug) => slug,
            None => Slug::new(request).map_err(|_| RegistryError::NotFound(request.to_string()))?,
        };
        let record = self.resolve(slug.as_str())?;
        Ok((slug, record))
    }

    /// All links, newest first. Links created at the same instant keep slug
    /// order.
    pub fn list_all(&self) -> Vec<(Slug, LinkRecord)> {
        let mut entries: Vec<_> = self
            .links
            .iter()
            .map(|(slug, record)| (slug.clone(), record.clone()))
            .collect();
        entries.sort_by(|(_, a), (_, b)| b.created_at.cmp(&a.created_at));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use shortly_core::ManualClock;
    use shortly_generator::RandomGenerator;
    use shortly_storage::MemoryStore;

    /// Replays a fixed list of slugs, repeating the last one forever.
    struct Scripted(Vec<&'static str>);

    impl Generator for Scripted {
        type Output = Slug;

        fn generate(&mut self) -> Slug {
            let next = if self.0.len() > 1 {
                self.0.remove(0)
            } else {
                self.0[0]
            };
            Slug::new_unchecked(next)
        }
    }

    /// A store whose writes can be switched off.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: std::sync::Arc<std::sync::atomic::AtomicBool>,
    }

    impl FlakyStore {
        fn fail_writes(&self) {
            self.fail_writes
                .store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StorageError::Unavailable("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    fn registry_with<G: Generator>(
        generator: G,
    ) -> (Registry<MemoryStore, G, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::at_millis(1_000);
        let registry = Registry::new(
            store.clone(),
            generator,
            clock.clone(),
            RegistrySettings::default(),
        );
        (registry, store, clock)
    }

    fn stored_blob(store: &MemoryStore) -> serde_json::Value {
        let blob = store.get("shortly_demo_links_v1").unwrap().unwrap();
        serde_json::from_str(&blob).unwrap()
    }

    #[test]
    fn create_with_generated_slug_then_resolve() {
        let (mut registry, _, _) = registry_with(RandomGenerator::seeded(1));

        let created = registry
            .create_short_link("https://example.com/page", "")
            .unwrap();

        assert_eq!(created.slug.as_str().len(), 6);
        assert!(created.warnings.is_empty());
        let record = registry.resolve(created.slug.as_str()).unwrap();
        assert_eq!(record.original, "https://example.com/page");
        assert_eq!(record.created_at.as_millisecond(), 1_000);
    }

    #[test]
    fn create_trims_the_url() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["abc123"]));

        let created = registry
            .create_short_link("  https://example.com  ", "")
            .unwrap();
        assert_eq!(created.record.original, "https://example.com");
    }

    #[test]
    fn create_with_custom_slug() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["unused"]));

        let created = registry
            .create_short_link("https://example.com", "my-link")
            .unwrap();
        assert_eq!(created.slug.as_str(), "my-link");
    }

    #[test]
    fn blank_url_is_empty_input() {
        let (mut registry, store, _) = registry_with(Scripted(vec!["abc123"]));

        assert_eq!(
            registry.create_short_link("   ", "").unwrap_err(),
            RegistryError::EmptyInput
        );
        assert!(store.is_empty());
    }

    #[test]
    fn unparsable_url_is_invalid() {
        let (mut registry, store, _) = registry_with(Scripted(vec!["abc123"]));

        let err = registry.create_short_link("not a url", "").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidUrl(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn warnings_do_not_block_creation() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["abc123"]));

        let created = registry
            .create_short_link("http://192.168.1.1/login", "")
            .unwrap();

        assert_eq!(
            created.warnings,
            vec![
                SafetyWarning::NotHttps,
                SafetyWarning::IpAddressHost,
                SafetyWarning::SensitiveKeywords
            ]
        );
        assert!(registry.contains("abc123"));
    }

    #[test]
    fn duplicate_custom_slug_is_taken() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["unused"]));

        registry
            .create_short_link("https://one.example", "dup")
            .unwrap();
        let err = registry
            .create_short_link("https://two.example", "dup")
            .unwrap_err();

        assert_eq!(err, RegistryError::SlugTaken("dup".to_string()));
        assert_eq!(
            registry.resolve("dup").unwrap().original,
            "https://one.example"
        );
    }

    #[test]
    fn generated_collision_is_retried() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["taken", "taken", "fresh"]));
        registry
            .create_short_link("https://one.example", "taken")
            .unwrap();

        let created = registry
            .create_short_link("https://two.example", "")
            .unwrap();
        assert_eq!(created.slug.as_str(), "fresh");
    }

    #[test]
    fn six_collisions_exhaust_generation() {
        let (mut registry, store, _) = registry_with(Scripted(vec!["taken"]));
        registry
            .create_short_link("https://one.example", "taken")
            .unwrap();
        let before = store.get("shortly_demo_links_v1").unwrap();

        let err = registry
            .create_short_link("https://two.example", "")
            .unwrap_err();

        assert_eq!(err, RegistryError::SlugExhausted { attempts: 6 });
        assert_eq!(registry.len(), 1);
        assert_eq!(store.get("shortly_demo_links_v1").unwrap(), before);
    }

    #[test]
    fn sixth_attempt_can_still_succeed() {
        let (mut registry, _, _) = registry_with(Scripted(vec![
            "taken", "taken", "taken", "taken", "taken", "last",
        ]));
        registry
            .create_short_link("https://one.example", "taken")
            .unwrap();

        let created = registry
            .create_short_link("https://two.example", "")
            .unwrap();
        assert_eq!(created.slug.as_str(), "last");
    }

    #[test]
    fn seeded_generator_collisions_exhaust() {
        let mut preview = RandomGenerator::seeded(99);
        let upcoming: Vec<Slug> = (0..6).map(|_| preview.generate()).collect();

        let (mut registry, _, _) = registry_with(RandomGenerator::seeded(99));
        for slug in &upcoming {
            if !registry.contains(slug.as_str()) {
                registry
                    .create_short_link("https://example.com", slug.as_str())
                    .unwrap();
            }
        }

        let err = registry
            .create_short_link("https://example.com", "")
            .unwrap_err();
        assert_eq!(err, RegistryError::SlugExhausted { attempts: 6 });
    }

    #[test]
    fn every_mutation_is_persisted() {
        let (mut registry, store, _) = registry_with(Scripted(vec!["abc123"]));

        registry
            .create_short_link("https://example.com", "")
            .unwrap();
        assert_eq!(
            stored_blob(&store),
            serde_json::json!({ "abc123": { "original": "https://example.com", "created": 1000 } })
        );

        assert!(registry.delete_link("abc123").unwrap());
        assert_eq!(stored_blob(&store), serde_json::json!({}));
    }

    #[test]
    fn delete_then_resolve_is_not_found() {
        let (mut registry, store, _) = registry_with(Scripted(vec!["abc123"]));
        registry
            .create_short_link("https://example.com", "")
            .unwrap();

        registry.delete_link("abc123").unwrap();

        assert_eq!(
            registry.resolve("abc123").unwrap_err(),
            RegistryError::NotFound("abc123".to_string())
        );
        assert!(stored_blob(&store).get("abc123").is_none());
    }

    #[test]
    fn delete_unknown_slug_is_a_no_op() {
        let (mut registry, store, _) = registry_with(Scripted(vec!["abc123"]));
        registry
            .create_short_link("https://example.com", "")
            .unwrap();
        let before = registry.list_all();
        let blob = store.get("shortly_demo_links_v1").unwrap();

        assert!(!registry.delete_link("nope").unwrap());
        assert!(!registry.delete_link("").unwrap());

        assert_eq!(registry.list_all(), before);
        assert_eq!(store.get("shortly_demo_links_v1").unwrap(), blob);
    }

    #[test]
    fn list_all_is_newest_first() {
        let (mut registry, _, clock) = registry_with(Scripted(vec!["unused"]));

        clock.set(jiff::Timestamp::from_millisecond(1).unwrap());
        registry.create_short_link("https://a.example", "a").unwrap();
        clock.set(jiff::Timestamp::from_millisecond(2).unwrap());
        registry.create_short_link("https://b.example", "b").unwrap();
        clock.set(jiff::Timestamp::from_millisecond(3).unwrap());
        registry.create_short_link("https://c.example", "c").unwrap();

        let order: Vec<_> = registry
            .list_all()
            .into_iter()
            .map(|(slug, _)| slug.into_inner())
            .collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn list_all_ties_keep_slug_order() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["unused"]));

        registry.create_short_link("https://z.example", "z").unwrap();
        registry.create_short_link("https://m.example", "m").unwrap();
        registry.create_short_link("https://a.example", "a").unwrap();

        let order: Vec<_> = registry
            .list_all()
            .into_iter()
            .map(|(slug, _)| slug.into_inner())
            .collect();
        assert_eq!(order, vec!["a", "m", "z"]);
    }

    #[test]
    fn save_then_fresh_load_round_trips() {
        let (mut registry, store, clock) = registry_with(RandomGenerator::seeded(5));
        for url in ["https://a.example", "https://b.example", "http://c.example"] {
            registry.create_short_link(url, "").unwrap();
            clock.advance(SignedDuration::from_secs(1));
        }
        registry.save().unwrap();

        let reloaded = Registry::open(
            store,
            RandomGenerator::seeded(6),
            clock,
            RegistrySettings::default(),
        )
        .unwrap();

        assert_eq!(reloaded.list_all(), registry.list_all());
    }

    #[test]
    fn load_missing_blob_is_empty() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["abc123"]));
        registry.load().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn corrupt_blob_fails_by_default() {
        let store = MemoryStore::with_entry("shortly_demo_links_v1", "{not json");
        let mut registry = Registry::new(
            store,
            Scripted(vec!["abc123"]),
            ManualClock::at_millis(0),
            RegistrySettings::default(),
        );

        let err = registry.load().unwrap_err();
        assert!(matches!(err, RegistryError::CorruptState(_)));
    }

    #[test]
    fn corrupt_blob_resets_when_asked() {
        let store = MemoryStore::with_entry("shortly_demo_links_v1", "[1, 2, 3]");
        let settings = RegistrySettings::builder()
            .corrupt_state(CorruptStatePolicy::Reset)
            .build();
        let mut registry = Registry::open(
            store.clone(),
            Scripted(vec!["abc123"]),
            ManualClock::at_millis(0),
            settings,
        )
        .unwrap();

        assert!(registry.is_empty());
        // the bad blob survives until the next write
        assert_eq!(
            store.get("shortly_demo_links_v1").unwrap().as_deref(),
            Some("[1, 2, 3]")
        );

        registry
            .create_short_link("https://example.com", "")
            .unwrap();
        assert!(stored_blob(&store).get("abc123").is_some());
    }

    #[test]
    fn custom_storage_key_is_used() {
        let store = MemoryStore::new();
        let settings = RegistrySettings::builder().storage_key("links").build();
        let mut registry = Registry::new(
            store.clone(),
            Scripted(vec!["abc123"]),
            ManualClock::at_millis(0),
            settings,
        );

        registry
            .create_short_link("https://example.com", "")
            .unwrap();

        assert!(store.get("links").unwrap().is_some());
        assert!(store.get("shortly_demo_links_v1").unwrap().is_none());
    }

    #[test]
    fn failed_save_rolls_back_create() {
        let store = FlakyStore::default();
        let mut registry = Registry::new(
            store.clone(),
            Scripted(vec!["abc123"]),
            ManualClock::at_millis(0),
            RegistrySettings::default(),
        );
        store.fail_writes();

        let err = registry
            .create_short_link("https://example.com", "")
            .unwrap_err();

        assert!(matches!(err, RegistryError::Storage(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn failed_save_rolls_back_delete() {
        let store = FlakyStore::default();
        let mut registry = Registry::new(
            store.clone(),
            Scripted(vec!["abc123"]),
            ManualClock::at_millis(0),
            RegistrySettings::default(),
        );
        registry
            .create_short_link("https://example.com", "")
            .unwrap();
        store.fail_writes();

        let err = registry.delete_link("abc123").unwrap_err();

        assert!(matches!(err, RegistryError::Storage(_)));
        assert_eq!(
            registry.resolve("abc123").unwrap().original,
            "https://example.com"
        );
    }

    #[test]
    fn open_request_accepts_slug_or_share_url() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["abc123"]));
        registry
            .create_short_link("https://example.com", "")
            .unwrap();

        let (slug, record) = registry.open_request("abc123").unwrap();
        assert_eq!(slug.as_str(), "abc123");
        assert_eq!(record.original, "https://example.com");

        let (slug, _) = registry
            .open_request("http://localhost:8080/?go=abc123")
            .unwrap();
        assert_eq!(slug.as_str(), "abc123");

        assert!(matches!(
            registry.open_request("missing"),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.open_request("  "),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn open_request_keeps_surrounding_spaces() {
        let (mut registry, _, _) = registry_with(Scripted(vec!["unused"]));
        registry
            .create_short_link("https://example.com", " padded ")
            .unwrap();

        let (slug, record) = registry.open_request(" padded ").unwrap();
        assert_eq!(slug.as_str(), " padded ");
        assert_eq!(record.original, "https://example.com");

        let url = crate::direct_open::share_url("https://links.example/", &slug).unwrap();
        assert_eq!(registry.open_request(&url).unwrap().0, slug);

        assert!(matches!(
            registry.open_request("padded"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn slug_length_comes_from_the_generator() {
        let (mut registry, _, _) = registry_with(RandomGenerator::seeded(3).with_length(8));

        let created = registry
            .create_short_link("https://example.com", "")
            .unwrap();

        assert_eq!(created.slug.as_str().len(), 8);
        assert!(created
            .slug
            .as_str()
            .bytes()
            .all(|b| shortly_generator::ALPHABET.contains(&b)));
    }

    #[test]
    fn settings_are_kept_as_given() {
        let settings = RegistrySettings::builder()
            .storage_key("links")
            .max_attempts(2)
            .build();
        let registry = Registry::new(
            MemoryStore::new(),
            Scripted(vec!["abc123"]),
            ManualClock::at_millis(0),
            settings,
        );

        assert_eq!(registry.settings().storage_key, "links");
        assert_eq!(registry.settings().max_attempts, 2);
        assert_eq!(registry.settings().corrupt_state, CorruptStatePolicy::Fail);
    }
}
