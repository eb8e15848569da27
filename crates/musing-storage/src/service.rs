//! Settings record, quote cache and prefetch slot on top of a backend.
//!
//! Everything here degrades instead of failing: a broken store reads as the
//! default settings and writes become no-ops (logged). The `try_*` variants
//! expose the underlying errors for callers that need to observe them.

use std::sync::Arc;

use chrono::Duration;
use musing_core::types::settings::SETTINGS_KEY;
use musing_core::{
    CachedQuote, Clock, ExtensionSettings, Quote, QuoteFont, Result, SemanticTheme,
    SettingsPatch, SystemClock, ThemeMode, UiFont,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::StorageBackend;

/// How long a cached quote stays valid.
pub const DEFAULT_FRESHNESS_WINDOW_HOURS: i64 = 24;

/// Minimum gap between fetches before a new one is considered due.
pub const REFETCH_INTERVAL_MINUTES: i64 = 10;

/// Typed access to the settings record.
///
/// Clones share one write lock, so read-modify-write sequences from the same
/// process (a prefetch task and the foreground, say) never interleave.
/// Writers in other processes still race; the last one wins.
#[derive(Clone)]
pub struct StorageService {
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    freshness_window: Duration,
    write_lock: Arc<Mutex<()>>,
}

impl StorageService {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            freshness_window: Duration::hours(DEFAULT_FRESHNESS_WINDOW_HOURS),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub const fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    // ------------------------------------------------------------------
    // Whole record
    // ------------------------------------------------------------------

    /// The stored record merged over the defaults, as a raw JSON object.
    ///
    /// Keys this version does not know about are kept. A known key whose value
    /// does not decode is reset to its default, so one bad field never hides
    /// the rest of the record.
    fn load_merged(&self) -> Result<Map<String, Value>> {
        let defaults = default_record()?;
        let mut merged = defaults.clone();

        match self.backend.get(SETTINGS_KEY)? {
            Some(Value::Object(stored)) => merged.extend(stored),
            Some(Value::Null) | None => {}
            Some(other) => warn!("Ignoring settings record that is not an object: {other}"),
        }

        if serde_json::from_value::<ExtensionSettings>(Value::Object(merged.clone())).is_ok() {
            return Ok(merged);
        }

        let invalid: Vec<String> = merged
            .iter()
            .filter(|(key, value)| !field_decodes(&defaults, key, value))
            .map(|(key, _)| key.clone())
            .collect();
        for key in invalid {
            warn!("Resetting invalid settings field {key}");
            if let Some(default) = defaults.get(&key).cloned() {
                merged.insert(key, default);
            } else {
                merged.remove(&key);
            }
        }
        Ok(merged)
    }

    /// Current settings, propagating storage and decode errors.
    pub fn try_settings(&self) -> Result<ExtensionSettings> {
        let merged = self.load_merged()?;
        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Current settings; the defaults if the store cannot be read.
    pub fn settings(&self) -> ExtensionSettings {
        self.try_settings().unwrap_or_else(|e| {
            warn!("Failed to load settings from {}: {e}", self.backend.name());
            ExtensionSettings::default()
        })
    }

    /// Shallow-merge `partial` into the stored record and write it back.
    pub fn try_merge_raw(&self, partial: Map<String, Value>) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.merge_unlocked(partial)
    }

    /// Read-modify-write without taking the write lock; callers hold it.
    fn merge_unlocked(&self, partial: Map<String, Value>) -> Result<()> {
        let mut merged = self.load_merged()?;
        merged.extend(partial);
        self.backend.set(SETTINGS_KEY, &Value::Object(merged))
    }

    pub fn merge_raw(&self, partial: Map<String, Value>) {
        if let Err(e) = self.try_merge_raw(partial) {
            warn!("Failed to save settings to {}: {e}", self.backend.name());
        }
    }

    pub fn try_save_settings(&self, patch: &SettingsPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.try_merge_raw(patch.to_map())
    }

    pub fn save_settings(&self, patch: &SettingsPatch) {
        if let Err(e) = self.try_save_settings(patch) {
            warn!("Failed to save settings to {}: {e}", self.backend.name());
        }
    }

    /// Drop the stored record so every field reads as its default.
    pub fn reset_settings(&self) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.backend.remove(SETTINGS_KEY) {
            warn!("Failed to reset settings in {}: {e}", self.backend.name());
        }
    }

    // ------------------------------------------------------------------
    // Quote cache
    // ------------------------------------------------------------------

    /// Store `quote` as the current quote, stamped with the current time.
    pub fn cache_quote(&self, quote: &Quote) {
        let now = self.clock.now();
        let patch = SettingsPatch {
            cached_quote: Some(Some(CachedQuote::new(tagged(quote), now))),
            last_fetch_time: Some(now.timestamp_millis()),
            ..SettingsPatch::default()
        };
        debug!("Caching quote by {}", quote.author);
        self.save_settings(&patch);
    }

    /// The cached quote while it is inside the freshness window.
    pub fn cached_quote(&self) -> Option<Quote> {
        let cached = self.settings().cached_quote?;
        if cached.is_fresh(self.clock.now(), self.freshness_window) {
            Some(cached.into_quote())
        } else {
            debug!("Cached quote is stale");
            None
        }
    }

    /// The cached entry with its timestamp, regardless of freshness.
    pub fn cached_entry(&self) -> Option<CachedQuote> {
        self.settings().cached_quote
    }

    /// Whether enough time has passed since the last fetch to fetch again.
    pub fn should_fetch_new_quote(&self) -> bool {
        let elapsed = self.clock.now().timestamp_millis() - self.settings().last_fetch_time;
        elapsed > Duration::minutes(REFETCH_INTERVAL_MINUTES).num_milliseconds()
    }

    // ------------------------------------------------------------------
    // Prefetch slot
    // ------------------------------------------------------------------

    pub fn try_cache_prefetched_quote(&self, quote: &Quote) -> Result<()> {
        let patch = SettingsPatch {
            prefetched_quote: Some(Some(CachedQuote::new(
                tagged(quote),
                self.clock.now(),
            ))),
            ..SettingsPatch::default()
        };
        self.try_save_settings(&patch)
    }

    pub fn cache_prefetched_quote(&self, quote: &Quote) {
        if let Err(e) = self.try_cache_prefetched_quote(quote) {
            warn!("Failed to store prefetched quote: {e}");
        }
    }

    pub fn prefetched_quote(&self) -> Option<Quote> {
        self.settings().prefetched_quote.map(CachedQuote::into_quote)
    }

    /// Take the prefetched quote and clear the slot.
    ///
    /// Atomic within this process; two processes consuming at once can both
    /// receive the same quote.
    pub fn consume_prefetched_quote(&self) -> Option<Quote> {
        let _guard = self.write_lock.lock();
        let quote = self.prefetched_quote()?;
        let clear = SettingsPatch {
            prefetched_quote: Some(None),
            ..SettingsPatch::default()
        };
        if let Err(e) = self.merge_unlocked(clear.to_map()) {
            warn!("Failed to clear prefetched quote: {e}");
        }
        Some(quote)
    }

    // ------------------------------------------------------------------
    // Per-field projections
    // ------------------------------------------------------------------

    pub fn selected_theme(&self) -> String {
        self.settings().selected_theme
    }

    pub fn save_selected_theme(&self, theme: &str) {
        self.save_settings(&SettingsPatch::new().selected_theme(theme));
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.settings().theme_mode
    }

    pub fn save_theme_mode(&self, mode: ThemeMode) {
        self.save_settings(&SettingsPatch::new().theme_mode(mode));
    }

    pub fn saturation(&self) -> u8 {
        self.settings().saturation
    }

    pub fn save_saturation(&self, value: u8) {
        self.save_settings(&SettingsPatch::new().saturation(value));
    }

    pub fn lightness(&self) -> u8 {
        self.settings().lightness
    }

    pub fn save_lightness(&self, value: u8) {
        self.save_settings(&SettingsPatch::new().lightness(value));
    }

    pub fn quote_font(&self) -> QuoteFont {
        self.settings().quote_font
    }

    pub fn save_quote_font(&self, font: QuoteFont) {
        self.save_settings(&SettingsPatch::new().quote_font(font));
    }

    pub fn ui_font(&self) -> UiFont {
        self.settings().ui_font
    }

    pub fn save_ui_font(&self, font: UiFont) {
        self.save_settings(&SettingsPatch::new().ui_font(font));
    }

    pub fn semantic_theme(&self) -> SemanticTheme {
        self.settings().semantic_theme
    }

    pub fn save_semantic_theme(&self, theme: SemanticTheme) {
        self.save_settings(&SettingsPatch::new().semantic_theme(theme));
    }

    pub fn show_source(&self) -> bool {
        self.settings().show_source
    }

    pub fn save_show_source(&self, show: bool) {
        self.save_settings(&SettingsPatch::new().show_source(show));
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    pub fn favorite_quotes(&self) -> Vec<String> {
        self.settings().favorite_quotes
    }

    /// Add `text` to the favorites. Returns false if it was already there.
    pub fn add_favorite(&self, text: &str) -> bool {
        let _guard = self.write_lock.lock();
        let mut favorites = self.favorite_quotes();
        if favorites.iter().any(|f| f == text) {
            return false;
        }
        favorites.push(text.to_string());
        self.save_favorites_unlocked(favorites);
        true
    }

    /// Remove `text` from the favorites. Returns false if it was not there.
    pub fn remove_favorite(&self, text: &str) -> bool {
        let _guard = self.write_lock.lock();
        let mut favorites = self.favorite_quotes();
        let before = favorites.len();
        favorites.retain(|f| f != text);
        if favorites.len() == before {
            return false;
        }
        self.save_favorites_unlocked(favorites);
        true
    }

    fn save_favorites_unlocked(&self, favorites: Vec<String>) {
        let patch = SettingsPatch::new().favorite_quotes(favorites);
        if let Err(e) = self.merge_unlocked(patch.to_map()) {
            warn!("Failed to save favorites to {}: {e}", self.backend.name());
        }
    }
}

/// The default settings as a JSON object.
fn default_record() -> Result<Map<String, Value>> {
    Ok(match serde_json::to_value(ExtensionSettings::default())? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

/// Whether `value` decodes as the settings field `key` on its own.
fn field_decodes(defaults: &Map<String, Value>, key: &str, value: &Value) -> bool {
    let mut single = defaults.clone();
    single.insert(key.to_string(), value.clone());
    serde_json::from_value::<ExtensionSettings>(Value::Object(single)).is_ok()
}

/// Cache entries always carry a source tag.
fn tagged(quote: &Quote) -> Quote {
    let mut quote = quote.clone();
    if quote.source.is_none() {
        quote.source = Some("Unknown".to_string());
    }
    quote
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use chrono::Utc;
    use musing_core::{Error, ManualClock};
    use proptest::prelude::*;
    use serde_json::json;

    /// A backend whose every call fails.
    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(Error::Storage("quota exceeded".into()))
        }

        fn set(&self, _key: &str, _value: &Value) -> Result<()> {
            Err(Error::Storage("quota exceeded".into()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("quota exceeded".into()))
        }
    }

    fn service() -> (StorageService, Arc<ManualClock>, Arc<MemoryBackend>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let backend = Arc::new(MemoryBackend::new());
        let service = StorageService::new(backend.clone()).with_clock(clock.clone());
        (service, clock, backend)
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test helper takes objects"),
        }
    }

    #[test]
    fn test_first_access_yields_defaults() {
        let (storage, _, _) = service();
        assert_eq!(storage.settings(), ExtensionSettings::default());
        assert_eq!(storage.selected_theme(), "default");
    }

    #[test]
    fn test_merge_keeps_earlier_keys() {
        let (storage, _, backend) = service();
        storage.merge_raw(object(json!({"foo": 1})));
        storage.merge_raw(object(json!({"bar": 2})));

        let stored = backend.get(SETTINGS_KEY).unwrap().unwrap();
        assert_eq!(stored["foo"], 1);
        assert_eq!(stored["bar"], 2);
        // Unknown keys do not break typed reads.
        assert_eq!(storage.settings().selected_theme, "default");
    }

    #[test]
    fn test_typed_patches_merge() {
        let (storage, _, _) = service();
        storage.save_selected_theme("sage");
        storage.save_theme_mode(ThemeMode::Dark);
        storage.save_quote_font(QuoteFont::Poetry);

        let settings = storage.settings();
        assert_eq!(settings.selected_theme, "sage");
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
        assert_eq!(settings.quote_font, QuoteFont::Poetry);
        assert_eq!(settings.ui_font, UiFont::Readable);
    }

    #[test]
    fn test_projections_round_trip() {
        let (storage, _, _) = service();
        storage.save_saturation(70);
        storage.save_lightness(20);
        storage.save_ui_font(UiFont::System);
        storage.save_semantic_theme(SemanticTheme::Accent);
        storage.save_show_source(false);

        assert_eq!(storage.saturation(), 70);
        assert_eq!(storage.lightness(), 20);
        assert_eq!(storage.ui_font(), UiFont::System);
        assert_eq!(storage.semantic_theme(), SemanticTheme::Accent);
        assert!(!storage.show_source());
        assert_eq!(storage.quote_font(), QuoteFont::Classic);
        assert_eq!(storage.theme_mode(), ThemeMode::System);
    }

    #[test]
    fn test_slider_values_clamped_on_save() {
        let (storage, _, _) = service();
        storage.save_saturation(250);
        assert_eq!(storage.saturation(), 100);
    }

    #[test]
    fn test_cache_then_read_returns_same_quote() {
        let (storage, _, _) = service();
        let quote = Quote::new("Carpe diem.", "Horace").with_source("ZenQuotes");
        storage.cache_quote(&quote);
        assert_eq!(storage.cached_quote(), Some(quote));
    }

    #[test]
    fn test_cache_expires_after_window() {
        let (storage, clock, _) = service();
        let quote = Quote::new("Carpe diem.", "Horace").with_source("ZenQuotes");
        storage.cache_quote(&quote);

        clock.advance(Duration::hours(23));
        assert_eq!(storage.cached_quote(), Some(quote));

        clock.advance(Duration::hours(1) + Duration::seconds(1));
        assert!(storage.cached_quote().is_none());
        // Stale entries are misses, not deletions.
        assert!(storage.cached_entry().is_some());
    }

    #[test]
    fn test_custom_freshness_window() {
        let (storage, clock, _) = service();
        let storage = storage.with_freshness_window(Duration::minutes(5));
        storage.cache_quote(&Quote::new("a", "b"));
        clock.advance(Duration::minutes(6));
        assert!(storage.cached_quote().is_none());
    }

    #[test]
    fn test_cache_quote_sets_last_fetch_time() {
        let (storage, clock, _) = service();
        assert!(storage.should_fetch_new_quote());

        storage.cache_quote(&Quote::new("a", "b"));
        assert_eq!(storage.settings().last_fetch_time, clock.now().timestamp_millis());
        assert!(!storage.should_fetch_new_quote());

        clock.advance(Duration::minutes(11));
        assert!(storage.should_fetch_new_quote());
    }

    #[test]
    fn test_untagged_quote_cached_as_unknown() {
        let (storage, _, _) = service();
        storage.cache_quote(&Quote::new("a", "b"));
        assert_eq!(storage.cached_quote().unwrap().source.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_consume_prefetched_exactly_once() {
        let (storage, _, _) = service();
        assert!(storage.consume_prefetched_quote().is_none());

        let quote = Quote::new("Next!", "Someone").with_source("Quote Garden");
        storage.cache_prefetched_quote(&quote);
        assert_eq!(storage.prefetched_quote(), Some(quote.clone()));

        assert_eq!(storage.consume_prefetched_quote(), Some(quote));
        assert!(storage.consume_prefetched_quote().is_none());
        assert!(storage.prefetched_quote().is_none());
    }

    #[test]
    fn test_prefetch_slot_independent_of_cache() {
        let (storage, _, _) = service();
        let current = Quote::new("Now", "A").with_source("ZenQuotes");
        let next = Quote::new("Later", "B").with_source("ZenQuotes");
        storage.cache_quote(&current);
        storage.cache_prefetched_quote(&next);

        assert_eq!(storage.consume_prefetched_quote(), Some(next));
        assert_eq!(storage.cached_quote(), Some(current));
    }

    #[test]
    fn test_failing_backend_degrades() {
        let storage = StorageService::new(Arc::new(FailingBackend));
        assert_eq!(storage.settings(), ExtensionSettings::default());
        storage.save_selected_theme("rose");
        storage.cache_quote(&Quote::new("a", "b"));
        storage.reset_settings();
        assert!(storage.cached_quote().is_none());
        assert!(storage.consume_prefetched_quote().is_none());
        assert!(storage.try_settings().is_err());
        assert!(storage
            .try_cache_prefetched_quote(&Quote::new("a", "b"))
            .is_err());
    }

    #[test]
    fn test_invalid_field_resets_only_that_field() {
        let (storage, _, backend) = service();
        backend
            .set(
                SETTINGS_KEY,
                &json!({"themeMode": "auto", "saturation": "very", "selectedTheme": "rose"}),
            )
            .unwrap();

        let settings = storage.settings();
        assert_eq!(settings.theme_mode, ThemeMode::System);
        assert_eq!(settings.saturation, 40);
        assert_eq!(settings.selected_theme, "rose");

        let quote = Quote::new("Carpe diem.", "Horace").with_source("ZenQuotes");
        storage.cache_quote(&quote);
        storage.save_selected_theme("sage");
        assert_eq!(storage.cached_quote(), Some(quote));
        assert_eq!(storage.selected_theme(), "sage");

        // The next write replaces the bad values with defaults.
        let stored = backend.get(SETTINGS_KEY).unwrap().unwrap();
        assert_eq!(stored["themeMode"], "system");
        assert_eq!(stored["saturation"], 40);
    }

    #[test]
    fn test_invalid_cache_slot_is_dropped() {
        let (storage, _, backend) = service();
        backend
            .set(SETTINGS_KEY, &json!({"cachedQuote": 7, "showSource": false}))
            .unwrap();
        assert!(storage.cached_entry().is_none());
        assert!(!storage.show_source());
    }

    #[test]
    fn test_non_object_record_degrades_to_defaults() {
        let (storage, _, backend) = service();
        backend.set(SETTINGS_KEY, &json!("not an object")).unwrap();
        assert_eq!(storage.settings(), ExtensionSettings::default());

        storage.save_selected_theme("sage");
        assert_eq!(storage.selected_theme(), "sage");
    }

    /// Memory backend that stalls on reads, widening any read-modify-write window.
    struct SlowBackend {
        inner: MemoryBackend,
    }

    impl StorageBackend for SlowBackend {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn get(&self, key: &str) -> Result<Option<Value>> {
            std::thread::sleep(std::time::Duration::from_millis(20));
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &Value) -> Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_concurrent_slot_writes_both_land() {
        let storage = StorageService::new(Arc::new(SlowBackend {
            inner: MemoryBackend::new(),
        }));
        let current = Quote::new("now", "A").with_source("ZenQuotes");
        let next = Quote::new("next", "B").with_source("Quote Garden");

        std::thread::scope(|scope| {
            let foreground = storage.clone();
            let background = storage.clone();
            scope.spawn(move || foreground.cache_quote(&current));
            scope.spawn(move || background.cache_prefetched_quote(&next));
        });

        assert_eq!(storage.cached_quote().map(|q| q.text), Some("now".to_string()));
        assert_eq!(storage.prefetched_quote().map(|q| q.text), Some("next".to_string()));
    }

    #[test]
    fn test_concurrent_favorites_both_land() {
        let storage = StorageService::new(Arc::new(SlowBackend {
            inner: MemoryBackend::new(),
        }));

        std::thread::scope(|scope| {
            for text in ["Know thyself.", "Carpe diem."] {
                let storage = storage.clone();
                scope.spawn(move || storage.add_favorite(text));
            }
        });

        let mut favorites = storage.favorite_quotes();
        favorites.sort();
        assert_eq!(favorites, vec!["Carpe diem.", "Know thyself."]);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (storage, _, _) = service();
        storage.save_selected_theme("rose");
        storage.reset_settings();
        assert_eq!(storage.selected_theme(), "default");
    }

    #[test]
    fn test_favorites() {
        let (storage, _, _) = service();
        assert!(storage.add_favorite("Know thyself."));
        assert!(!storage.add_favorite("Know thyself."));
        assert!(storage.add_favorite("Carpe diem."));
        assert_eq!(storage.favorite_quotes(), vec!["Know thyself.", "Carpe diem."]);

        assert!(storage.remove_favorite("Know thyself."));
        assert!(!storage.remove_favorite("Know thyself."));
        assert_eq!(storage.favorite_quotes(), vec!["Carpe diem."]);
    }

    proptest! {
        #[test]
        fn prop_later_patch_wins_earlier_keys_survive(
            theme in "[a-z]{1,12}",
            first in any::<bool>(),
            second in any::<bool>(),
        ) {
            let (storage, _, _) = service();
            storage.save_selected_theme(&theme);
            storage.save_show_source(first);
            storage.save_show_source(second);

            let settings = storage.settings();
            prop_assert_eq!(settings.selected_theme, theme);
            prop_assert_eq!(settings.show_source, second);
        }
    }
}
