//! Quote acquisition with ordered source fallback.

use std::sync::Arc;

use musing_core::Quote;
use musing_sources::{
    random_fallback, DailyQuoteSource, QuoteGardenClient, QuoteSource, ZenQuotesClient,
};
use musing_storage::StorageService;
use tracing::{debug, info};

use crate::PrefetchHandle;

/// Produces quotes from an ordered list of providers and keeps the cache filled.
///
/// Provider failures never reach the caller: each source is tried in turn and
/// the built-in list is the last resort.
#[derive(Clone)]
pub struct QuoteService {
    sources: Arc<[Arc<dyn QuoteSource>]>,
    daily: Option<Arc<dyn DailyQuoteSource>>,
    storage: StorageService,
}

impl QuoteService {
    pub fn builder(storage: StorageService) -> QuoteServiceBuilder {
        QuoteServiceBuilder {
            sources: Vec::new(),
            daily: None,
            storage,
        }
    }

    /// The standard chain: ZenQuotes, then Quote Garden, with ZenQuotes
    /// serving the quote of the day.
    pub fn standard(
        storage: StorageService,
        zenquotes: ZenQuotesClient,
        quote_garden: QuoteGardenClient,
    ) -> Self {
        let zenquotes = Arc::new(zenquotes);
        Self::builder(storage)
            .source(zenquotes.clone())
            .source(Arc::new(quote_garden))
            .daily(zenquotes)
            .build()
    }

    pub const fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// Names of the random sources, in the order they are tried.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// A random quote from the first source that succeeds, or a built-in one.
    pub async fn random_quote(&self) -> Quote {
        debug!("Getting random quote...");
        for source in self.sources.iter() {
            match source.fetch().await {
                Ok(quote) => return quote,
                Err(e) => debug!("{} failed: {e}", source.name()),
            }
        }

        debug!("All sources failed, using built-in quote");
        random_fallback()
    }

    /// The provider's quote of the day, or a random quote if that fails.
    pub async fn todays_quote(&self) -> Quote {
        if let Some(daily) = &self.daily {
            match daily.fetch_today().await {
                Ok(quote) => return quote,
                Err(e) => debug!("{} failed, falling back to random: {e}", daily.name()),
            }
        }
        self.random_quote().await
    }

    /// Fetch a random quote into the prefetch slot in the background.
    ///
    /// The returned handle may be dropped; the task still runs.
    pub fn prefetch_next_quote(&self) -> PrefetchHandle {
        let service = self.clone();
        PrefetchHandle::new(tokio::spawn(async move {
            debug!("Prefetching next quote...");
            let quote = service.random_quote().await;
            match service.storage.try_cache_prefetched_quote(&quote) {
                Ok(()) => {
                    debug!("Next quote prefetched from {}", quote.source_name());
                    Ok(quote)
                }
                Err(e) => {
                    debug!("Prefetch failed: {e}");
                    Err(e)
                }
            }
        }))
    }

    /// The quote to show on a fresh page: the cached one while fresh,
    /// otherwise today's quote (which is then cached).
    pub async fn current_quote(&self) -> Quote {
        if let Some(quote) = self.storage.cached_quote() {
            debug!("Using cached quote");
            return quote;
        }

        let quote = self.todays_quote().await;
        self.storage.cache_quote(&quote);
        quote
    }

    /// Swap to a new quote: the prefetched one if available, else a fresh
    /// random one. The result becomes the cached quote.
    pub async fn next_quote(&self) -> Quote {
        let quote = match self.storage.consume_prefetched_quote() {
            Some(quote) => {
                debug!("Using prefetched quote");
                quote
            }
            None => self.random_quote().await,
        };
        self.storage.cache_quote(&quote);
        quote
    }

    /// Replace the cached quote with today's quote and prefetch the next one.
    pub async fn daily_refresh(&self) -> (Quote, PrefetchHandle) {
        let quote = self.todays_quote().await;
        self.storage.cache_quote(&quote);
        info!("Daily quote refreshed from {}", quote.source_name());
        (quote, self.prefetch_next_quote())
    }
}

/// Assembles a [`QuoteService`]. Sources are tried in the order added.
pub struct QuoteServiceBuilder {
    sources: Vec<Arc<dyn QuoteSource>>,
    daily: Option<Arc<dyn DailyQuoteSource>>,
    storage: StorageService,
}

impl QuoteServiceBuilder {
    #[must_use]
    pub fn source(mut self, source: Arc<dyn QuoteSource>) -> Self {
        self.sources.push(source);
        self
    }

    #[must_use]
    pub fn daily(mut self, source: Arc<dyn DailyQuoteSource>) -> Self {
        self.daily = Some(source);
        self
    }

    pub fn build(self) -> QuoteService {
        QuoteService {
            sources: self.sources.into(),
            daily: self.daily,
            storage: self.storage,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use musing_core::{Error, HttpError, ManualClock, Result};
    use musing_sources::fallback::is_fallback;
    use musing_sources::{quote_garden, zenquotes};
    use musing_storage::{MemoryBackend, StorageBackend};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// How a fake provider behaves.
    #[derive(Clone, Copy, Debug)]
    enum Reply {
        /// A canned ZenQuotes body.
        Zen(&'static str),
        /// A canned Quote Garden body.
        Garden(&'static str),
        /// Non-success HTTP status.
        Status(u16),
        /// Connection refused.
        Offline,
    }

    const ZEN_OK: &str = r#"[{"q":"Well begun is half done.","a":"Aristotle"}]"#;
    const ZEN_RATE_LIMITED: &str = r#"[{"q":"Too many requests. Obtain an auth key for unlimited access.","a":"ZenQuotes.io"}]"#;
    const ZEN_EMPTY: &str = "[]";
    const GARDEN_OK: &str =
        r#"{"statusCode":200,"data":{"quoteText":"Less is more.","quoteAuthor":"Mies"}}"#;
    const GARDEN_EMPTY: &str = r#"{"statusCode":200}"#;
    const MALFORMED: &str = "<html>oops</html>";

    struct FakeSource {
        name: &'static str,
        reply: Reply,
        calls: AtomicUsize,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FakeSource {
        fn new(name: &'static str, reply: Reply, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                calls: AtomicUsize::new(0),
                log: log.clone(),
            })
        }

        fn answer(&self, zen_tag: &str) -> Result<Quote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.name);
            match self.reply {
                Reply::Zen(body) => zenquotes::parse_response(body.as_bytes(), zen_tag),
                Reply::Garden(body) => quote_garden::parse_response(body.as_bytes()),
                Reply::Status(status) => Err(Error::Http(HttpError::StatusError {
                    status,
                    message: String::new(),
                })),
                Reply::Offline => Err(Error::Http(HttpError::ConnectionFailed(
                    "connection refused".into(),
                ))),
            }
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self) -> Result<Quote> {
            self.answer(zenquotes::SOURCE_NAME)
        }
    }

    #[async_trait]
    impl DailyQuoteSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_today(&self) -> Result<Quote> {
            self.answer(zenquotes::TODAY_SOURCE_NAME)
        }
    }

    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(Error::Storage("unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &Value) -> Result<()> {
            Err(Error::Storage("unavailable".into()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("unavailable".into()))
        }
    }

    fn memory_storage() -> StorageService {
        StorageService::new(Arc::new(MemoryBackend::new()))
    }

    fn service_with(
        storage: StorageService,
        primary: Reply,
        secondary: Reply,
        today: Reply,
    ) -> (QuoteService, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = QuoteService::builder(storage)
            .source(FakeSource::new("primary", primary, &log))
            .source(FakeSource::new("secondary", secondary, &log))
            .daily(FakeSource::new("today", today, &log))
            .build();
        (service, log)
    }

    fn calls(log: &Arc<Mutex<Vec<&'static str>>>) -> Vec<&'static str> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_primary_success_short_circuits() {
        let (service, log) =
            service_with(memory_storage(), Reply::Zen(ZEN_OK), Reply::Garden(GARDEN_OK), Reply::Offline);
        let quote = service.random_quote().await;
        assert_eq!(quote.author, "Aristotle");
        assert_eq!(quote.source.as_deref(), Some("ZenQuotes"));
        assert_eq!(calls(&log), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_secondary_used_after_primary_failure() {
        let (service, log) =
            service_with(memory_storage(), Reply::Status(503), Reply::Garden(GARDEN_OK), Reply::Offline);
        let quote = service.random_quote().await;
        assert_eq!(quote.source.as_deref(), Some("Quote Garden"));
        assert_eq!(calls(&log), vec!["primary", "secondary"]);
    }

    #[tokio::test]
    async fn test_rate_limit_notice_is_not_returned() {
        let (service, _) = service_with(
            memory_storage(),
            Reply::Zen(ZEN_RATE_LIMITED),
            Reply::Garden(GARDEN_OK),
            Reply::Offline,
        );
        let quote = service.random_quote().await;
        assert_eq!(quote.text, "Less is more.");
        assert!(!quote.text.to_lowercase().contains("too many requests"));
    }

    #[tokio::test]
    async fn test_all_failure_combinations_yield_built_in() {
        let primary_failures = [
            Reply::Status(500),
            Reply::Status(429),
            Reply::Offline,
            Reply::Zen(ZEN_RATE_LIMITED),
            Reply::Zen(ZEN_EMPTY),
            Reply::Zen(MALFORMED),
        ];
        let secondary_failures = [
            Reply::Status(404),
            Reply::Offline,
            Reply::Garden(GARDEN_EMPTY),
            Reply::Garden(MALFORMED),
        ];

        for primary in primary_failures {
            for secondary in secondary_failures {
                let (service, log) =
                    service_with(memory_storage(), primary, secondary, Reply::Offline);
                let quote = service.random_quote().await;
                assert!(
                    is_fallback(&quote),
                    "{primary:?} + {secondary:?} gave {quote:?}"
                );
                assert_eq!(calls(&log), vec!["primary", "secondary"]);
            }
        }
    }

    #[tokio::test]
    async fn test_no_sources_yields_built_in() {
        let service = QuoteService::builder(memory_storage()).build();
        assert!(service.source_names().is_empty());
        assert!(is_fallback(&service.random_quote().await));
        assert!(is_fallback(&service.todays_quote().await));
    }

    #[tokio::test]
    async fn test_todays_quote_success() {
        let (service, log) =
            service_with(memory_storage(), Reply::Offline, Reply::Offline, Reply::Zen(ZEN_OK));
        let quote = service.todays_quote().await;
        assert_eq!(quote.source.as_deref(), Some("ZenQuotes (Today)"));
        assert_eq!(calls(&log), vec!["today"]);
    }

    #[tokio::test]
    async fn test_todays_quote_falls_back_on_malformed_json() {
        let (service, log) = service_with(
            memory_storage(),
            Reply::Zen(ZEN_OK),
            Reply::Offline,
            Reply::Zen(MALFORMED),
        );
        let quote = service.todays_quote().await;
        assert_eq!(quote.source.as_deref(), Some("ZenQuotes"));
        assert_eq!(calls(&log), vec!["today", "primary"]);
    }

    #[tokio::test]
    async fn test_todays_quote_falls_back_on_error_payload() {
        let (service, _) = service_with(
            memory_storage(),
            Reply::Offline,
            Reply::Garden(GARDEN_OK),
            Reply::Zen(ZEN_RATE_LIMITED),
        );
        assert_eq!(
            service.todays_quote().await.source.as_deref(),
            Some("Quote Garden")
        );
    }

    #[tokio::test]
    async fn test_prefetch_fills_slot() {
        let (service, _) =
            service_with(memory_storage(), Reply::Zen(ZEN_OK), Reply::Offline, Reply::Offline);
        let handle = service.prefetch_next_quote();
        let quote = handle.wait().await.unwrap();

        assert_eq!(service.storage().prefetched_quote(), Some(quote));
    }

    #[tokio::test]
    async fn test_dropped_prefetch_still_completes() {
        let (service, _) =
            service_with(memory_storage(), Reply::Zen(ZEN_OK), Reply::Offline, Reply::Offline);
        drop(service.prefetch_next_quote());

        for _ in 0..100 {
            if service.storage().prefetched_quote().is_some() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("prefetch never landed");
    }

    #[tokio::test]
    async fn test_prefetch_failure_is_observable() {
        let storage = StorageService::new(Arc::new(FailingBackend));
        let (service, _) = service_with(storage, Reply::Zen(ZEN_OK), Reply::Offline, Reply::Offline);
        let err = service.prefetch_next_quote().wait().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_current_quote_uses_cache_until_stale() {
        let clock = Arc::new(ManualClock::default());
        let storage = memory_storage().with_clock(clock.clone());
        let (service, log) =
            service_with(storage, Reply::Offline, Reply::Offline, Reply::Zen(ZEN_OK));

        let first = service.current_quote().await;
        assert_eq!(first.source.as_deref(), Some("ZenQuotes (Today)"));
        assert_eq!(service.current_quote().await, first);
        assert_eq!(calls(&log), vec!["today"]);

        clock.advance(chrono::Duration::hours(25));
        service.current_quote().await;
        assert_eq!(calls(&log), vec!["today", "today"]);
    }

    #[tokio::test]
    async fn test_next_quote_consumes_prefetch_then_fetches() {
        let (service, log) =
            service_with(memory_storage(), Reply::Zen(ZEN_OK), Reply::Offline, Reply::Offline);
        let prefetched = Quote::new("Ready and waiting.", "Cache").with_source("Quote Garden");
        service.storage().cache_prefetched_quote(&prefetched);

        assert_eq!(service.next_quote().await, prefetched);
        assert!(calls(&log).is_empty());
        assert_eq!(service.storage().cached_quote(), Some(prefetched));

        let fetched = service.next_quote().await;
        assert_eq!(fetched.author, "Aristotle");
        assert_eq!(calls(&log), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_daily_refresh_caches_and_prefetches() {
        let (service, _) =
            service_with(memory_storage(), Reply::Zen(ZEN_OK), Reply::Offline, Reply::Zen(ZEN_OK));
        let (quote, prefetch) = service.daily_refresh().await;

        assert_eq!(service.storage().cached_quote(), Some(quote));
        let next = prefetch.wait().await.unwrap();
        assert_eq!(service.storage().prefetched_quote(), Some(next));
    }

    #[tokio::test]
    async fn test_storage_failure_never_blocks_quotes() {
        let storage = StorageService::new(Arc::new(FailingBackend));
        let (service, _) =
            service_with(storage, Reply::Offline, Reply::Offline, Reply::Offline);
        assert!(is_fallback(&service.current_quote().await));
        assert!(is_fallback(&service.next_quote().await));
    }

    #[test]
    fn test_standard_chain_order() {
        let zen = ZenQuotesClient::new().unwrap();
        let garden = QuoteGardenClient::new().unwrap();
        let service = QuoteService::standard(memory_storage(), zen, garden);
        assert_eq!(service.source_names(), vec!["ZenQuotes", "Quote Garden"]);
    }
}
