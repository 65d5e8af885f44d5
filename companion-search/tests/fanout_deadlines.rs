//! Fan-out deadline tests.
//!
//! Every test runs on a paused Tokio clock, so "20 seconds" of hanging costs
//! nothing and elapsed times are exact. The regression guarded here: one slow
//! adapter must only lose its own results and must not stretch the round
//! beyond a single per-adapter deadline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use companion_search::orchestrator::{aggregate, fan_out};
use companion_search::{EngineAdapter, EngineId, SearchError, SearchResult};
use tokio::time::Instant;

const DEADLINE: Duration = Duration::from_secs(15);

/// Adapter that answers with fixed URLs after a delay.
struct Delayed {
    engine: EngineId,
    delay: Duration,
    urls: Vec<&'static str>,
}

impl Delayed {
    fn new(engine: EngineId, delay_secs: u64, urls: &[&'static str]) -> Arc<dyn EngineAdapter> {
        Arc::new(Self {
            engine,
            delay: Duration::from_secs(delay_secs),
            urls: urls.to_vec(),
        })
    }
}

#[async_trait]
impl EngineAdapter for Delayed {
    fn id(&self) -> EngineId {
        self.engine
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tokio::time::sleep(self.delay).await;
        Ok(self
            .urls
            .iter()
            .enumerate()
            .map(|(i, url)| SearchResult {
                source: self.engine.name().to_string(),
                title: format!("{query} #{}", i + 1),
                url: (*url).to_string(),
                snippet: String::new(),
                rank: i as u32 + 1,
            })
            .collect())
    }
}

/// Adapter that fails after a delay.
struct Broken {
    engine: EngineId,
}

#[async_trait]
impl EngineAdapter for Broken {
    fn id(&self) -> EngineId {
        self.engine
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Err(SearchError::engine(self.engine, "connection reset"))
    }
}

#[tokio::test(start_paused = true)]
async fn two_engines_with_shared_url_yield_three_results_quickly() {
    let adapters = vec![
        Delayed::new(EngineId::Bing, 1, &["https://a.example/x", "https://shared.example/page"]),
        Delayed::new(EngineId::Searx, 2, &["https://SHARED.example/page/", "https://c.example/"]),
    ];

    let start = Instant::now();
    let results = aggregate("rust", &adapters, DEADLINE).await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 3);
    assert!(elapsed <= Duration::from_secs(2), "took {elapsed:?}");
    let shared = results
        .iter()
        .find(|r| r.url.contains("shared"))
        .expect("shared url kept once");
    assert_eq!(shared.source, "Bing");
}

#[tokio::test(start_paused = true)]
async fn hanging_engine_is_cut_off_at_its_own_deadline() {
    let adapters = vec![
        Delayed::new(EngineId::Mojeek, 1, &["https://fast.example/"]),
        Delayed::new(EngineId::Yep, 20, &["https://slow.example/"]),
    ];

    let start = Instant::now();
    let round = fan_out("weather", &adapters, DEADLINE).await;
    let elapsed = start.elapsed();

    assert_eq!(round.results.len(), 1);
    assert_eq!(round.results[0].source, "Mojeek");
    assert!(elapsed >= DEADLINE && elapsed < DEADLINE + Duration::from_secs(1), "took {elapsed:?}");

    assert!(round.reports[0].succeeded());
    assert!(matches!(
        round.reports[1].outcome,
        Err(SearchError::EngineTimeout {
            engine: EngineId::Yep
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn one_slow_engine_among_seven_costs_one_deadline_not_seven() {
    let mut adapters = Vec::new();
    let engines = EngineId::all();
    let urls: [&'static str; 7] = [
        "https://e0.example/",
        "https://e1.example/",
        "https://e2.example/",
        "https://e3.example/",
        "https://e4.example/",
        "https://e5.example/",
        "https://e6.example/",
    ];
    for (i, engine) in engines.iter().enumerate() {
        let delay = if i == 3 { 60 } else { i as u64 };
        adapters.push(Delayed::new(*engine, delay, &[urls[i]]));
    }

    let start = Instant::now();
    let results = aggregate("news", &adapters, DEADLINE).await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.url != "https://e3.example/"));
    assert!(elapsed < DEADLINE + Duration::from_secs(1), "took {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn several_hanging_engines_still_share_one_deadline() {
    let adapters = vec![
        Delayed::new(EngineId::Bing, 30, &["https://a.example/"]),
        Delayed::new(EngineId::Qwant, 45, &["https://b.example/"]),
        Delayed::new(EngineId::Startpage, 90, &["https://c.example/"]),
    ];

    let start = Instant::now();
    let round = fan_out("q", &adapters, DEADLINE).await;

    assert!(round.results.is_empty());
    assert_eq!(round.succeeded(), 0);
    assert_eq!(round.reports.len(), 3);
    assert!(start.elapsed() < DEADLINE + Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn failing_engine_does_not_abort_siblings() {
    let adapters: Vec<Arc<dyn EngineAdapter>> = vec![
        Arc::new(Broken {
            engine: EngineId::DuckDuckGo,
        }),
        Delayed::new(EngineId::Startpage, 3, &["https://sp.example/1", "https://sp.example/2"]),
    ];

    let round = fan_out("q", &adapters, DEADLINE).await;

    assert_eq!(round.results.len(), 2);
    assert_eq!(round.results[0].rank, 1);
    assert_eq!(round.results[1].rank, 2);
    assert!(matches!(
        round.reports[0].outcome,
        Err(SearchError::Engine {
            engine: EngineId::DuckDuckGo,
            ..
        })
    ));
    assert!(matches!(round.reports[1].outcome, Ok(2)));
}

#[tokio::test(start_paused = true)]
async fn tracking_parameters_do_not_defeat_dedup() {
    let adapters = vec![
        Delayed::new(EngineId::Bing, 2, &["https://docs.example/guide?utm_source=bing"]),
        Delayed::new(EngineId::Searx, 1, &["https://docs.example/guide?ref=searx#intro"]),
    ];

    let results = aggregate("guide", &adapters, DEADLINE).await;

    assert_eq!(results.len(), 1);
    // Registration order decides, not completion order.
    assert_eq!(results[0].source, "Bing");
}

#[tokio::test(start_paused = true)]
async fn empty_results_everywhere_is_not_an_error() {
    let adapters = vec![
        Delayed::new(EngineId::Mojeek, 1, &[]),
        Delayed::new(EngineId::Yep, 1, &[]),
    ];

    let round = fan_out("zzzz", &adapters, DEADLINE).await;

    assert!(round.results.is_empty());
    assert_eq!(round.succeeded(), 2);
}
