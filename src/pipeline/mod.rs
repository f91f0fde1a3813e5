// Deal resolution: search ladder, filters, aggregation
pub mod aggregate;

use crate::config::AppConfig;
use crate::extract;
use crate::model::{
    DetailPayload, GameQuery, RawDeal, ResolveOutcome, ResolvedCatalog, SourceError,
};
use crate::normalizer;
use crate::sources::DealSource;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Builds the search context for one game-detail visit. The platform app
/// id comes out of the detail payload when one was fetched.
pub fn build_query(
    game_id: impl Into<String>,
    display_title: impl Into<String>,
    detail: Option<&DetailPayload>,
) -> GameQuery {
    let app_id = detail.and_then(|d| extract::steam_app_id(d.raw()));
    GameQuery::new(game_id, display_title).with_platform_app_id(app_id)
}

/// Runs the lookup ladder against the deal feed and shapes the results for
/// presentation. Stateless between passes apart from the generation
/// counter used to drop stale results.
pub struct Resolver {
    deals: Arc<dyn DealSource>,
    page_size: u32,
    step_timeout: Duration,
    generation: AtomicU64,
}

impl Resolver {
    pub fn new(deals: Arc<dyn DealSource>, config: &AppConfig) -> Self {
        Self {
            deals,
            page_size: config.page_size,
            step_timeout: Duration::from_secs(config.step_timeout_seconds),
            generation: AtomicU64::new(0),
        }
    }

    /// Marks every in-flight pass stale, e.g. when the consuming screen is
    /// torn down.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// One full resolution pass. Source failures degrade to an empty
    /// catalog; the only non-catalog outcome is a pass overtaken by a
    /// newer one.
    pub async fn resolve(&self, query: &GameQuery) -> ResolveOutcome {
        let pass = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "Resolving '{}' (game {}, app id {:?})",
            query.display_title, query.game_id, query.platform_app_id
        );

        let results = self.run_ladder(query).await;
        let results = apply_year_filter(results, &query.display_title);
        let results = apply_prefix_filter(results, &query.display_title);

        let catalog = ResolvedCatalog {
            variants: aggregate::aggregate(results),
            resolved_at: Utc::now(),
        };

        if self.generation.load(Ordering::SeqCst) != pass {
            debug!("Pass for '{}' superseded, dropping result", query.display_title);
            return ResolveOutcome::Superseded;
        }
        ResolveOutcome::Resolved(catalog)
    }

    /// Strict sequential fallback: platform app id, then exact title, then
    /// fuzzy title. Each later step runs only when the earlier ones came
    /// back empty.
    async fn run_ladder(&self, query: &GameQuery) -> Vec<RawDeal> {
        if let Some(app_id) = &query.platform_app_id {
            let found = self
                .guarded(
                    "steam-app-id",
                    self.deals.deals_by_steam_app_id(app_id, self.page_size),
                )
                .await;
            if !found.is_empty() {
                return found;
            }
        }

        let found = self
            .guarded(
                "exact-title",
                self.deals
                    .deals_by_title_exact(&query.display_title, self.page_size),
            )
            .await;
        if !found.is_empty() {
            return found;
        }

        // Unconditional last resort; its failure still means an empty
        // catalog, never an error surfaced to the caller.
        self.guarded(
            "fuzzy-title",
            self.deals.deals_by_title(&query.display_title, self.page_size),
        )
        .await
    }

    /// Applies the per-step deadline and converts failures to zero results
    /// so the ladder can move on.
    async fn guarded<F>(&self, step: &str, lookup: F) -> Vec<RawDeal>
    where
        F: Future<Output = Result<Vec<RawDeal>, SourceError>>,
    {
        match timeout(self.step_timeout, lookup).await {
            Ok(Ok(deals)) => {
                debug!("Ladder step {} returned {} deals", step, deals.len());
                deals
            }
            Ok(Err(e)) => {
                warn!("Ladder step {} failed: {}", step, e);
                Vec::new()
            }
            Err(_) => {
                warn!("Ladder step {} exceeded deadline", step);
                Vec::new()
            }
        }
    }
}

/// Keeps deals carrying the display title's parenthesized year, unless
/// that would empty the set entirely.
fn apply_year_filter(deals: Vec<RawDeal>, display_title: &str) -> Vec<RawDeal> {
    let Some(year) = normalizer::extract_year(display_title) else {
        return deals;
    };
    let needle = format!("({})", year);
    let filtered: Vec<RawDeal> = deals
        .iter()
        .filter(|d| d.title.contains(&needle))
        .cloned()
        .collect();
    if filtered.is_empty() { deals } else { filtered }
}

/// Keeps deals whose normalized title starts with the normalized base
/// title (year stripped), unless that would empty the set entirely.
fn apply_prefix_filter(deals: Vec<RawDeal>, display_title: &str) -> Vec<RawDeal> {
    let base = normalizer::normalize_title(&normalizer::strip_year(display_title));
    let filtered: Vec<RawDeal> = deals
        .iter()
        .filter(|d| normalizer::normalize_title(&d.title).starts_with(&base))
        .cloned()
        .collect();
    if filtered.is_empty() { deals } else { filtered }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn deal(title: &str, store: &str, sale: &str) -> RawDeal {
        RawDeal {
            title: title.to_string(),
            deal_id: format!("{}-{}", title, store),
            store_id: Some(store.to_string()),
            sale_price: Some(sale.to_string()),
            normal_price: None,
            savings: None,
            steam_app_id: None,
            thumb: None,
        }
    }

    fn config() -> AppConfig {
        AppConfig::default()
    }

    /// Scripted deal feed recording which ladder steps were hit.
    enum Step {
        Deals(Vec<RawDeal>),
        Fail,
        Hang,
    }

    struct ScriptedDeals {
        by_app_id: Step,
        by_exact: Step,
        by_fuzzy: Step,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedDeals {
        fn new(by_app_id: Step, by_exact: Step, by_fuzzy: Step) -> Self {
            Self {
                by_app_id,
                by_exact,
                by_fuzzy,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        async fn respond(&self, name: &'static str, step: &Step) -> Result<Vec<RawDeal>, SourceError> {
            self.calls.lock().unwrap().push(name);
            match step {
                Step::Deals(deals) => Ok(deals.clone()),
                Step::Fail => Err(SourceError::Http("connection reset".into())),
                Step::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    #[async_trait::async_trait]
    impl DealSource for ScriptedDeals {
        async fn deals_by_steam_app_id(
            &self,
            _app_id: &str,
            _page_size: u32,
        ) -> Result<Vec<RawDeal>, SourceError> {
            self.respond("app-id", &self.by_app_id).await
        }

        async fn deals_by_title_exact(
            &self,
            _title: &str,
            _page_size: u32,
        ) -> Result<Vec<RawDeal>, SourceError> {
            self.respond("exact", &self.by_exact).await
        }

        async fn deals_by_title(
            &self,
            _title: &str,
            _page_size: u32,
        ) -> Result<Vec<RawDeal>, SourceError> {
            self.respond("fuzzy", &self.by_fuzzy).await
        }
    }

    fn query_with_app_id(title: &str) -> GameQuery {
        GameQuery::new("42", title).with_platform_app_id(Some("1245620".into()))
    }

    fn catalog(outcome: ResolveOutcome) -> ResolvedCatalog {
        match outcome {
            ResolveOutcome::Resolved(catalog) => catalog,
            ResolveOutcome::Superseded => panic!("pass was unexpectedly superseded"),
        }
    }

    #[tokio::test]
    async fn ladder_short_circuits_on_app_id_hit() {
        let feed = Arc::new(ScriptedDeals::new(
            Step::Deals(vec![deal("Elden Ring", "1", "39.99")]),
            Step::Deals(vec![deal("unused", "2", "1.00")]),
            Step::Deals(vec![deal("unused", "3", "1.00")]),
        ));
        let resolver = Resolver::new(feed.clone(), &config());

        let result = catalog(resolver.resolve(&query_with_app_id("Elden Ring")).await);
        assert_eq!(feed.calls(), vec!["app-id"]);
        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.variants[0].title_variant, "Elden Ring");
    }

    #[tokio::test]
    async fn ladder_skips_app_id_step_without_identifier() {
        let feed = Arc::new(ScriptedDeals::new(
            Step::Fail,
            Step::Deals(vec![deal("Elden Ring", "1", "39.99")]),
            Step::Deals(vec![]),
        ));
        let resolver = Resolver::new(feed.clone(), &config());

        let query = GameQuery::new("42", "Elden Ring");
        catalog(resolver.resolve(&query).await);
        assert_eq!(feed.calls(), vec!["exact"]);
    }

    #[tokio::test]
    async fn ladder_exhaustion_reaches_fuzzy_despite_errors() {
        let feed = Arc::new(ScriptedDeals::new(
            Step::Fail,
            Step::Fail,
            Step::Deals(vec![deal("Elden Ring", "1", "39.99")]),
        ));
        let resolver = Resolver::new(feed.clone(), &config());

        let result = catalog(resolver.resolve(&query_with_app_id("Elden Ring")).await);
        assert_eq!(feed.calls(), vec!["app-id", "exact", "fuzzy"]);
        assert_eq!(result.variants.len(), 1);
    }

    #[tokio::test]
    async fn all_steps_empty_yields_empty_catalog() {
        let feed = Arc::new(ScriptedDeals::new(
            Step::Deals(vec![]),
            Step::Deals(vec![]),
            Step::Deals(vec![]),
        ));
        let resolver = Resolver::new(feed.clone(), &config());

        let result = catalog(resolver.resolve(&query_with_app_id("Obscure Game")).await);
        assert!(result.is_empty());
        assert_eq!(feed.calls(), vec!["app-id", "exact", "fuzzy"]);
    }

    #[tokio::test]
    async fn fuzzy_failure_yields_empty_catalog_not_error() {
        let feed = Arc::new(ScriptedDeals::new(Step::Fail, Step::Fail, Step::Fail));
        let resolver = Resolver::new(feed.clone(), &config());

        let result = catalog(resolver.resolve(&query_with_app_id("Obscure Game")).await);
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn hung_step_counts_as_zero_results() {
        let feed = Arc::new(ScriptedDeals::new(
            Step::Hang,
            Step::Deals(vec![deal("Elden Ring", "1", "39.99")]),
            Step::Deals(vec![]),
        ));
        let mut cfg = config();
        cfg.step_timeout_seconds = 0;
        let resolver = Resolver::new(feed.clone(), &cfg);

        let result = catalog(resolver.resolve(&query_with_app_id("Elden Ring")).await);
        assert_eq!(feed.calls(), vec!["app-id", "exact"]);
        assert_eq!(result.variants.len(), 1);
    }

    #[tokio::test]
    async fn superseded_pass_is_not_applied() {
        struct GatedDeals {
            entered: Arc<Notify>,
            release: Arc<Notify>,
        }

        #[async_trait::async_trait]
        impl DealSource for GatedDeals {
            async fn deals_by_steam_app_id(
                &self,
                _app_id: &str,
                _page_size: u32,
            ) -> Result<Vec<RawDeal>, SourceError> {
                Ok(Vec::new())
            }

            async fn deals_by_title_exact(
                &self,
                _title: &str,
                _page_size: u32,
            ) -> Result<Vec<RawDeal>, SourceError> {
                Ok(Vec::new())
            }

            async fn deals_by_title(
                &self,
                _title: &str,
                _page_size: u32,
            ) -> Result<Vec<RawDeal>, SourceError> {
                self.entered.notify_one();
                self.release.notified().await;
                Ok(vec![deal("Stale Game", "1", "9.99")])
            }
        }

        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let feed = Arc::new(GatedDeals {
            entered: entered.clone(),
            release: release.clone(),
        });
        let resolver = Arc::new(Resolver::new(feed, &config()));

        let stale_resolver = resolver.clone();
        let stale = tokio::spawn(async move {
            let query = GameQuery::new("1", "Stale Game");
            stale_resolver.resolve(&query).await
        });

        // The screen moved on while the first pass was still in flight.
        entered.notified().await;
        resolver.invalidate();
        release.notify_one();

        match stale.await.unwrap() {
            ResolveOutcome::Superseded => {}
            ResolveOutcome::Resolved(_) => panic!("stale pass must not be applied"),
        }
    }

    #[test]
    fn year_filter_keeps_matching_year() {
        let deals = vec![
            deal("Foo (2013)", "1", "9.99"),
            deal("Foo (2020 Remaster)", "2", "19.99"),
        ];
        let filtered = apply_year_filter(deals, "Foo (2013)");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Foo (2013)");
    }

    #[test]
    fn year_filter_is_non_destructive_when_nothing_matches() {
        let deals = vec![
            deal("Game", "1", "9.99"),
            deal("Game Deluxe", "2", "19.99"),
        ];
        let filtered = apply_year_filter(deals.clone(), "Game (2013)");
        assert_eq!(filtered.len(), deals.len());
    }

    #[test]
    fn year_filter_passes_through_without_year() {
        let deals = vec![deal("Game", "1", "9.99")];
        assert_eq!(apply_year_filter(deals, "Game").len(), 1);
    }

    #[test]
    fn prefix_filter_keeps_matching_prefixes() {
        let deals = vec![
            deal("DOOM Eternal", "1", "29.99"),
            deal("Mystery Bundle feat. DOOM", "2", "4.99"),
        ];
        let filtered = apply_prefix_filter(deals, "DOOM (2016)");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "DOOM Eternal");
    }

    #[test]
    fn prefix_filter_is_non_destructive_when_nothing_matches() {
        let deals = vec![deal("Completely Different", "1", "9.99")];
        assert_eq!(apply_prefix_filter(deals, "Elden Ring").len(), 1);
    }

    #[test]
    fn build_query_pulls_app_id_from_detail() {
        let detail = DetailPayload::new(serde_json::json!({
            "stores": [{"url": "https://store.steampowered.com/app/1245620/"}],
        }));
        let query = build_query("42", "Elden Ring", Some(&detail));
        assert_eq!(query.platform_app_id.as_deref(), Some("1245620"));

        let query = build_query("42", "Elden Ring", None);
        assert_eq!(query.platform_app_id, None);
    }
}
