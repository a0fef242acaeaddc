use crate::catalog::{Catalog, LookupResolver};
use crate::decklist::ItemName;
use crate::fetch::ImageFetcher;
use crate::progress::{Phase, ProgressState};
use crate::results::ResultSet;
use log::{debug, info, warn};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const FALLBACK_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Items looked up and downloaded at the same time.
    pub concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            concurrency: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(FALLBACK_CONCURRENCY),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub names: usize,
    /// Names without a usable front image, in completion order.
    pub missed: Vec<String>,
    pub images_fetched: usize,
    pub images_failed: usize,
    /// Item tasks that panicked instead of returning.
    pub tasks_failed: usize,
}

#[derive(Debug)]
struct ItemOutcome {
    name: ItemName,
    resolved: bool,
    fetched: usize,
    failed: usize,
}

/// Looks up and downloads every item of a list with bounded parallelism.
#[derive(Debug)]
pub struct FetchCoordinator<C> {
    resolver: LookupResolver<C>,
    fetcher: ImageFetcher<C>,
    options: FetchOptions,
}

impl<C: Catalog + 'static> FetchCoordinator<C> {
    pub fn new(catalog: Arc<C>, output_dir: impl Into<PathBuf>, options: FetchOptions) -> Self {
        FetchCoordinator {
            resolver: LookupResolver::new(Arc::clone(&catalog)),
            fetcher: ImageFetcher::new(catalog, output_dir),
            options,
        }
    }

    /// Process every name and return once all of them are done. Successful
    /// downloads are appended to `results` as they complete and counted on
    /// `progress`, which ends at its halfway mark.
    pub async fn run(
        &self,
        names: Vec<ItemName>,
        results: Arc<ResultSet>,
        progress: Arc<ProgressState>,
    ) -> FetchSummary {
        let workers = self.options.concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut summary = FetchSummary {
            names: names.len(),
            ..Default::default()
        };

        info!("Fetching {} item names with {} workers", names.len(), workers);
        progress.enter_phase(Phase::Fetching);

        let mut tasks = JoinSet::new();
        for name in names {
            let semaphore = Arc::clone(&semaphore);
            let resolver = self.resolver.clone();
            let fetcher = self.fetcher.clone();
            let results = Arc::clone(&results);
            let progress = Arc::clone(&progress);

            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire().await.ok();
                process_item(&resolver, &fetcher, name, &results, &progress).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    summary.images_fetched += outcome.fetched;
                    summary.images_failed += outcome.failed;
                    if !outcome.resolved {
                        summary.missed.push(outcome.name.to_string());
                    }
                }
                Err(e) => {
                    warn!("item task did not finish: {}", e);
                    summary.tasks_failed += 1;
                }
            }
        }

        progress.finish_fetch_phase();
        info!(
            "Fetch phase complete: {} images fetched, {} failed, {} names missed",
            summary.images_fetched,
            summary.images_failed,
            summary.missed.len()
        );
        summary
    }
}

async fn process_item<C: Catalog>(
    resolver: &LookupResolver<C>,
    fetcher: &ImageFetcher<C>,
    name: ItemName,
    results: &ResultSet,
    progress: &ProgressState,
) -> ItemOutcome {
    let faces = resolver.resolve(&name).await;
    let downloads = faces.image_refs(&name);
    let mut outcome = ItemOutcome {
        resolved: !downloads.is_empty(),
        name,
        fetched: 0,
        failed: 0,
    };
    if !outcome.resolved {
        debug!("skipping '{}', it has no front image", outcome.name);
        return outcome;
    }

    for download in downloads {
        match fetcher.fetch(&download).await {
            Ok(image) => {
                results.push(image);
                progress.increment();
                outcome.fetched += 1;
            }
            Err(_) => outcome.failed += 1,
        }
    }
    outcome
}
