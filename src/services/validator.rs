use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, Semaphore};

use crate::domain::ValidatedSupplier;

const MIN_POOL_WORKERS: usize = 4;
const MAX_POOL_WORKERS: usize = 32;

pub fn pool_size(num_links: usize) -> usize {
    num_links.clamp(MIN_POOL_WORKERS, MAX_POOL_WORKERS)
}

/// Run the per-URL validate function over all links with a bounded worker
/// pool, stopping as soon as `quota` results were accepted.
///
/// Contract:
/// - accepted results land in a mutex-protected shared list, in completion
///   order (non-deterministic across runs);
/// - the instant the list reaches the quota a shared flag is set; workers
///   check it before starting expensive work and skip when set;
/// - in-flight validations are never interrupted, so the returned list may
///   overshoot the quota by up to the pool width;
/// - a worker failure counts as "no match" for that URL and never aborts
///   the pool.
pub async fn validate_until_quota<F, Fut>(
    links: Vec<String>,
    quota: usize,
    validate: F,
) -> Vec<ValidatedSupplier>
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Option<ValidatedSupplier>> + Send + 'static,
{
    if links.is_empty() || quota == 0 {
        return vec![];
    }

    let permits = pool_size(links.len());
    let semaphore = Arc::new(Semaphore::new(permits));
    let accepted: Arc<Mutex<Vec<ValidatedSupplier>>> = Arc::new(Mutex::new(vec![]));
    let stop_flag = Arc::new(AtomicBool::new(false));
    let (completion_sender, mut completion_receiver) = mpsc::unbounded_channel::<()>();

    log::info!(
        "Validating {} candidates with {} workers, quota {}",
        links.len(),
        permits,
        quota
    );

    for link in links {
        let semaphore = semaphore.clone();
        let accepted = accepted.clone();
        let stop_flag = stop_flag.clone();
        let completion_sender = completion_sender.clone();
        let validate = validate.clone();

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };

            // Queued tasks that wake after the quota was met skip their
            // expensive work entirely.
            if stop_flag.load(Ordering::SeqCst) {
                _ = completion_sender.send(());
                return;
            }

            if let Some(supplier) = validate(link).await {
                let mut list = accepted.lock().await;
                list.push(supplier);
                if list.len() >= quota {
                    stop_flag.store(true, Ordering::SeqCst);
                }
            }

            _ = completion_sender.send(());
        });
    }
    drop(completion_sender);

    // Drain completions until the quota flag is set or every task resolved.
    // Returning here shuts the pool down without waiting for in-flight
    // workers; their late results are discarded with the shared list.
    while completion_receiver.recv().await.is_some() {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
    }

    let list = accepted.lock().await;
    list.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier(url: &str) -> ValidatedSupplier {
        ValidatedSupplier {
            url: url.to_string(),
            company_name: "Test".to_string(),
            email: None,
            phone: None,
            summary: None,
        }
    }

    #[tokio::test]
    async fn accepts_only_the_relevant_candidate() {
        let links = vec![
            "https://relevant.example.com".to_string(),
            "https://irrelevant.example.com".to_string(),
        ];

        let results = validate_until_quota(links, 10, |link: String| async move {
            match link.contains("irrelevant") {
                true => None,
                false => Some(supplier(&link)),
            }
        })
        .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://relevant.example.com");
    }

    #[tokio::test]
    async fn quota_caps_accepted_results_with_bounded_overshoot() {
        let links: Vec<String> = (0..10)
            .map(|i| format!("https://supplier-{}.example.com", i))
            .collect();
        let width = pool_size(links.len());

        let results = validate_until_quota(links, 2, |link: String| async move {
            Some(supplier(&link))
        })
        .await;

        assert!(results.len() >= 2, "quota must be reached");
        assert!(
            results.len() <= width,
            "overshoot bounded by pool width: got {}",
            results.len()
        );
    }

    #[tokio::test]
    async fn worker_failures_never_abort_the_pool() {
        let links: Vec<String> = (0..6)
            .map(|i| format!("https://supplier-{}.example.com", i))
            .collect();

        let results = validate_until_quota(links, 10, |link: String| async move {
            if link.contains("supplier-3") {
                // A panicking worker is equivalent to a thrown exception:
                // logged by the runtime and treated as no match.
                panic!("simulated worker failure");
            }
            Some(supplier(&link))
        })
        .await;

        assert_eq!(results.len(), 5);
    }

    #[tokio::test]
    async fn empty_input_and_zero_quota_yield_empty() {
        let none = validate_until_quota(vec![], 5, |link: String| async move {
            Some(supplier(&link))
        })
        .await;
        assert!(none.is_empty());

        let zero = validate_until_quota(
            vec!["https://a.example.com".to_string()],
            0,
            |link: String| async move { Some(supplier(&link)) },
        )
        .await;
        assert!(zero.is_empty());
    }

    #[test]
    fn pool_size_is_clamped() {
        assert_eq!(pool_size(1), 4);
        assert_eq!(pool_size(10), 10);
        assert_eq!(pool_size(100), 32);
    }
}
