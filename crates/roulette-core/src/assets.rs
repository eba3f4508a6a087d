//! Portrait manifest and the startup asset join.

use std::future::Future;
use std::pin::pin;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::{FutureExt, select_biased};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// One portrait, keyed by the marble name it decorates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortraitEntry {
    pub name: String,
    pub url: String,
}

/// List of portraits to load at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortraitManifest {
    pub entries: Vec<PortraitEntry>,
}

impl PortraitManifest {
    /// Parses a JSON array of `{name, url}` objects.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of [`load_all`]. Every entry ends up in exactly one list.
#[derive(Debug)]
pub struct LoadReport<T> {
    pub loaded: Vec<(String, T)>,
    pub failed: Vec<(String, RenderError)>,
    /// Still pending when the deadline fired.
    pub timed_out: Vec<String>,
}

impl<T> Default for LoadReport<T> {
    fn default() -> Self {
        Self {
            loaded: Vec::new(),
            failed: Vec::new(),
            timed_out: Vec::new(),
        }
    }
}

impl<T> LoadReport<T> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.timed_out.is_empty()
    }

    /// `AssetTimeout` when the deadline cut the join short.
    pub fn timeout_error(&self) -> Option<RenderError> {
        (!self.timed_out.is_empty()).then(|| RenderError::AssetTimeout {
            pending: self.timed_out.len(),
        })
    }
}

/// Loads every entry concurrently. A failed load is recorded and never
/// affects the others; when `deadline` resolves first, whatever is still
/// pending is reported as timed out. Completed loads win over a deadline
/// that becomes ready at the same time.
pub async fn load_all<T, F, Fut, D>(
    entries: &[PortraitEntry],
    loader: F,
    deadline: D,
) -> LoadReport<T>
where
    F: Fn(&PortraitEntry) -> Fut,
    Fut: Future<Output = Result<T, RenderError>>,
    D: Future<Output = ()>,
{
    let mut pending: FuturesUnordered<_> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let load = loader(entry);
            async move { (index, load.await) }
        })
        .collect();
    let mut deadline = pin!(deadline.fuse());
    let mut settled = vec![false; entries.len()];
    let mut report = LoadReport::default();

    loop {
        select_biased! {
            next = pending.next() => match next {
                Some((index, result)) => {
                    settled[index] = true;
                    let name = entries[index].name.clone();
                    match result {
                        Ok(asset) => {
                            tracing::debug!(%name, "Asset loaded");
                            report.loaded.push((name, asset));
                        }
                        Err(err) => {
                            tracing::warn!(%name, %err, "Asset failed to load");
                            report.failed.push((name, err));
                        }
                    }
                }
                None => break,
            },
            () = deadline => {
                // Names may repeat, so pending entries are found by index.
                report.timed_out = entries
                    .iter()
                    .zip(&settled)
                    .filter(|(_, done)| !**done)
                    .map(|(entry, _)| entry.name.clone())
                    .collect();
                if let Some(err) = report.timeout_error() {
                    tracing::warn!(%err, "Asset loading cut short");
                }
                break;
            }
        }
    }

    tracing::info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        timed_out = report.timed_out.len(),
        "Assets ready"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::{self, BoxFuture};

    fn manifest() -> PortraitManifest {
        PortraitManifest::from_json(
            r#"[
                {"name": "alice", "url": "img/alice.png"},
                {"name": "bob", "url": "img/bob.png"},
                {"name": "carol", "url": "img/carol.png"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_manifest_parses_array() {
        let m = manifest();
        assert_eq!(m.len(), 3);
        assert_eq!(m.entries[1].url, "img/bob.png");
        assert!(PortraitManifest::from_json("{").is_err());
    }

    #[test]
    fn test_one_failure_does_not_block_others() {
        let m = manifest();
        let report = block_on(load_all(
            &m.entries,
            |entry| {
                let result = if entry.name == "bob" {
                    Err(RenderError::AssetLoad {
                        name: entry.name.clone(),
                        reason: "404".into(),
                    })
                } else {
                    Ok(entry.url.len())
                };
                future::ready(result)
            },
            future::pending(),
        ));
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "bob");
        assert!(report.timed_out.is_empty());
        assert!(!report.is_complete());
    }

    #[test]
    fn test_deadline_reports_pending_loads() {
        let m = manifest();
        let report = block_on(load_all(
            &m.entries,
            |entry| -> BoxFuture<'static, Result<(), RenderError>> {
                if entry.name == "carol" {
                    future::pending().boxed()
                } else {
                    future::ready(Ok(())).boxed()
                }
            },
            future::ready(()),
        ));
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.timed_out, vec!["carol".to_string()]);
        assert!(matches!(
            report.timeout_error(),
            Some(RenderError::AssetTimeout { pending: 1 })
        ));
    }

    #[test]
    fn test_duplicate_names_each_land_in_one_list() {
        let m = PortraitManifest::from_json(
            r#"[
                {"name": "alice", "url": "img/alice-1.png"},
                {"name": "alice", "url": "img/alice-2.png"},
                {"name": "bob", "url": "img/bob.png"}
            ]"#,
        )
        .unwrap();
        let report = block_on(load_all(
            &m.entries,
            |entry| -> BoxFuture<'static, Result<(), RenderError>> {
                if entry.url == "img/alice-1.png" {
                    future::ready(Ok(())).boxed()
                } else {
                    future::pending().boxed()
                }
            },
            future::ready(()),
        ));
        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.loaded[0].0, "alice");
        assert_eq!(
            report.timed_out,
            vec!["alice".to_string(), "bob".to_string()]
        );
        let total = report.loaded.len() + report.failed.len() + report.timed_out.len();
        assert_eq!(total, m.len());
    }

    #[test]
    fn test_empty_manifest_completes_immediately() {
        let report = block_on(load_all(
            &[],
            |_| future::ready(Ok::<(), RenderError>(())),
            future::pending(),
        ));
        assert!(report.is_complete());
        assert!(report.loaded.is_empty());
    }
}
