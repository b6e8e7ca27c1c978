//! Configuration file watcher for hot reload.
//!
//! A reload rebuilds a complete `Router` from the file. Dispatches already in
//! flight keep the snapshot they loaded; new dispatches see the new tables.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::action::ActionInvoker;
use crate::config::loader::load_router;
use crate::routing::Router;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    invoker: Arc<dyn ActionInvoker>,
    update_tx: mpsc::UnboundedSender<Router>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for rebuilt routers.
    pub fn new(
        path: &Path,
        invoker: Arc<dyn ActionInvoker>,
    ) -> (Self, mpsc::UnboundedReceiver<Router>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                invoker,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// Watching stops when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let invoker = self.invoker;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Config file change detected, reloading...");
                        match load_router(&path, invoker.clone()) {
                            Ok(router) => {
                                let _ = tx.send(router);
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to reload config. Keeping current router.");
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Shared, atomically replaceable router.
#[derive(Clone)]
pub struct RouterHandle {
    current: Arc<ArcSwap<Router>>,
}

impl RouterHandle {
    pub fn new(router: Router) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(router)),
        }
    }

    /// The current router snapshot.
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Replace the router for all subsequent loads.
    pub fn store(&self, router: Router) {
        tracing::info!(
            routes = router.routes().len(),
            redirects = router.redirects().len(),
            handlers = router.handlers().len(),
            "Router replaced"
        );
        self.current.store(Arc::new(router));
    }

    /// Apply routers from `updates` until the sender side closes.
    pub async fn follow(self, mut updates: mpsc::UnboundedReceiver<Router>) {
        while let Some(router) = updates.recv().await {
            self.store(router);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionRegistry, Outcome};
    use crate::http::{Response, ServerRequest};

    fn router(body: &'static str) -> Router {
        let mut builder = Router::builder();
        builder
            .link("", "/", Action::closure(move |_| Outcome::done(body)))
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let handle = RouterHandle::new(router("first"));
        let snapshot = handle.load();

        handle.store(router("second"));

        let mut request = ServerRequest::parse("/").unwrap();
        assert_eq!(snapshot.run(&mut request, Response::default()).body(), Some("first"));
        assert_eq!(handle.load().run(&mut request, Response::default()).body(), Some("second"));
    }

    #[tokio::test]
    async fn test_follow_applies_updates() {
        let handle = RouterHandle::new(router("first"));
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(router("second")).unwrap();
        drop(tx);
        handle.clone().follow(rx).await;

        let mut request = ServerRequest::parse("/").unwrap();
        assert_eq!(handle.load().run(&mut request, Response::default()).body(), Some("second"));
    }

    #[tokio::test]
    async fn test_watcher_reloads_on_change() {
        let dir = std::env::temp_dir().join(format!("route-dispatch-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("routes.toml");
        std::fs::write(&path, "[[routes]]\nroute = \"/a\"\naction = \"A::a\"\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path, Arc::new(ActionRegistry::new()));
        let _guard = watcher.run().unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(
            &path,
            "[[routes]]\nroute = \"/a\"\naction = \"A::a\"\n\n[[routes]]\nroute = \"/b\"\naction = \"B::b\"\n",
        )
        .unwrap();

        let router = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                match rx.recv().await {
                    Some(router) if router.routes().len() == 2 => break router,
                    Some(_) => continue,
                    None => panic!("watcher channel closed"),
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(router.routes().len(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }
}
