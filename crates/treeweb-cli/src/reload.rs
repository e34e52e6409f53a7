//! Rebuild-and-restart for `treeweb serve`.
//!
//! A notify watcher wakes the loop early; a periodic sweep catches anything
//! the watcher misses. Either way the decision to rebuild is made by comparing
//! fingerprints of the served directory, so spurious wakeups are harmless.

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::PoisonError;
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};
use treeweb_web::{AppConfig, AppState, WebError, do_build};

const SCRATCH_DIRS: [&str; 3] = [".git", "target", "node_modules"];
const QUIET_PERIOD: Duration = Duration::from_millis(120);
const SWEEP_PERIOD: Duration = Duration::from_millis(1500);

type Subscription = (RecommendedWatcher, mpsc::UnboundedReceiver<()>);

/// Paths whose changes never trigger a rebuild: our own build outputs and
/// tool scratch directories.
#[derive(Debug, Clone)]
struct Skips {
    outputs: Vec<PathBuf>,
}

impl Skips {
    fn for_config(config: &AppConfig) -> Self {
        Self {
            outputs: vec![config.html_dir.clone(), config.js_dir.clone()],
        }
    }

    fn covers(&self, path: &Path) -> bool {
        self.outputs.iter().any(|dir| path.starts_with(dir))
            || path
                .iter()
                .any(|seg| seg.to_str().is_some_and(|s| SCRATCH_DIRS.contains(&s)))
    }
}

#[derive(Debug)]
struct SourceTree {
    root: PathBuf,
    skips: Skips,
    fingerprint: u64,
}

impl SourceTree {
    fn new(root: PathBuf, config: &AppConfig) -> Self {
        let mut tree = Self {
            root,
            skips: Skips::for_config(config),
            fingerprint: 0,
        };
        tree.fingerprint = tree.current_fingerprint();
        tree
    }

    /// Relative path, length and mtime of every file outside the skipped
    /// paths, plus the bytes of text sources. Same-size edits inside one
    /// mtime tick only show up in the bytes.
    fn current_fingerprint(&self) -> u64 {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for path in entries.flatten().map(|entry| entry.path()) {
                if self.skips.covers(&path) {
                    continue;
                }
                if path.is_dir() {
                    pending.push(path);
                } else {
                    files.push(path);
                }
            }
        }
        files.sort();

        let mut hasher = DefaultHasher::new();
        for path in &files {
            path.strip_prefix(&self.root).unwrap_or(path).hash(&mut hasher);
            if let Ok(meta) = fs::metadata(path) {
                meta.len().hash(&mut hasher);
                meta.modified().ok().hash(&mut hasher);
            }
            if is_text_source(path) {
                if let Ok(bytes) = fs::read(path) {
                    bytes.hash(&mut hasher);
                }
            }
        }
        hasher.finish()
    }

    /// Reload the config and force a build if anything changed since the
    /// last call. Returns the new config when a rebuild happened.
    fn rebuild_if_changed(&mut self) -> Result<Option<AppConfig>, WebError> {
        let now = self.current_fingerprint();
        if now == self.fingerprint {
            return Ok(None);
        }
        self.fingerprint = now;

        let config = AppConfig::load(&self.root)?;
        do_build(&config, &[], true)?;
        self.skips = Skips::for_config(&config);
        // Output dirs may have moved, which changes what is hashed.
        self.fingerprint = self.current_fingerprint();
        Ok(Some(config))
    }
}

fn is_text_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("json" | "rs" | "toml" | "html" | "css" | "js")
    )
}

fn subscribe(tree: &SourceTree) -> notify::Result<Subscription> {
    let (tx, rx) = mpsc::unbounded_channel();
    let skips = tree.skips.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        // Watcher errors still wake the loop; the fingerprint decides.
        let wanted = res
            .map(|event| event.paths.iter().any(|path| !skips.covers(path)))
            .unwrap_or(true);
        if wanted {
            let _ = tx.send(());
        }
    })?;
    watcher.watch(&tree.root, RecursiveMode::Recursive)?;
    Ok((watcher, rx))
}

/// Returns once no event has arrived for `QUIET_PERIOD`, so an editor's
/// burst of writes produces one rebuild.
async fn settle(rx: &mut mpsc::UnboundedReceiver<()>) {
    while let Ok(Some(())) = timeout(QUIET_PERIOD, rx.recv()).await {}
}

fn apply(tree: &mut SourceTree, state: &AppState) {
    match tokio::task::block_in_place(|| tree.rebuild_if_changed()) {
        Ok(Some(config)) => {
            state.reload(config);
            log::info!("[watch] sources changed; rebuilt and restarted simulation");
        }
        Ok(None) => {}
        Err(e) => log::error!("[watch] rebuild failed: {e}"),
    }
}

pub(crate) async fn watch(root: PathBuf, state: AppState) {
    let config = state
        .config
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let mut tree = SourceTree::new(root, &config);

    let mut events = match subscribe(&tree) {
        Ok(sub) => {
            log::info!("[watch] watching {}", tree.root.display());
            Some(sub)
        }
        Err(e) => {
            log::warn!("[watch] filesystem watcher unavailable ({e}); sweeping only");
            None
        }
    };
    let mut sweep = tokio::time::interval(SWEEP_PERIOD);

    loop {
        let closed = match events.as_mut() {
            Some((_, rx)) => tokio::select! {
                _ = sweep.tick() => false,
                got = rx.recv() => match got {
                    Some(()) => {
                        settle(rx).await;
                        false
                    }
                    None => true,
                },
            },
            None => {
                sweep.tick().await;
                false
            }
        };
        if closed {
            log::warn!("[watch] watcher channel closed; sweeping only");
            events = None;
        }
        apply(&mut tree, &state);
    }
}
