use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Quiet period after the last event before `on_change` fires
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches catalog files and fragment directories for changes.
///
/// Files are watched through their parent directory, so a save that writes a
/// temporary file and renames it over the catalog keeps being noticed.
pub struct CatalogWatcher {
    _watcher: RecommendedWatcher,
}

/// What a single watched path matches
#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    Dir(PathBuf),
}

impl Target {
    fn matches(&self, changed: &Path) -> bool {
        match self {
            Target::File(file) => changed == file,
            Target::Dir(dir) => changed.starts_with(dir),
        }
    }
}

impl CatalogWatcher {
    pub fn new<F>(paths: Vec<PathBuf>, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;

        let mut targets = Vec::new();
        let mut parents = BTreeSet::new();
        for path in &paths {
            if path.is_dir() {
                let dir = path.canonicalize()?;
                watcher.watch(&dir, RecursiveMode::Recursive)?;
                info!("Watching catalog directory: {}", dir.display());
                targets.push(Target::Dir(dir));
                continue;
            }

            let (Some(parent), Some(name)) = (parent_dir(path), path.file_name()) else {
                warn!("Catalog path has no parent directory, skipping: {}", path.display());
                continue;
            };
            if !parent.is_dir() {
                warn!("Catalog path does not exist, skipping: {}", path.display());
                continue;
            }
            let parent = parent.canonicalize()?;
            if parents.insert(parent.clone()) {
                watcher.watch(&parent, RecursiveMode::NonRecursive)?;
            }
            info!("Watching catalog file: {}", path.display());
            targets.push(Target::File(parent.join(name)));
        }

        let relevant = move |event: &Event| {
            event
                .paths
                .iter()
                .any(|changed| targets.iter().any(|target| target.matches(changed)))
        };

        std::thread::spawn(move || loop {
            match rx.recv() {
                Ok(Ok(event)) => {
                    if !relevant(&event) {
                        continue;
                    }
                    // Editors write in bursts; wait for the burst to end
                    loop {
                        match rx.recv_timeout(DEBOUNCE) {
                            Ok(_) => continue,
                            Err(RecvTimeoutError::Timeout) => break,
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }
                    info!("Catalog change detected, reloading...");
                    on_change();
                }
                Ok(Err(e)) => error!("Watch error: {:?}", e),
                Err(e) => {
                    error!("Watch channel error: {:?}", e);
                    break;
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}

/// `catalog/Fields.json` -> `catalog`, `Fields.json` -> `.`
fn parent_dir(path: &Path) -> Option<&Path> {
    match path.parent()? {
        parent if parent.as_os_str().is_empty() => Some(Path::new(".")),
        parent => Some(parent),
    }
}
