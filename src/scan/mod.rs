//! Concurrent directory scan.
//!
//! One producer walks the tree and feeds a bounded queue, N workers run the
//! rule engine on one file at a time, and the calling thread folds their
//! results into a [`ScanResult`].

pub mod result;
pub mod walker;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::error::{Result, ScanError};
use crate::ir::Language;
use crate::rules::{RuleEngine, Severity};

pub use result::{FileResult, ScanResult, ScanSummary, SeverityCounts};

/// Directory names skipped unless overridden.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", "vendor", ".git", "dist", "build"];

/// Cooperative cancellation flag shared between the caller and a running scan.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scan inputs; `None` fields take their defaults.
#[derive(Debug, Clone, Default)]
pub struct ScanSettings {
    /// Empty means every language.
    pub languages: Option<Vec<Language>>,
    pub exclude_dirs: Option<Vec<String>>,
    /// Zero means automatic.
    pub concurrency: Option<usize>,
    pub min_severity: Option<Severity>,
}

/// Settings with every default applied.
#[derive(Debug, Clone)]
struct Resolved {
    languages: HashSet<Language>,
    exclude: HashSet<String>,
    workers: usize,
    min_severity: Severity,
}

impl ScanSettings {
    fn resolve(&self) -> Resolved {
        let languages: HashSet<Language> = match &self.languages {
            Some(list) if !list.is_empty() => list.iter().copied().collect(),
            _ => Language::ALL.into_iter().collect(),
        };
        let exclude = match &self.exclude_dirs {
            Some(dirs) => dirs.iter().cloned().collect(),
            None => DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        };
        let workers = match self.concurrency {
            Some(n) if n > 0 => n,
            _ => num_cpus::get().max(2),
        };

        Resolved {
            languages,
            exclude,
            workers,
            min_severity: self.min_severity.unwrap_or(Severity::Info),
        }
    }
}

/// Check that `root` names an existing directory.
pub fn validate_root(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() {
        return Err(ScanError::EmptyPath);
    }
    let meta = std::fs::metadata(root).map_err(|source| ScanError::TargetNotFound {
        path: root.display().to_string(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.display().to_string()));
    }
    Ok(())
}

/// Drives the scan pipeline with a shared, read-only rule engine.
pub struct Scanner {
    engine: RuleEngine,
}

impl Scanner {
    pub fn new(engine: RuleEngine) -> Self {
        Self { engine }
    }

    /// Scan every eligible file under `root`.
    ///
    /// Fails only on an invalid root or when a thread cannot be spawned;
    /// per-file problems end up as error results and are skipped.
    pub fn scan(
        &self,
        root: &Path,
        settings: &ScanSettings,
        cancel: Option<&CancelToken>,
    ) -> Result<ScanResult> {
        validate_root(root)?;

        let resolved = settings.resolve();
        let cancel = cancel.cloned().unwrap_or_default();
        let mut aggregate = result::Aggregate::new(resolved.min_severity);
        // Set only when the walk or a worker abandons pending work.
        let stopped_early = AtomicBool::new(false);

        tracing::debug!(
            root = %root.display(),
            workers = resolved.workers,
            languages = resolved.languages.len(),
            "starting scan"
        );

        thread::scope(|s| -> Result<()> {
            let capacity = resolved.workers * 2;
            let (path_tx, path_rx) = crossbeam_channel::bounded::<(PathBuf, Language)>(capacity);
            let (result_tx, result_rx) = crossbeam_channel::bounded::<FileResult>(capacity);

            let (languages, exclude, walk_cancel) = (&resolved.languages, &resolved.exclude, &cancel);
            let stopped = &stopped_early;
            thread::Builder::new()
                .name("securescan-walk".into())
                .spawn_scoped(s, move || {
                    if walker::produce(root, languages, exclude, walk_cancel, path_tx) {
                        stopped.store(true, Ordering::SeqCst);
                    }
                })?;

            for id in 0..resolved.workers {
                let rx = path_rx.clone();
                let tx = result_tx.clone();
                let engine = &self.engine;
                let cancel = &cancel;
                let stopped = &stopped_early;
                thread::Builder::new()
                    .name(format!("securescan-worker-{id}"))
                    .spawn_scoped(s, move || {
                        for (path, language) in rx.iter() {
                            if cancel.is_cancelled() {
                                stopped.store(true, Ordering::SeqCst);
                                break;
                            }
                            if tx.send(scan_file(engine, &path, language)).is_err() {
                                break;
                            }
                        }
                    })?;
            }

            // Only workers hold these now; the loop below ends when the
            // last worker exits.
            drop(path_rx);
            drop(result_tx);

            for file in result_rx.iter() {
                aggregate.add(file);
            }
            Ok(())
        })?;

        let truncated = stopped_early.load(Ordering::SeqCst);
        let result = aggregate.finish(project_name(root), truncated);

        tracing::info!(
            files = result.summary.total_files,
            findings = result.summary.total_vulnerabilities,
            critical = result.summary.by_severity.critical,
            high = result.summary.by_severity.high,
            truncated,
            "scan complete"
        );

        Ok(result)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(RuleEngine::new())
    }
}

/// Read one file and run every detector on it.
pub fn scan_file(engine: &RuleEngine, path: &Path, language: Language) -> FileResult {
    match std::fs::read(path) {
        Ok(content) => {
            tracing::debug!(file = %path.display(), language = %language, "scanning");
            FileResult {
                path: path.to_path_buf(),
                language,
                lines: count_lines(&content),
                findings: engine.run(path, language, &content),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "failed to read file");
            FileResult {
                path: path.to_path_buf(),
                language,
                lines: 0,
                findings: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

pub fn count_lines(content: &[u8]) -> usize {
    content.iter().filter(|&&b| b == b'\n').count() + 1
}

fn project_name(root: &Path) -> String {
    let named = root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()));
    named.unwrap_or_else(|| root.display().to_string())
}
