use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use walkdir::{DirEntry, WalkDir};

use super::CancelToken;
use crate::ir::Language;

/// Files under `root` whose extension maps to one of `languages`, skipping
/// every directory named in `exclude` together with its subtree. The root
/// itself is never pruned.
pub fn discover<'a>(
    root: &'a Path,
    languages: &'a HashSet<Language>,
    exclude: &'a HashSet<String>,
) -> impl Iterator<Item = (PathBuf, Language)> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |entry| !is_excluded(entry, exclude))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(move |entry| {
            let language = Language::from_path(entry.path())?;
            languages
                .contains(&language)
                .then(|| (entry.into_path(), language))
        })
}

fn is_excluded(entry: &DirEntry, exclude: &HashSet<String>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && exclude.contains(&*entry.file_name().to_string_lossy())
}

/// Producer loop: feed discovered files to the workers until the walk ends,
/// the scan is cancelled, or every worker has gone away.
///
/// Returns `true` when cancellation left files unqueued.
pub(super) fn produce(
    root: &Path,
    languages: &HashSet<Language>,
    exclude: &HashSet<String>,
    cancel: &CancelToken,
    tx: Sender<(PathBuf, Language)>,
) -> bool {
    let mut queued = 0usize;
    for item in discover(root, languages, exclude) {
        if cancel.is_cancelled() {
            tracing::debug!(queued, "walk cancelled");
            return true;
        }
        if tx.send(item).is_err() {
            return false;
        }
        queued += 1;
    }
    tracing::debug!(queued, "walk finished");
    false
}
