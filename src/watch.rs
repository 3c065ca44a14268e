//! Stream watcher: re-materializes a growing markdown file on every change.
//!
//! Each event re-reads the whole file and recomputes from scratch, so a burst of
//! partial writes can never leave the tracker out of step with the text.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::error::{self, Error};
use crate::materialize::materialize;
use crate::template::Conventions;
use crate::tracker::ChangeTracker;
use crate::{commands, decoder, scanner};

/// Debounce delay between filesystem events and re-materialization.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatchFailed {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Re-read the stream file and record what changed. Returns `false` when the
/// text materializes to the same project as last time.
fn refresh(file: &Path, conventions: &Conventions, tracker: &mut ChangeTracker) -> bool {
    let text = match error::read_text(file) {
        Ok(text) => text,
        // A stream file replaced wholesale may briefly not exist.
        Err(Error::FileNotFound { .. }) => return false,
        Err(e) => {
            log::warn!("watch: {e}");
            return false;
        },
    };

    let project = materialize(&decoder::extract_all(&text, conventions), conventions);
    if project.fingerprint() == tracker.snapshot().fingerprint() {
        log::debug!("watch: {} unchanged", file.display());
        return false;
    }

    let generating = scanner::primary_block(&text).is_some_and(|p| return p.generating);
    let batch = tracker.observe(project);
    if !batch.is_empty() {
        let state = if generating { " (generating)" } else { "" };
        eprintln!("watch: {} changes{state}", batch.len());
        commands::print_changes(batch);
    }
    return true;
}

/// Entry point for the watch command.
///
/// Materializes the file once, then re-materializes on every change and prints the
/// newly recorded changes. Runs until the watcher channel closes.
///
/// # Errors
///
/// Returns errors from config loading or watcher setup.
pub fn run(file: &Path, template: Option<&str>) -> Result<ExitCode, Error> {
    let conventions = commands::load_conventions(template)?;
    let mut tracker = ChangeTracker::default();

    eprintln!("watch: initial read of {}", file.display());
    refresh(file, &conventions, &mut tracker);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    // Watch the directory: editors and stream writers often replace the file.
    let dir = file
        .parent()
        .filter(|p| return !p.as_os_str().is_empty())
        .unwrap_or_else(|| return Path::new("."));
    watcher.watch(dir, RecursiveMode::NonRecursive).map_err(|e| {
        return Error::WatchFailed {
            reason: format!("{}: {e}", dir.display()),
        };
    })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", file.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        refresh(file, &conventions, &mut tracker);
    }

    let total = tracker.log().len();
    eprintln!("watch: stopped after {total} recorded changes");
    return Ok(ExitCode::SUCCESS);
}
