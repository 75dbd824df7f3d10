//! Build progress events, reported on a channel rather than printed
//! directly; printing belongs to the CLI layer (`spec.md` non-goals:
//! "terminal colorization, progress bar rendering, verbose output
//! phrasing"). Generalized from `rls/src/actions/progress.rs`'s
//! `ProgressUpdate` enum.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

/// One event in the lifecycle of compiling `files_to_compile`. Submitted in
/// the same order `compile_all` was given its file list, regardless of
/// which compile finishes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Emitted for file `index` (1-based) of `total` right before blocking
    /// on its compile result.
    Started { index: usize, total: usize, file: PathBuf },
    /// Emitted once the file's compile has returned, carrying the
    /// completion percentage (`100 * index / total`).
    Finished { index: usize, total: usize, file: PathBuf, percentage: u32, success: bool },
    /// The file's captured stdout+stderr, if non-empty.
    Diagnostics { file: PathBuf, output: String },
}

/// Sends `update`, silently dropping it if the receiver has gone away; a
/// caller that doesn't want progress just drops its receiver.
pub fn emit(sender: Option<&Sender<ProgressUpdate>>, update: ProgressUpdate) {
    if let Some(sender) = sender {
        let _ = sender.send(update);
    }
}
