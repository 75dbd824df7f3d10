//! Flag composition, the bounded compile worker pool, and deterministic
//! submission-order reporting (`spec.md` §4.9).

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::Sender;

use crossbeam_channel::{bounded, Receiver};
use log::{debug, info, trace};

use crate::change_analyzer::object_name_for;
use crate::config::ResolvedConfiguration;
use crate::progress::{emit, ProgressUpdate};

/// Concatenates, space-separated, in the fixed order `spec.md` §4.9
/// mandates: `-std=c++{standard}`, each warning, each extra compilation
/// flag, the optimization flag (`-O{level}`, or `/O{level}` for MSVC's
/// `cl`), each define prefixed `-D`, each include directory prefixed `-I`.
/// Absent fields are skipped; trailing whitespace is trimmed.
pub fn compose_flags(configuration: &ResolvedConfiguration) -> String {
    let mut result = String::new();

    if let Some(standard) = &configuration.standard {
        result.push_str(&format!("-std=c++{} ", standard));
    }

    for warning in &configuration.warnings {
        result.push_str(&format!("{} ", warning));
    }

    for flag in &configuration.compilation_flags {
        result.push_str(&format!("{} ", flag));
    }

    if let Some(optimization) = &configuration.optimization {
        if configuration.compiler.as_deref() == Some("cl") {
            result.push_str(&format!("/O{} ", optimization));
        } else {
            result.push_str(&format!("-O{} ", optimization));
        }
    }

    for define in &configuration.defines {
        result.push_str(&format!("-D{} ", define));
    }

    for include_dir in &configuration.include_directories {
        result.push_str(&format!("-I{} ", include_dir.display()));
    }

    result.trim_end().to_string()
}

struct CompileOutcome {
    success: bool,
    diagnostics: String,
}

/// Compiles `file` relative to `project_root`, capturing stdout+stderr in a
/// per-file temp file (so the compiler can write with plain redirection
/// rather than us pumping pipes), reading it back, then deleting it.
fn compile_file(
    file: &Path,
    project_root: &Path,
    object_dir: &Path,
    flags: &str,
    compiler: &str,
) -> std::io::Result<CompileOutcome> {
    let object_name = object_name_for(file);
    let object_path = object_dir.join(&object_name);
    let temp_path = std::env::temp_dir().join(&object_name);

    let command_line = format!(
        "{compiler} {flags} -fdiagnostics-color=always -c {source} -o {object} > {temp} 2>&1",
        compiler = compiler,
        flags = flags,
        source = project_root.join(file).display(),
        object = object_path.display(),
        temp = temp_path.display(),
    );

    trace!("compiler invocation: {command_line}");

    let status = Command::new("sh").arg("-c").arg(&command_line).status()?;

    let diagnostics = std::fs::read_to_string(&temp_path).unwrap_or_default();
    let _ = std::fs::remove_file(&temp_path);

    Ok(CompileOutcome { success: status.success(), diagnostics })
}

/// Compiles every file in `files_to_compile` (assumed already sorted) using
/// a bounded worker pool, reporting progress on `progress` in submission
/// order even though tasks complete out of order. Returns the sorted list
/// of files that failed to compile.
pub fn compile_all(
    configuration: &ResolvedConfiguration,
    project_root: &Path,
    object_dir: &Path,
    files_to_compile: &[PathBuf],
    parallel: bool,
    progress: Option<&Sender<ProgressUpdate>>,
) -> Vec<PathBuf> {
    if files_to_compile.is_empty() {
        debug!("no files to compile");
        return Vec::new();
    }

    let worker_count = if parallel { (num_cpus::get() / 2).max(1) } else { 1 };
    info!("compiling {} file(s) with {} worker(s)", files_to_compile.len(), worker_count);

    let compiler = configuration.compiler.clone().expect("compile_all requires a complete configuration");
    let flags = compose_flags(configuration);

    let (task_tx, task_rx) = bounded::<(usize, PathBuf)>(files_to_compile.len());
    let (result_tx, result_rx) = bounded::<(usize, std::io::Result<CompileOutcome>)>(files_to_compile.len());

    for (index, file) in files_to_compile.iter().enumerate() {
        task_tx.send((index, file.clone())).expect("channel sized to fit every task");
    }
    drop(task_tx);

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let task_rx: Receiver<(usize, PathBuf)> = task_rx.clone();
            let result_tx = result_tx.clone();
            let project_root = project_root;
            let object_dir = object_dir;
            let flags = flags.as_str();
            let compiler = compiler.as_str();

            scope.spawn(move || {
                for (index, file) in task_rx.iter() {
                    let outcome = compile_file(&file, project_root, object_dir, flags, compiler);
                    let _ = result_tx.send((index, outcome));
                }
            });
        }
        drop(result_tx);
    });

    let mut results: Vec<Option<std::io::Result<CompileOutcome>>> =
        (0..files_to_compile.len()).map(|_| None).collect();
    for (index, outcome) in result_rx.iter() {
        results[index] = Some(outcome);
    }

    let total = files_to_compile.len();
    let mut failures: Vec<PathBuf> = Vec::new();

    for (zero_based_index, file) in files_to_compile.iter().enumerate() {
        let index = zero_based_index + 1;

        emit(progress, ProgressUpdate::Started { index, total, file: file.clone() });

        let outcome = results[zero_based_index].take().expect("every submitted task reports a result");
        let percentage = (100 * index / total) as u32;

        let (success, diagnostics) = match outcome {
            Ok(outcome) => (outcome.success, outcome.diagnostics),
            Err(err) => (false, format!("failed to invoke compiler: {err}")),
        };

        if !success {
            failures.push(file.clone());
        }

        emit(
            progress,
            ProgressUpdate::Finished { index, total, file: file.clone(), percentage, success },
        );

        if !diagnostics.is_empty() {
            emit(progress, ProgressUpdate::Diagnostics { file: file.clone(), output: diagnostics });
        }
    }

    failures.sort();
    failures
}
