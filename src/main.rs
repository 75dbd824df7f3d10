//! easy-make's command-line entry point.
//!
//! Thin by design: this binary locates the configuration file, parses it,
//! and drives the core's `build_named`/`build_all` to completion, printing
//! progress and a final status line. Everything `spec.md` places out of
//! scope for the core (JSON-schema ergonomics, flag parsing, subcommands
//! like `clean`/`list-configs`/`init`) stays out of this binary too.

use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context, Result};
use log::error;

use easy_make::build::BuildResult;
use easy_make::progress::ProgressUpdate;

pub fn main() {
    env_logger::init();

    let exit_code = match run() {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            eprintln!("error: {err:#}");
            101
        }
    };

    std::process::exit(exit_code);
}

fn run() -> Result<bool> {
    let mut args = env::args().skip(1);

    let project_root = match args.next() {
        Some(arg) => PathBuf::from(arg),
        None => {
            println!("{}", help());
            return Ok(true);
        }
    };

    let config_file =
        args.next().map(PathBuf::from).ok_or_else(|| anyhow::anyhow!("missing <config-file> argument\n\n{}", help()))?;

    let config_name = args.next();
    if args.next().is_some() {
        bail!("too many arguments\n\n{}", help());
    }

    let contents = std::fs::read_to_string(&config_file)
        .with_context(|| format!("failed to read '{}'", config_file.display()))?;
    let configurations =
        easy_make::config::load_configurations(&contents).context("failed to parse configuration file")?;

    let (progress_tx, progress_rx) = mpsc::channel::<ProgressUpdate>();
    let reporter = thread::spawn(move || {
        for update in progress_rx {
            report(&update);
        }
    });

    let success = match config_name {
        Some(name) => {
            let result =
                easy_make::build::build_named(&name, &configurations, &project_root, true, Some(&progress_tx))
                    .with_context(|| format!("building configuration '{name}'"))?;
            report_result(&name, &result);
            result.success()
        }
        None => {
            let results = easy_make::build::build_all(&configurations, &project_root, true, Some(&progress_tx))
                .context("building configurations")?;

            let mut all_succeeded = true;
            for (name, outcome) in results {
                match outcome {
                    Ok(result) => {
                        report_result(&name, &result);
                        all_succeeded &= result.success();
                    }
                    Err(err) => {
                        error!("configuration '{name}' failed: {err}");
                        all_succeeded = false;
                    }
                }
            }
            all_succeeded
        }
    };

    drop(progress_tx);
    let _ = reporter.join();

    Ok(success)
}

fn report(update: &ProgressUpdate) {
    match update {
        ProgressUpdate::Started { index, total, file } => {
            let width = count_digits(*total);
            println!("[{index:>width$}/{total}] compiling {}", file.display());
        }
        ProgressUpdate::Finished { index, total, percentage, success, .. } => {
            let width = count_digits(*total);
            let status = if *success { "ok" } else { "failed" };
            println!("[{index:>width$}/{total}] {percentage}% {status}");
        }
        ProgressUpdate::Diagnostics { file, output } => {
            eprintln!("{}:\n{}", file.display(), output);
        }
    }
}

fn count_digits(n: usize) -> usize {
    n.to_string().len()
}

fn report_result(name: &str, result: &BuildResult) {
    if !result.compilation_failures.is_empty() {
        error!("'{name}': {} file(s) failed to compile", result.compilation_failures.len());
    } else if !result.linked {
        error!("'{name}': linking failed");
    } else {
        println!("'{name}': {} file(s) compiled, linked", result.files_compiled);
    }
}

fn help() -> &'static str {
    r#"usage: easy-make <project-root> <config-file> [<config-name>]

    <project-root>  directory source and header paths are resolved against
    <config-file>   path to a JSON array of configuration records
    <config-name>   build only this configuration; omit to build every
                     complete configuration"#
}
