//! Linking every object file for a configuration into its output
//! (`spec.md` §4.10).

use std::path::Path;
use std::process::Command;

use log::trace;

use crate::config::ResolvedConfiguration;

/// Creates the output directory if needed, then runs
/// `{compiler} {link_flags} {object_dir}/*.o -o {output_path}/{output_name}`.
/// Returns `true` on a zero exit. Linking is a single invocation; no
/// parallelism.
pub fn link(configuration: &ResolvedConfiguration, object_dir: &Path) -> std::io::Result<bool> {
    let compiler = configuration.compiler.as_deref().expect("link requires a complete configuration");
    let output_name = configuration.output_name.as_deref().expect("link requires a complete configuration");

    let output_dir = configuration.output_path.clone().unwrap_or_default();
    if !output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&output_dir)?;
    }
    let output_path = output_dir.join(output_name);

    let link_flags = configuration.link_flags.join(" ");

    let command_line = format!(
        "{compiler} {link_flags} {object_dir}/*.o -o {output}",
        compiler = compiler,
        link_flags = link_flags,
        object_dir = object_dir.display(),
        output = output_path.display(),
    );

    trace!("linker invocation: {command_line}");

    let status = Command::new("sh").arg("-c").arg(&command_line).status()?;
    Ok(status.success())
}
