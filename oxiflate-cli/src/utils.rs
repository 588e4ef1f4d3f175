//! Utility functions for the CLI.

use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Inputs smaller than this get no progress bar.
pub const PROGRESS_THRESHOLD: u64 = 1024 * 1024;

/// Extensions stripped by `decompress` when no output is given.
const COMPRESSED_EXTENSIONS: [&str; 3] = ["gz", "zz", "zlib"];

/// Create a byte progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable || len < PROGRESS_THRESHOLD {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Default output for compression: `input.zz` or `input.gz`.
pub fn compressed_output_path(input: &Path, gzip: bool) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(if gzip { ".gz" } else { ".zz" });
    PathBuf::from(name)
}

/// Default output for decompression: the input without its compressed
/// extension, or `input.out` if it has none.
pub fn decompressed_output_path(input: &Path) -> PathBuf {
    let known = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| COMPRESSED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

    if known {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_owned();
        name.push(".out");
        PathBuf::from(name)
    }
}

/// Decide whether `output` may be written.
///
/// Existing files are only replaced with `force` or after the user
/// confirms on an interactive terminal.
pub fn confirm_overwrite(output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if force || !output.exists() {
        return Ok(());
    }

    if !std::io::stdin().is_terminal() {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            output.display()
        )
        .into());
    }

    let overwrite = Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", output.display()))
        .default(false)
        .interact()?;

    if overwrite {
        Ok(())
    } else {
        Err("not overwritten".into())
    }
}

/// Format a byte count for humans.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
