//! Directory-tree printer: recursive walk with sorted entries and
//! connector-style rendering.
//!
//! Rendering rules: entries of each directory sort by name; the last entry
//! gets `└───`, the rest `├───`; descending into a last directory appends
//! `\t` to the prefix, otherwise `│\t`. Files carry a size label, `(Nb)` or
//! `(empty)`; directories print bare. With `print_files` off, only
//! directories are shown.
//!
//! Non-UTF-8 file names are rendered lossily: invalid bytes show up as the
//! replacement character, so the printed name may differ from the on-disk
//! one.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

struct TreeEntry {
    name: String,
    is_dir: bool,
    size: u64,
}

/// Render the tree rooted at `path` into `out`. The root itself is not
/// printed, only its contents.
pub fn dir_tree(out: &mut dyn Write, path: &Path, print_files: bool) -> Result<()> {
    render_level(out, path, print_files, "")
}

/// Entries of one directory, filtered to dirs when `print_files` is off,
/// sorted by name.
fn read_sorted_entries(path: &Path, print_files: bool) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let dir = fs::read_dir(path).with_context(|| format!("read directory {}", path.display()))?;
    for entry in dir {
        let entry = entry.with_context(|| format!("read entry under {}", path.display()))?;
        let meta = entry
            .metadata()
            .with_context(|| format!("read metadata for {}", entry.path().display()))?;
        if !meta.is_dir() && !print_files {
            continue;
        }
        entries.push(TreeEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: meta.is_dir(),
            size: meta.len(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn size_label(size: u64) -> String {
    if size == 0 {
        "(empty)".to_string()
    } else {
        format!("({size}b)")
    }
}

fn render_level(out: &mut dyn Write, path: &Path, print_files: bool, prefix: &str) -> Result<()> {
    let entries = read_sorted_entries(path, print_files)?;
    for (i, entry) in entries.iter().enumerate() {
        let is_last = i + 1 == entries.len();
        let connector = if is_last { "└───" } else { "├───" };
        if entry.is_dir {
            writeln!(out, "{prefix}{connector}{}", entry.name)?;
            let add = if is_last { "\t" } else { "│\t" };
            render_level(
                out,
                &path.join(&entry.name),
                print_files,
                &format!("{prefix}{add}"),
            )?;
        } else {
            writeln!(
                out,
                "{prefix}{connector}{} {}",
                entry.name,
                size_label(entry.size)
            )?;
        }
    }
    Ok(())
}
