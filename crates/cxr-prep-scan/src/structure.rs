//! Directory structure listing.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Write an indented listing of `path`, showing at most `max_files` files
/// per directory. Files come before subdirectories, both sorted by name.
pub fn print_structure<W: Write>(path: &Path, max_files: usize, out: &mut W) -> io::Result<()> {
    if !path.exists() {
        return writeln!(out, "Path '{}' does not exist.", path.display());
    }
    print_dir(path, "", max_files, out)
}

fn print_dir<W: Write>(path: &Path, indent: &str, max_files: usize, out: &mut W) -> io::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    writeln!(out, "{indent}+ {name}/")?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            dirs.push(entry_path);
        } else if entry_path.is_file() {
            files.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    files.sort();
    dirs.sort();

    for file in files.iter().take(max_files) {
        writeln!(out, "{indent}  - {file}")?;
    }
    if files.len() > max_files {
        writeln!(
            out,
            "{indent}  ... ({} more files hidden)",
            files.len() - max_files
        )?;
    }

    let child_indent = format!("{indent}  ");
    for dir in dirs {
        print_dir(&dir, &child_indent, max_files, out)?;
    }

    Ok(())
}
