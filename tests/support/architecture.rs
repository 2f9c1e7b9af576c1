use std::fs;
use std::path::{Path, PathBuf};

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn relative_path(path: &Path) -> String {
    path.strip_prefix(root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn collect_rs_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = fs::read_dir(dir).unwrap_or_else(|e| {
        panic!("failed to read dir {}: {e}", dir.display());
    });

    for entry in entries {
        let entry = entry.unwrap_or_else(|e| panic!("failed to read dir entry: {e}"));
        let path = entry.path();

        if path.is_dir() {
            collect_rs_files_recursive(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
}

pub fn collect_rs_files(relative_dir: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_rs_files_recursive(&root().join(relative_dir), &mut files);
    files.sort();
    files
}

/// Lines under `relative_dir` containing any of `patterns`, as
/// `(file, line number, line)`.
pub fn find_lines_containing(
    relative_dir: &str,
    patterns: &[&str],
) -> Vec<(String, usize, String)> {
    let mut hits = Vec::new();

    for file in collect_rs_files(relative_dir) {
        let content = fs::read_to_string(&file).unwrap_or_else(|e| {
            panic!("failed to read {}: {e}", file.display());
        });

        for (idx, line) in content.lines().enumerate() {
            if patterns.iter().any(|p| line.contains(p)) {
                hits.push((relative_path(&file), idx + 1, line.to_string()));
            }
        }
    }

    hits
}

/// Code lines under `relative_dir` containing any of `patterns` that
/// appear before the file's `#[cfg(test)]` module. Comments are skipped.
pub fn find_non_test_lines_containing(
    relative_dir: &str,
    patterns: &[&str],
) -> Vec<(String, usize, String)> {
    let mut hits = Vec::new();

    for file in collect_rs_files(relative_dir) {
        let content = fs::read_to_string(&file).unwrap_or_else(|e| {
            panic!("failed to read {}: {e}", file.display());
        });

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("#[cfg(test)]") {
                break;
            }
            if trimmed.starts_with("//") {
                continue;
            }
            if patterns.iter().any(|p| line.contains(p)) {
                hits.push((relative_path(&file), idx + 1, line.to_string()));
            }
        }
    }

    hits
}

pub fn read_relative(relative_path: &str) -> String {
    fs::read_to_string(root().join(relative_path))
        .unwrap_or_else(|e| panic!("failed to read {relative_path}: {e}"))
}

/// Lines of `mod.rs` files that are neither module declarations,
/// re-exports, attributes nor comments.
pub fn find_non_export_lines_in_mod_files(relative_dir: &str) -> Vec<(String, usize, String)> {
    let mut violations = Vec::new();

    for file in collect_rs_files(relative_dir) {
        if file.file_name().and_then(|s| s.to_str()) != Some("mod.rs") {
            continue;
        }

        let content = fs::read_to_string(&file).unwrap_or_else(|e| {
            panic!("failed to read {}: {e}", file.display());
        });

        let mut in_use_list = false;
        for (idx, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();

            if in_use_list {
                in_use_list = !line.ends_with("};");
                continue;
            }
            if line.starts_with("pub use ") && !line.ends_with(';') {
                in_use_list = true;
                continue;
            }

            if line.is_empty()
                || line.starts_with("//")
                || line.starts_with("pub mod ")
                || line.starts_with("mod ")
                || line.starts_with("pub use ")
                || line.starts_with("#[cfg")
                || line.starts_with("#!")
            {
                continue;
            }

            violations.push((relative_path(&file), idx + 1, raw_line.to_string()));
        }
    }

    violations
}
