//! Remote path model.
//!
//! Paths are plain strings as reported by the server (drive-letter style,
//! backslash separated). Comparisons are case-insensitive and tolerate
//! repeated or trailing separators; every other use keeps the original case.

use serde::{Deserialize, Serialize};

/// Path separator used by the remote filesystem.
pub const SEPARATOR: char = '\\';

/// Length of a drive root such as `C:\`.
pub const DRIVE_ROOT_LEN: usize = 3;

/// One breadcrumb step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Text shown for this step (`C:\` for the drive, the component name otherwise).
    pub label: String,
    /// Full path up to and including this step.
    pub path: String,
}

/// Normalize a path for comparison.
///
/// Forward slashes become backslashes, runs of separators collapse to one,
/// a single trailing separator is dropped and the result is lower-cased.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for c in path.chars() {
        let c = if c == '/' { SEPARATOR } else { c };
        if c == SEPARATOR {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.extend(c.to_lowercase());
    }
    if out.ends_with(SEPARATOR) {
        out.pop();
    }
    out
}

/// Whether two paths name the same entry.
pub fn same_path(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Whether `child` lies strictly below `parent`.
///
/// A path is never a child of itself.
pub fn is_child_of(child: &str, parent: &str) -> bool {
    let child = normalize(child);
    let mut prefix = normalize(parent);
    prefix.push(SEPARATOR);
    child.starts_with(&prefix)
}

/// Append `name` to `dir`, inserting a separator only when `dir` lacks one.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with(SEPARATOR) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{SEPARATOR}{name}")
    }
}

/// Whether the path starts with a drive prefix (`<letter>:\`).
pub fn is_absolute(path: &str) -> bool {
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some(':'), Some(SEPARATOR)) if letter.is_ascii_alphabetic()
    )
}

/// The drive root (`C:\`) of an absolute path.
pub fn drive_root(path: &str) -> Option<String> {
    is_absolute(path).then(|| path[..DRIVE_ROOT_LEN].to_string())
}

/// Strip every trailing separator.
pub fn trim_trailing(path: &str) -> &str {
    path.trim_end_matches(SEPARATOR)
}

/// Target of a "go up" action.
///
/// The parent is everything before the last separator. When that prefix
/// would be no longer than the drive root, the drive root is returned
/// instead, so navigation never climbs above `C:\`.
pub fn parent_or_root(path: &str) -> String {
    let trimmed = trim_trailing(path);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) if idx >= DRIVE_ROOT_LEN => trimmed[..idx].to_string(),
        _ => {
            let head: String = trimmed.chars().take(DRIVE_ROOT_LEN).collect();
            if head.len() == DRIVE_ROOT_LEN - 1 && head.ends_with(':') {
                format!("{head}{SEPARATOR}")
            } else {
                head
            }
        }
    }
}

/// Breadcrumb decomposition from the drive root onward.
///
/// Returns an empty list for paths without a drive prefix.
pub fn segments(path: &str) -> Vec<Breadcrumb> {
    if !is_absolute(path) {
        return Vec::new();
    }

    let mut crumbs = Vec::new();
    let mut accum = String::new();
    for (i, part) in trim_trailing(path)
        .split(SEPARATOR)
        .filter(|p| !p.is_empty())
        .enumerate()
    {
        if i == 0 {
            accum = format!("{part}{SEPARATOR}");
            crumbs.push(Breadcrumb {
                label: accum.clone(),
                path: accum.clone(),
            });
        } else {
            accum = join(&accum, part);
            crumbs.push(Breadcrumb {
                label: part.to_string(),
                path: accum.clone(),
            });
        }
    }
    crumbs
}

/// Last component of a path, or the path itself for a drive root.
pub fn file_name(path: &str) -> &str {
    let trimmed = trim_trailing(path);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) if idx + 1 < trimmed.len() => &trimmed[idx + 1..],
        _ => path,
    }
}
