use crate::errors::ToolError;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

fn denied(raw: &str) -> ToolError {
    ToolError::denied(format!(
        "File access denied: path '{}' is outside allowed directory",
        raw
    ))
    .with_hint("Use a path relative to the WordPress installation root.")
}

fn ensure_inside_root(root: &Path, candidate: &Path, raw: &str) -> Result<(), ToolError> {
    if candidate == root || candidate.starts_with(root) {
        return Ok(());
    }
    Err(denied(raw))
}

// Folds `.` and `..` segments without touching the filesystem, so escapes
// are rejected even when the path does not exist yet.
fn lexical_normalize(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(name) => out.push(name),
            Component::ParentDir => {
                if out == root || !out.pop() {
                    return None;
                }
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// Resolves an untrusted path against the sandbox root and refuses anything
/// that escapes it. A lexical pass defeats `..` traversal; the real-path
/// pass (canonicalize down to the nearest existing ancestor) defeats
/// symlinks inside the sandbox that point outside it. The target itself need
/// not exist; its resolved location is returned for the caller to create.
pub fn resolve_sandbox_path(root: &Path, raw: &str) -> Result<PathBuf, ToolError> {
    if raw.trim().is_empty() {
        return Err(ToolError::invalid_params(
            "file_path must be a non-empty string",
        ));
    }
    let root_real = std::fs::canonicalize(root)
        .map_err(|_| ToolError::internal("Sandbox root is not a valid directory"))?;

    let relative = raw.trim_start_matches(['/', '\\']);
    let normalized = lexical_normalize(&root_real, relative).ok_or_else(|| denied(raw))?;

    if normalized.symlink_metadata().is_ok() {
        let real = std::fs::canonicalize(&normalized).map_err(|_| denied(raw))?;
        ensure_inside_root(&root_real, &real, raw)?;
        return Ok(real);
    }

    // Missing target: canonicalize the nearest existing ancestor and
    // re-attach the remaining components onto its real location.
    let mut ancestor = normalized.clone();
    let mut tail: Vec<OsString> = Vec::new();
    while ancestor != root_real && ancestor.symlink_metadata().is_err() {
        match ancestor.file_name() {
            Some(name) => tail.push(name.to_os_string()),
            None => return Err(denied(raw)),
        }
        ancestor.pop();
    }
    let ancestor_real = std::fs::canonicalize(&ancestor).map_err(|_| denied(raw))?;
    ensure_inside_root(&root_real, &ancestor_real, raw)?;
    let mut resolved = ancestor_real;
    for name in tail.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Write-type file tools only touch an allow-listed set of extensions. The
/// comparison is case-insensitive on the text after the final dot;
/// extensionless paths are permitted.
pub fn ensure_allowed_extension(path: &Path, allowed: &[String]) -> Result<(), ToolError> {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return Ok(());
    };
    let normalized = extension.to_lowercase();
    if allowed.iter().any(|allow| allow == &normalized) {
        return Ok(());
    }
    Err(ToolError::denied(format!(
        "File extension '{}' is not allowed for editing",
        normalized
    ))
    .with_hint(format!("Allowed extensions: {}", allowed.join(", "))))
}
