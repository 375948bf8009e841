use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Resolve the application home directory.
///
/// - `explicit` non-empty: expanded (leading `~` only) and used as-is.
/// - `explicit` empty/None: `$HOME/<default_subdir>` (Windows: `%APPDATA%`).
///
/// When `create` is set the directory is created on the way out.
pub fn resolve_home_dir(
    explicit: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match explicit {
        Some(raw) if !raw.trim().is_empty() => expand_tilde(raw.trim())?,
        _ => platform_base_dir()?.join(default_subdir),
    };

    let absolute = if resolved.is_relative() {
        std::env::current_dir()
            .context("cannot determine current directory")?
            .join(resolved)
    } else {
        resolved
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("failed to create home dir {}", absolute.display()))?;
    }

    Ok(absolute)
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Ok(platform_base_dir()?.join(rest))
    } else if raw == "~" {
        platform_base_dir()
    } else {
        Ok(PathBuf::from(raw))
    }
}

fn platform_base_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{} is not set", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_absolute_path_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("roomspot-home");
        let resolved =
            resolve_home_dir(Some(p.to_string_lossy().to_string()), ".roomspot", true).unwrap();
        assert_eq!(resolved, p);
        assert!(p.is_dir());
    }

    #[test]
    fn empty_falls_back_to_platform_default() {
        let tmp = tempfile::tempdir().unwrap();
        #[cfg(target_os = "windows")]
        std::env::set_var("APPDATA", tmp.path());
        #[cfg(not(target_os = "windows"))]
        std::env::set_var("HOME", tmp.path());

        let resolved = resolve_home_dir(None, ".roomspot", false).unwrap();
        assert!(resolved.ends_with(".roomspot"));
        assert!(resolved.is_absolute());
    }
}
