//! Write boundary for generated artifacts.
//!
//! Every output goes through [`OutputPolicy::check`]: the path must be
//! absolute, must not land under a system directory, and must carry an
//! allowed extension. Accepted writes are atomic.

use crate::{nonblocking, write_string_atomic, FsError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// System directories no artifact may be written under.
pub const DEFAULT_DENIED_PREFIXES: &[&str] = &[
    "/etc", "/bin", "/sbin", "/usr", "/boot", "/dev", "/proc", "/sys", "/lib", "/var/run",
];

/// Output path policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPolicy {
    allowed_extensions: Vec<String>,
    denied_prefixes: Vec<PathBuf>,
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self::new(
            vec!["md".to_string()],
            DEFAULT_DENIED_PREFIXES.iter().map(PathBuf::from).collect(),
        )
    }
}

impl OutputPolicy {
    /// Create a policy. Extensions are matched case-insensitively, without the dot.
    pub fn new(allowed_extensions: Vec<String>, denied_prefixes: Vec<PathBuf>) -> Self {
        Self {
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            denied_prefixes,
        }
    }

    /// Allowed extensions.
    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Validate a target path, returning its normalized form.
    pub fn check(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(FsError::not_allowed(path, "output path must be absolute"));
        }

        let normalized = crate::path::normalize(path);
        if let Some(prefix) = self
            .denied_prefixes
            .iter()
            .find(|p| normalized.starts_with(p))
        {
            return Err(FsError::not_allowed(
                path,
                format!("writes under {} are not permitted", prefix.display()),
            ));
        }

        match crate::extension(&normalized) {
            Some(ext) if self.allowed_extensions.iter().any(|a| *a == ext) => Ok(normalized),
            Some(ext) => Err(FsError::not_allowed(
                path,
                format!("extension .{} is not allowed", ext),
            )),
            None => Err(FsError::not_allowed(path, "output path has no extension")),
        }
    }

    /// Check then atomically write.
    pub fn write(&self, path: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
        let target = self.check(path)?;
        write_string_atomic(&target, contents)?;
        debug!(path = %target.display(), bytes = contents.len(), "artifact written");
        Ok(target)
    }

    /// Async variant of [`OutputPolicy::write`].
    pub async fn write_async(&self, path: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
        let target = self.check(path)?;
        nonblocking::write_string_atomic(&target, contents).await?;
        debug!(path = %target.display(), bytes = contents.len(), "artifact written");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/etc/passwd.md" ; "etc")]
    #[test_case("/usr/share/doc/x.md" ; "usr")]
    #[test_case("/var/run/x.md" ; "var run")]
    #[test_case("/tmp/../etc/x.md" ; "traversal into etc")]
    fn rejects_system_dirs(path: &str) {
        let err = OutputPolicy::default().check(path).unwrap_err();
        assert!(matches!(err, FsError::PathNotAllowed { .. }));
    }

    #[test_case("relative/out.md" ; "relative")]
    #[test_case("/tmp/out.sh" ; "wrong extension")]
    #[test_case("/tmp/out" ; "no extension")]
    fn rejects_bad_targets(path: &str) {
        assert!(OutputPolicy::default().check(path).is_err());
    }

    #[test]
    fn accepts_markdown_outside_system_dirs() {
        let policy = OutputPolicy::default();
        assert_eq!(
            policy.check("/home/dev/specs/constitution.MD").unwrap(),
            PathBuf::from("/home/dev/specs/constitution.MD")
        );
        // component-wise prefix match
        assert!(policy.check("/etcetera/out.md").is_ok());
        assert!(policy.check("/var/lib/out.md").is_ok());
    }

    #[test]
    fn custom_extensions() {
        let policy = OutputPolicy::new(vec![".MD".into(), "txt".into()], vec![]);
        assert_eq!(policy.allowed_extensions(), &["md".to_string(), "txt".to_string()]);
        assert!(policy.check("/etc/notes.txt").is_ok());
    }

    #[test]
    fn write_goes_through_check() {
        let dir = tempfile::tempdir().unwrap();
        let policy = OutputPolicy::default();
        let target = dir.path().join("features/001-login.md");
        let written = policy.write(&target, "# Login").unwrap();
        assert_eq!(std::fs::read_to_string(written).unwrap(), "# Login");

        assert!(policy.write(dir.path().join("x.exe"), "nope").is_err());
        assert!(!dir.path().join("x.exe").exists());
    }
}
