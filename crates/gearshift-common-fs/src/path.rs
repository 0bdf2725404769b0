//! Path manipulation utilities.

use std::path::{Component, Path, PathBuf};

/// Directory holding gearshift project configuration.
pub const CONFIG_DIR_NAME: &str = ".gearshift";

/// Normalize a path by resolving `.` and `..` without hitting the filesystem.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => components.push(Component::Prefix(p)),
            Component::RootDir => {
                components.clear();
                components.push(Component::RootDir);
            }
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::ParentDir) | None => components.push(Component::ParentDir),
                // `..` above the root stays at the root
                _ => {}
            },
            Component::Normal(c) => components.push(Component::Normal(c)),
        }
    }

    if components.is_empty() {
        PathBuf::from(".")
    } else {
        components.iter().collect()
    }
}

/// Join a relative path under `base`, refusing absolute paths and `..`.
pub fn safe_join(base: impl AsRef<Path>, path: impl AsRef<Path>) -> Option<PathBuf> {
    let path = path.as_ref();

    if path.is_absolute() {
        return None;
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    Some(base.as_ref().join(path))
}

/// Walk upwards from `start` looking for a `.gearshift` directory or `.git`.
pub fn find_project_root(start: impl AsRef<Path>) -> Option<PathBuf> {
    let markers = [CONFIG_DIR_NAME, ".git"];
    let mut current = start.as_ref().to_path_buf();

    loop {
        if markers.iter().any(|m| current.join(m).exists()) {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// The `.gearshift` config directory of a project.
pub fn config_dir(project_root: impl AsRef<Path>) -> PathBuf {
    project_root.as_ref().join(CONFIG_DIR_NAME)
}

/// Get the file stem (name without extension).
pub fn stem(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    let file_name = path.file_name()?.to_str()?;

    // dotfile with no extension
    if file_name.starts_with('.') && file_name.len() > 1 && !file_name[1..].contains('.') {
        return None;
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
