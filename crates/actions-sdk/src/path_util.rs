use crate::environment::Environment;

/// PATH environment variable name (platform-specific).
///
/// On Windows the conventional name is `Path`; on Unix it is `PATH`.
#[cfg(target_os = "windows")]
pub const PATH_VARIABLE: &str = "Path";
#[cfg(not(target_os = "windows"))]
pub const PATH_VARIABLE: &str = "PATH";

/// The platform-specific PATH entry separator.
#[cfg(target_os = "windows")]
pub const PATH_SEPARATOR: char = ';';
#[cfg(not(target_os = "windows"))]
pub const PATH_SEPARATOR: char = ':';

/// Path utility functions.
pub struct PathUtil;

impl PathUtil {
    /// Prepend `paths` (in the given order) to PATH in `env`.
    pub fn prepend_paths(env: &dyn Environment, paths: &[String]) {
        let current = env.get(PATH_VARIABLE).unwrap_or_default();
        let updated = Self::prepend_paths_value(paths, &current);
        if updated != current {
            env.set(PATH_VARIABLE, &updated);
        }
    }

    /// Prepend `paths` to `current_path` and return the result.
    ///
    /// Entries already present in `current_path` are moved to the front
    /// rather than duplicated. Empty entries are ignored. Does NOT modify the
    /// environment.
    pub fn prepend_paths_value(paths: &[String], current_path: &str) -> String {
        let mut entries: Vec<&str> = Vec::new();
        for path in paths.iter().filter(|p| !p.is_empty()) {
            if !entries.contains(&path.as_str()) {
                entries.push(path.as_str());
            }
        }
        if entries.is_empty() {
            return current_path.to_string();
        }

        for existing in current_path.split(PATH_SEPARATOR) {
            if !existing.is_empty() && !entries.contains(&existing) {
                entries.push(existing);
            }
        }

        entries.join(&PATH_SEPARATOR.to_string())
    }
}
