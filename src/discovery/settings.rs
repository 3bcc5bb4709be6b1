use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Settings file names, checked in order
pub const SETTINGS_FILES: [&str; 2] = ["settings.gradle", "settings.gradle.kts"];

/// Locate the settings file of a project
pub fn find_settings_file(project_root: &Path) -> Option<PathBuf> {
    SETTINGS_FILES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
}

/// Module names from the `include` lines of a settings script, in order.
///
/// Both `include(":a", ":b")` and `include ':a', ':b'` are understood;
/// the leading colon is dropped and nested paths keep their inner colons.
pub fn parse_settings(contents: &str) -> Vec<String> {
    let mut modules: Vec<String> = Vec::new();

    for line in contents.lines() {
        let Some(rest) = line.trim().strip_prefix("include") else {
            continue;
        };
        // includeBuild and friends are not module includes
        if !rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
            continue;
        }

        let rest = rest.split("//").next().unwrap_or_default();
        let names = rest
            .replace(['(', ')', '"', '\''], "")
            .split(',')
            .map(|name| name.trim().trim_start_matches(':').to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>();

        for name in names {
            if !modules.contains(&name) {
                modules.push(name);
            }
        }
    }

    modules
}

/// Module names declared by the project's settings file.
///
/// `None` when there is no settings file or it cannot be read.
pub fn read_module_names(project_root: &Path) -> Option<Vec<String>> {
    let Some(path) = find_settings_file(project_root) else {
        warn!(
            "No settings.gradle or settings.gradle.kts file found in {}",
            project_root.display()
        );
        return None;
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let modules = parse_settings(&contents);
            debug!("{} declares {} modules", path.display(), modules.len());
            Some(modules)
        }
        Err(e) => {
            warn!("Failed to read settings file {}: {}", path.display(), e);
            None
        }
    }
}
