//! Locating the runtime data directory (`world.ron`, `lantern.toml`).

use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Cached path to the directory containing the engine's runtime data files.
static DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(detect_data_root);

/// Construct a data path relative to the resolved data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

/// Resolve the most likely location of the runtime data directory.
///
/// `LANTERN_DATA` wins when set; then the workspace layout, a flattened
/// `data/`, and the same two next to (or one above) the executable.
fn detect_data_root() -> PathBuf {
    if let Some(dir) = env::var_os("LANTERN_DATA") {
        return PathBuf::from(dir);
    }

    let mut candidates = vec![PathBuf::from("lantern_engine/data"), PathBuf::from("data")];
    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.join("lantern_engine/data"));
        candidates.push(dir.join("data"));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("lantern_engine/data"));
            candidates.push(parent.join("data"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("lantern_engine/data"))
}
