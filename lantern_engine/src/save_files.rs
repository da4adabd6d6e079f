//! Save-game discovery and serialization helpers.
//!
//! Saves are [`StateSnapshot`]s written as RON to
//! `saved_games/<world-slug>/<slot>-lantern-<version>.ron`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::LANTERN_VERSION;
use crate::snapshot::StateSnapshot;

pub const SAVE_DIR: &str = "saved_games";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlot {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFileStatus {
    Ready,
    VersionMismatch { save_version: String, current_version: String },
    Corrupted { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFileEntry {
    pub slot: SaveSlot,
    pub snapshot: Option<StateSnapshot>,
    pub status: SaveFileStatus,
}

/// Filesystem-safe form of a world slug or title.
fn sanitize_slug(raw: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else if (ch == '-' || ch == '_') && !slug.is_empty() {
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    let slug = slug.trim_matches(&['-', '_'][..]);
    if slug.is_empty() { "world".to_string() } else { slug.to_string() }
}

/// Save directory for one world under `root`.
pub fn save_dir_for_world(root: &Path, slug: &str) -> PathBuf {
    root.join(sanitize_slug(slug))
}

/// Path of the save file for `slot` written by this engine version.
pub fn save_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{}-lantern-{LANTERN_VERSION}.ron", sanitize_slug(slot)))
}

/// Write a snapshot to `slot` in `dir`, creating the directory if needed.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn write_save(dir: &Path, slot: &str, snapshot: &StateSnapshot) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating save directory {}", dir.display()))?;
    let path = save_path(dir, slot);
    let text = ron::ser::to_string_pretty(snapshot, ron::ser::PrettyConfig::default())
        .context("serializing snapshot")?;
    fs::write(&path, text).with_context(|| format!("writing save file {}", path.display()))?;
    info!("game saved to '{}'", path.display());
    Ok(path)
}

/// Load a save file from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or deserialized.
pub fn load_save_file(path: &Path) -> Result<StateSnapshot> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading save file {}", path.display()))?;
    ron::from_str::<StateSnapshot>(&raw).with_context(|| format!("parsing save file {}", path.display()))
}

/// Find the newest file for `slot`, preferring one written by this version.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn find_slot(dir: &Path, slot: &str) -> Result<Option<SaveSlot>> {
    let wanted = sanitize_slug(slot);
    let mut matches: Vec<SaveSlot> = collect_save_slots(dir)?
        .into_iter()
        .filter(|candidate| candidate.slot == wanted)
        .collect();
    matches.sort_by(|a, b| {
        (b.version == LANTERN_VERSION)
            .cmp(&(a.version == LANTERN_VERSION))
            .then(b.modified.cmp(&a.modified))
    });
    Ok(matches.into_iter().next())
}

/// Discover save slot files stored in `dir`.
///
/// # Errors
/// Returns an error if the directory contents cannot be read or enumerated.
pub fn collect_save_slots(dir: &Path) -> Result<Vec<SaveSlot>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut slots = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("enumerating {}", dir.display()))?;
        if let Some(slot) = slot_from_entry(&entry) {
            slots.push(slot);
        }
    }
    slots.sort_by(|a, b| a.slot.cmp(&b.slot).then(a.version.cmp(&b.version)));
    Ok(slots)
}

/// Describe every save in `dir`, newest first.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn build_save_entries(dir: &Path) -> Result<Vec<SaveFileEntry>> {
    let mut entries: Vec<_> = collect_save_slots(dir)?.into_iter().map(entry_for_slot).collect();
    entries.sort_by(|a, b| b.slot.modified.cmp(&a.slot.modified).then(a.slot.slot.cmp(&b.slot.slot)));
    Ok(entries)
}

fn entry_for_slot(slot: SaveSlot) -> SaveFileEntry {
    match load_save_file(&slot.path) {
        Ok(snapshot) => {
            let status = if snapshot.version == LANTERN_VERSION {
                SaveFileStatus::Ready
            } else {
                SaveFileStatus::VersionMismatch {
                    save_version: snapshot.version.clone(),
                    current_version: LANTERN_VERSION.to_string(),
                }
            };
            SaveFileEntry {
                slot,
                snapshot: Some(snapshot),
                status,
            }
        },
        Err(err) => {
            warn!("failed to read save '{}' ({}): {err:#}", slot.slot, slot.path.display());
            SaveFileEntry {
                slot,
                snapshot: None,
                status: SaveFileStatus::Corrupted {
                    message: trim_error(&format!("{err:#}")),
                },
            }
        },
    }
}

fn slot_from_entry(entry: &fs::DirEntry) -> Option<SaveSlot> {
    let path = entry.path();
    if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
        return None;
    }
    let stem = path.file_stem().and_then(|stem| stem.to_str())?;
    let (slot, version) = stem.rsplit_once("-lantern-")?;
    if slot.is_empty() {
        return None;
    }
    let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
    Some(SaveSlot {
        slot: slot.to_string(),
        version: version.to_string(),
        path,
        modified,
    })
}

/// Format a modified time relative to now ("5m ago").
pub fn format_modified(modified: SystemTime) -> String {
    match SystemTime::now().duration_since(modified) {
        Ok(delta) => format_duration(delta),
        Err(_) => "in the future".to_string(),
    }
}

fn format_duration(duration: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = MINUTE * 60;
    const DAY: u64 = HOUR * 24;

    let secs = duration.as_secs();
    if secs < 30 {
        "just now".to_string()
    } else if secs < HOUR {
        format!("{}m ago", (secs / MINUTE).max(1))
    } else if secs < DAY {
        format!("{}h ago", secs / HOUR)
    } else {
        format!("{}d ago", secs / DAY)
    }
}

/// Clamp verbose error messages to a readable length.
fn trim_error(message: &str) -> String {
    if message.chars().count() <= 120 {
        return message.to_string();
    }
    let mut trimmed: String = message.chars().take(117).collect();
    trimmed.push_str("...");
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    fn snapshot(version: &str) -> StateSnapshot {
        StateSnapshot {
            version: version.into(),
            world: "test-house".into(),
            current_scene: "kitchen".into(),
            score: 12,
            turns: 7,
            ..StateSnapshot::default()
        }
    }

    #[test]
    fn collect_save_slots_handles_missing_directory() -> Result<()> {
        let dir = tempdir()?;
        assert!(collect_save_slots(&dir.path().join("missing"))?.is_empty());
        Ok(())
    }

    #[test]
    fn collect_save_slots_skips_invalid_files() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path();
        fs::write(path.join("alpha-lantern-0.1.0.ron"), "()")?;
        fs::write(path.join("notes.txt"), "ignore me")?;
        fs::write(path.join("-lantern-0.1.0.ron"), "()")?;
        fs::create_dir_all(path.join("nested"))?;

        let slots = collect_save_slots(path)?;
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].slot, "alpha");
        assert_eq!(slots[0].version, "0.1.0");
        Ok(())
    }

    #[test]
    fn write_then_load_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let saves = save_dir_for_world(dir.path(), "Test House");
        let path = write_save(&saves, "My Slot", &snapshot(LANTERN_VERSION))?;
        assert!(path.ends_with(format!("my-slot-lantern-{LANTERN_VERSION}.ron")));

        let found = find_slot(&saves, "my slot")?.expect("slot exists");
        assert_eq!(load_save_file(&found.path)?, snapshot(LANTERN_VERSION));
        Ok(())
    }

    #[test]
    fn build_save_entries_reports_status_variants() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path();
        write_save(path, "alpha", &snapshot(LANTERN_VERSION))?;
        let old = ron::ser::to_string(&snapshot("0.0.1"))?;
        fs::write(path.join("beta-lantern-0.0.1.ron"), old)?;
        fs::write(path.join("gamma-lantern-0.0.1.ron"), "this is not valid ron")?;

        let entries = build_save_entries(path)?;
        let status_of = |slot: &str| {
            entries
                .iter()
                .find(|entry| entry.slot.slot == slot)
                .map(|entry| entry.status.clone())
        };
        assert_eq!(status_of("alpha"), Some(SaveFileStatus::Ready));
        assert!(matches!(status_of("beta"), Some(SaveFileStatus::VersionMismatch { .. })));
        assert!(matches!(status_of("gamma"), Some(SaveFileStatus::Corrupted { .. })));
        Ok(())
    }

    #[test]
    fn durations_read_naturally() {
        assert_eq!(format_duration(Duration::from_secs(5)), "just now");
        assert_eq!(format_duration(Duration::from_secs(600)), "10m ago");
        assert_eq!(format_duration(Duration::from_secs(2 * 86_400)), "2d ago");
    }
}
