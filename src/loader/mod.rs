//! Sample override lookup. A kit directory can replace any lane's built-in
//! recipe by shipping `<dir>/<key>.wav` for that lane's key.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolve a lane key to its override file, if the kit directory has one.
pub fn resolve(kit_dir: &Path, key: &str) -> Option<PathBuf> {
    let path = kit_dir.join(format!("{key}.wav"));
    if path.is_file() {
        debug!(path = %path.display(), "sample override found");
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_existing_wav_by_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("kick.wav"), b"riff").unwrap();
        let path = resolve(dir.path(), "kick").expect("override not found");
        assert!(path.ends_with("kick.wav"));
    }

    #[test]
    fn missing_override_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), "snare"), None);
    }

    #[test]
    fn directories_do_not_count_as_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("hihat.wav")).unwrap();
        assert_eq!(resolve(dir.path(), "hihat"), None);
    }
}
