use std::path::{Path, PathBuf};

use anyhow::Context;

/// Create a directory and any missing parents, returning its path
pub fn ensure_dir(path: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
    let path = path.as_ref();

    std::fs::create_dir_all(path)
        .with_context(|| format!("Unable to create directory {}", path.display()))?;

    Ok(path.to_path_buf())
}

/// A fresh directory under the system temp dir for filesystem tests
#[cfg(test)]
pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "contextual-bilstm-{}-{:016x}",
        name,
        rand::random::<u64>()
    ));

    std::fs::create_dir_all(&dir).unwrap();

    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_creates_parents() {
        let root = scratch_dir("ensure-dir");
        let nested = root.join("runs").join("checkpoints");

        let created = ensure_dir(&nested).unwrap();

        assert_eq!(created, nested);
        assert!(nested.is_dir());

        // Existing directories are fine
        ensure_dir(&nested).unwrap();
    }
}
