use std::io;
use std::path::PathBuf;

/// Workspace root, i.e. the parent of the calling crate's manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or(manifest_dir)
}

/// Path of `name` inside `<workspace>/output`, creating the directory if needed.
pub fn output_path(name: &str) -> io::Result<PathBuf> {
    let dir = workspace_root().join("output");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_lives_under_workspace() {
        let path = output_path("probe.json").unwrap();
        assert!(path.starts_with(workspace_root()));
        assert!(path.parent().unwrap().is_dir());
        assert_eq!(path.file_name().unwrap(), "probe.json");
    }
}
