use std::path::{Component, Path, PathBuf};

/// Resolves `path` against `base` without touching the filesystem.
///
/// `.` components are dropped and `..` pops the previous component (never
/// above the filesystem root), so the result is absolute whenever `base` is.
/// Symlinks are not followed.
pub fn resolve_lexically(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(prefix) => resolved.push(prefix.as_os_str()),
            Component::RootDir => resolved.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => resolved.push(part),
        }
    }
    resolved
}

/// Returns `true` when `candidate` lies strictly below `root`.
///
/// Comparison is per path component, so `/data/root-other` is not inside
/// `/data/root`, and the root itself is not inside itself.
pub fn is_strictly_within(root: &Path, candidate: &Path) -> bool {
    candidate != root && candidate.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_parent_components() {
        let base = Path::new("/srv/app");
        assert_eq!(
            resolve_lexically(Path::new("/tmp/root/../../etc/passwd"), base),
            PathBuf::from("/etc/passwd")
        );
        assert_eq!(
            resolve_lexically(Path::new("data/./a.zip"), base),
            PathBuf::from("/srv/app/data/a.zip")
        );
        assert_eq!(
            resolve_lexically(Path::new("/../../x"), base),
            PathBuf::from("/x")
        );
    }

    #[test]
    fn containment_is_component_wise() {
        let root = Path::new("/tmp/image-converter");
        assert!(is_strictly_within(root, Path::new("/tmp/image-converter/b/desktop_images.zip")));
        assert!(!is_strictly_within(root, Path::new("/tmp/image-converter-evil/a.zip")));
        assert!(!is_strictly_within(root, Path::new("/tmp/image-converter")));
        assert!(!is_strictly_within(root, Path::new("/etc/passwd")));
    }
}
