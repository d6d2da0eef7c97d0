//! Absolute path handling and directory resolution.

use alloc::string::ToString;
use alloc::vec::Vec;

use fatdisk_layout::{EntryKind, Superblock};

use crate::dir::{self, Region};
use crate::error::FsError;
use crate::fat::FatTable;
use crate::store::ByteStore;

/// `""` and `"/"` both name the root directory.
pub fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}

/// Non-empty components of an absolute path. Repeated slashes are skipped.
pub fn components(path: &str) -> Result<Vec<&str>, FsError> {
    let rest = path.strip_prefix('/').ok_or_else(|| FsError::InvalidPath(path.to_string()))?;
    Ok(rest.split('/').filter(|c| !c.is_empty()).collect())
}

/// Split at the last `/` into (directory, final name).
///
/// A path with no slash, or only a leading one, lives in `/`.
pub fn split_file_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) | None => ("/", path.strip_prefix('/').unwrap_or(path)),
        Some(i)        => (&path[..i], &path[i + 1..]),
    }
}

/// `Some(name)` when `path` names exactly one directory under the root.
pub fn single_component(path: &str) -> Result<Option<&str>, FsError> {
    let rest = path.strip_prefix('/').ok_or_else(|| FsError::InvalidPath(path.to_string()))?;
    if rest.is_empty() || rest.contains('/') {
        return Ok(None);
    }
    Ok(Some(rest))
}

/// Walk `path` one directory at a time, starting at the root.
pub fn resolve<S: ByteStore>(
    store: &mut S,
    sb: &Superblock,
    fat: &FatTable,
    path: &str,
) -> Result<Region, FsError> {
    if is_root(path) {
        return Ok(Region::Root);
    }
    let parts = components(path)?;
    if parts.is_empty() {
        // "//" and friends
        return Err(FsError::DirNotFound(path.to_string()));
    }

    let mut region = Region::Root;
    for name in parts {
        match dir::find(store, sb, fat, region, name, EntryKind::Directory)? {
            Some(entry) => region = Region::Subdir(entry.start_block),
            None => {
                log::debug!("path: component '{name}' of '{path}' not found");
                return Err(FsError::DirNotFound(path.to_string()));
            }
        }
    }
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageBuilder;

    #[test]
    fn components_skip_empty_parts() {
        assert_eq!(components("/a//b/").unwrap(), ["a", "b"]);
        assert!(components("/").unwrap().is_empty());
        assert_eq!(components("a/b"), Err(FsError::InvalidPath("a/b".into())));
    }

    #[test]
    fn split_paths() {
        assert_eq!(split_file_path("/foo.txt"), ("/", "foo.txt"));
        assert_eq!(split_file_path("foo.txt"), ("/", "foo.txt"));
        assert_eq!(split_file_path("/sub/dir/foo.txt"), ("/sub/dir", "foo.txt"));
        assert_eq!(split_file_path("/sub/"), ("/sub", ""));
    }

    #[test]
    fn single_component_paths() {
        assert_eq!(single_component("/sub").unwrap(), Some("sub"));
        assert_eq!(single_component("/a/b").unwrap(), None);
        assert_eq!(single_component("/").unwrap(), None);
        assert!(single_component("sub").is_err());
    }

    #[test]
    fn resolves_nested_directories() {
        let b = ImageBuilder::new(512, 128, 1).dir("/a").dir("/a/b");
        let inner = b.dir_start("/a/b");
        let sb = *b.superblock();
        let mut store = b.build();
        let fat = FatTable::load(&mut store, &sb).unwrap();

        assert_eq!(resolve(&mut store, &sb, &fat, "/").unwrap(), Region::Root);
        assert_eq!(resolve(&mut store, &sb, &fat, "").unwrap(), Region::Root);
        assert_eq!(resolve(&mut store, &sb, &fat, "/a/b").unwrap(), Region::Subdir(inner));
        assert_eq!(resolve(&mut store, &sb, &fat, "/a//b/").unwrap(), Region::Subdir(inner));
    }

    #[test]
    fn resolve_failures() {
        let b = ImageBuilder::new(512, 128, 1).dir("/a").file("/plain", b"x");
        let sb = *b.superblock();
        let mut store = b.build();
        let fat = FatTable::load(&mut store, &sb).unwrap();

        assert_eq!(resolve(&mut store, &sb, &fat, "/nope"), Err(FsError::DirNotFound("/nope".into())));
        // files are not traversable
        assert_eq!(resolve(&mut store, &sb, &fat, "/plain"), Err(FsError::DirNotFound("/plain".into())));
        assert_eq!(resolve(&mut store, &sb, &fat, "//"), Err(FsError::DirNotFound("//".into())));
        assert_eq!(resolve(&mut store, &sb, &fat, "a"), Err(FsError::InvalidPath("a".into())));
    }
}
