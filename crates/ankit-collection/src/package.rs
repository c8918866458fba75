//! Reading `.apkg` packages.
//!
//! A package is a ZIP archive holding a `collection.anki2` database, a
//! `media` manifest and the media files under numeric names.

use std::fs::File;
use std::io;
use std::path::Path;

use tempfile::TempDir;
use tracing::info;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::store::CollectionStore;

/// Name of the collection database inside a package.
pub const COLLECTION_ENTRY: &str = "collection.anki2";

/// Extract every entry of the package at `apkg` into `dest`.
///
/// Returns the number of entries written.
pub fn extract_package(apkg: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<usize> {
    let dest = dest.as_ref();
    std::fs::create_dir_all(dest)?;

    let mut archive = ZipArchive::new(File::open(apkg.as_ref())?)?;
    let entries = archive.len();
    archive.extract(dest)?;

    info!(package = ?apkg.as_ref(), dest = ?dest, entries, "extracted package");
    Ok(entries)
}

/// A package's collection opened from a temporary copy.
///
/// The temporary directory lives as long as this value.
pub struct OpenedPackage {
    store: CollectionStore,
    _dir: TempDir,
}

impl OpenedPackage {
    /// The collection store.
    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    /// The collection store, for writing to the temporary copy.
    pub fn store_mut(&mut self) -> &mut CollectionStore {
        &mut self.store
    }
}

/// Copy the package's `collection.anki2` to a temporary directory and open it.
pub fn open_package(apkg: impl AsRef<Path>) -> Result<OpenedPackage> {
    let mut archive = ZipArchive::new(File::open(apkg.as_ref())?)?;
    let mut entry = archive.by_name(COLLECTION_ENTRY).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => {
            Error::Validation(format!("package has no {COLLECTION_ENTRY}"))
        }
        other => Error::Zip(other),
    })?;

    let dir = TempDir::new()?;
    let db_path = dir.path().join(COLLECTION_ENTRY);
    let mut out = File::create(&db_path)?;
    io::copy(&mut entry, &mut out)?;
    drop(out);

    let store = CollectionStore::open(&db_path)?;
    Ok(OpenedPackage { store, _dir: dir })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_package(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, bytes) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_package() {
        let dir = tempfile::tempdir().unwrap();
        let apkg = dir.path().join("deck.apkg");
        write_package(&apkg, &[("media", b"{}"), ("0", b"data")]);

        let out = dir.path().join("out");
        assert_eq!(extract_package(&apkg, &out).unwrap(), 2);
        assert_eq!(std::fs::read(out.join("0")).unwrap(), b"data");
        assert_eq!(std::fs::read_to_string(out.join("media")).unwrap(), "{}");
    }

    #[test]
    fn test_open_package_without_collection() {
        let dir = tempfile::tempdir().unwrap();
        let apkg = dir.path().join("empty.apkg");
        write_package(&apkg, &[("media", b"{}")]);
        assert!(matches!(open_package(&apkg), Err(Error::Validation(_))));
    }
}
