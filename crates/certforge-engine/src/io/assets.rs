use anyhow::{Context, bail};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::models::layer::Layer;

/// Storage holding the images behind photo layers
pub trait AssetStore {
    /// Remove the asset stored at `path`. Removing an asset that is already
    /// gone succeeds.
    fn delete(&self, path: &str) -> anyhow::Result<()>;
}

/// Assets kept as files below a root directory
#[derive(Clone, Debug)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored path; only plain relative paths are
    /// accepted
    pub fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty()
            || relative
                .components()
                .any(|component| !matches!(component, Component::Normal(_)))
        {
            bail!("Asset path {path:?} is not a plain relative path");
        }
        Ok(self.root.join(relative))
    }
}

impl AssetStore for FsAssetStore {
    fn delete(&self, path: &str) -> anyhow::Result<()> {
        let location = self.resolve(path)?;
        match fs::remove_file(&location) {
            Ok(()) => {
                log::debug!("Removed asset {}", location.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Asset {} already removed", location.display());
                Ok(())
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove asset {}", location.display())),
        }
    }
}

/// Release the stored image behind a deleted layer. Returns whether the
/// layer had an asset to release.
pub fn release_layer_asset(store: &dyn AssetStore, layer: &Layer) -> anyhow::Result<bool> {
    match layer {
        Layer::Photo(photo) if !photo.storage_path.is_empty() => {
            store.delete(&photo.storage_path)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::defaults::LayerDefaults;
    use crate::layout::registry::{CanvasSide, LayerRegistry};
    use crate::layout::update::PhotoSource;
    use crate::tests::{create_test_dir, create_test_file};
    use rstest::rstest;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingStore {
        deleted: RefCell<Vec<String>>,
    }

    impl AssetStore for RecordingStore {
        fn delete(&self, path: &str) -> anyhow::Result<()> {
            self.deleted.borrow_mut().push(path.to_string());
            Ok(())
        }
    }

    fn registry_with_photo() -> (LayerRegistry, Layer) {
        let mut registry = LayerRegistry::new(CanvasSide::Certificate, LayerDefaults::default());
        let layer = registry
            .add_photo_layer(PhotoSource {
                src: "https://cdn.example.org/seal.png".to_string(),
                storage_path: "seal.png".to_string(),
                original_width: 100,
                original_height: 100,
            })
            .clone();
        (registry, layer)
    }

    #[test]
    fn test_release_deleted_photo() {
        let (mut registry, layer) = registry_with_photo();
        let store = RecordingStore::default();

        let removed = registry.delete_layer(layer.id()).unwrap();
        let released = release_layer_asset(&store, &removed).unwrap();

        assert!(released);
        assert_eq!(*store.deleted.borrow(), vec!["seal.png".to_string()]);
    }

    #[test]
    fn test_text_layer_has_no_asset() {
        let mut registry = LayerRegistry::new(CanvasSide::Certificate, LayerDefaults::default());
        let layer = registry.add_text_layer("Name").clone();
        let store = RecordingStore::default();

        assert!(!release_layer_asset(&store, &layer).unwrap());
        assert!(store.deleted.borrow().is_empty());
    }

    #[test]
    fn test_fs_store_removes_file() {
        let dir = create_test_dir();
        let file = create_test_file(&dir, "seal.png", "not really a png");
        let store = FsAssetStore::new(dir.path());

        store.delete("seal.png").unwrap();

        assert!(!file.exists());
        // a second delete is not an error
        store.delete("seal.png").unwrap();
    }

    #[rstest]
    #[case("")]
    #[case("../outside.png")]
    #[case("/etc/passwd")]
    #[case("assets/../../x.png")]
    fn test_fs_store_rejects_escaping_paths(#[case] path: &str) {
        let dir = create_test_dir();
        let store = FsAssetStore::new(dir.path());

        assert!(store.delete(path).is_err());
    }
}
