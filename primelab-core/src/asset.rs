use crate::error::AssetError;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Identifier of one stimulus asset. For file-backed pools this is the file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Arc<str>);

impl AssetId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The word a prime file encodes, e.g. `bange_compressed.wav` -> `bange`
    pub fn word(&self) -> &str {
        word_from_filename(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text of a file name before the first underscore, extension stripped
pub fn word_from_filename(filename: &str) -> &str {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    stem.split('_').next().unwrap_or(stem)
}

/// Hidden and underscore-prefixed files are not assets
pub fn is_asset_filename(filename: &str) -> bool {
    !filename.is_empty() && !filename.starts_with('.') && !filename.starts_with('_')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Replacement {
    #[default]
    WithoutReplacement,
    WithReplacement,
}

/// Immutable, non-empty collection of uniquely named assets
#[derive(Debug, Clone)]
pub struct AssetPool {
    name: String,
    items: Vec<AssetId>,
}

impl AssetPool {
    pub fn new<I, S>(name: impl Into<String>, items: I) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<AssetId>,
    {
        let name = name.into();
        let items: Vec<AssetId> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(AssetError::EmptyPool { pool: name });
        }

        let mut seen = std::collections::HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item) {
                return Err(AssetError::DuplicateAsset {
                    pool: name,
                    asset: item.to_string(),
                });
            }
        }

        Ok(Self { name, items })
    }

    /// Scans a flat directory; identifiers are sorted so replay does not
    /// depend on directory enumeration order.
    pub fn from_dir(name: impl Into<String>, dir: &Path) -> Result<Self, AssetError> {
        let name = name.into();
        if !dir.is_dir() {
            return Err(AssetError::MissingDirectory {
                path: dir.to_path_buf(),
            });
        }

        let io_err = |source| AssetError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut items = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.path().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!(dir = %dir.display(), "skipping non-UTF-8 file name");
                continue;
            };
            if is_asset_filename(&file_name) {
                items.push(AssetId::from(file_name));
            }
        }
        items.sort();

        debug!(pool = %name, assets = items.len(), "scanned asset directory");
        Self::new(name, items)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[AssetId] {
        &self.items
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.items.contains(id)
    }

    fn candidates(&self, excluding: &[AssetId]) -> Vec<&AssetId> {
        self.items
            .iter()
            .filter(|item| !excluding.contains(item))
            .collect()
    }

    fn insufficient(&self, requested: usize, available: usize) -> AssetError {
        AssetError::InsufficientAssets {
            pool: self.name.clone(),
            requested,
            available,
        }
    }

    /// Draws `n` assets from `items \ excluding`.
    ///
    /// Without replacement the draw is a uniform random subset in random order
    /// and fails when fewer than `n` candidates remain. With replacement every
    /// draw is an independent uniform choice over the candidates.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        replacement: Replacement,
        excluding: &[AssetId],
    ) -> Result<Vec<AssetId>, AssetError> {
        let candidates = self.candidates(excluding);
        match replacement {
            Replacement::WithoutReplacement => {
                if n > candidates.len() {
                    return Err(self.insufficient(n, candidates.len()));
                }
                Ok(rand::seq::index::sample(rng, candidates.len(), n)
                    .into_iter()
                    .map(|i| candidates[i].clone())
                    .collect())
            }
            Replacement::WithReplacement => {
                if n > 0 && candidates.is_empty() {
                    return Err(self.insufficient(n, 0));
                }
                let mut drawn = Vec::with_capacity(n);
                for _ in 0..n {
                    drawn.push(candidates[rng.random_range(0..candidates.len())].clone());
                }
                Ok(drawn)
            }
        }
    }

    /// One uniform draw that is guaranteed not to be in `excluding`
    pub fn sample_excluding<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        excluding: &[AssetId],
    ) -> Result<AssetId, AssetError> {
        let candidates = self.candidates(excluding);
        candidates
            .choose(rng)
            .map(|id| (*id).clone())
            .ok_or_else(|| self.insufficient(1, 0))
    }

    /// One uniform draw over the whole pool; never fails since pools are non-empty
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> AssetId {
        self.items[rng.random_range(0..self.items.len())].clone()
    }
}

/// Named pools available to a design, keyed by their directory name relative
/// to the asset root (e.g. `audio/0.3`, `masks`).
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    pools: BTreeMap<String, AssetPool>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<I, S>(root: &Path, names: I) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut library = Self::new();
        for name in names {
            let name = name.as_ref();
            if library.pools.contains_key(name) {
                continue;
            }
            library.insert(AssetPool::from_dir(name, &root.join(name))?);
        }
        info!(root = %root.display(), pools = library.len(), "asset pools loaded");
        Ok(library)
    }

    pub fn insert(&mut self, pool: AssetPool) -> Option<AssetPool> {
        self.pools.insert(pool.name().to_owned(), pool)
    }

    pub fn get(&self, name: &str) -> Result<&AssetPool, AssetError> {
        self.pools
            .get(name)
            .ok_or_else(|| AssetError::UnknownPool(name.to_owned()))
    }

    pub fn pools(&self) -> impl Iterator<Item = &AssetPool> {
        self.pools.values()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
