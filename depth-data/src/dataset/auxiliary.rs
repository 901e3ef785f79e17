use super::index::list_files;
use crate::{common::*, error::DataError};

/// The pool of auxiliary natural images.
///
/// It is independent of the sample index and sampled uniformly per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryPool {
    paths: Vec<PathBuf>,
}

impl AuxiliaryPool {
    /// Collect the files in `<dir>/<subdir>/` for every subdirectory of `dir`.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DataError::config(format!(
                "auxiliary image directory '{}' does not exist",
                dir.display()
            ))
            .into());
        }

        let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));
        let subdirs: Vec<PathBuf> = glob::glob(&pattern)?
            .filter_ok(|path| path.is_dir())
            .try_collect()?;

        let paths: Vec<PathBuf> = subdirs
            .iter()
            .map(|subdir| list_files(subdir))
            .flatten_ok()
            .try_collect()?;

        if paths.is_empty() {
            return Err(DataError::config(format!(
                "no auxiliary images found in '{}'",
                dir.display()
            ))
            .into());
        }

        Ok(Self { paths })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Pick an image path uniformly at random.
    pub fn sample<R>(&self, rng: &mut R) -> &Path
    where
        R: Rng + ?Sized,
    {
        &self.paths[rng.gen_range(0..self.paths.len())]
    }
}
