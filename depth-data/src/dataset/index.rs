use super::DepthAdapter;
use crate::{common::*, error::DataError};

/// The aligned lists of image and depth files of all datasets.
///
/// Entry `k` of [images](SampleIndex::images) and [depths](SampleIndex::depths)
/// describe the same sample. The second element of each entry is the dataset id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleIndex {
    images: Vec<(PathBuf, usize)>,
    depths: Vec<(PathBuf, usize)>,
}

impl SampleIndex {
    /// Scan the `images/` directory of every dataset root.
    ///
    /// The dataset id of a root is its position in `datasets`. Files are
    /// visited in lexicographic order, so repeated builds on an unchanged
    /// tree give identical indexes.
    pub fn build<P, A>(datasets: &[(P, A)]) -> Result<Self>
    where
        P: AsRef<Path>,
        A: AsRef<dyn DepthAdapter>,
    {
        let mut images = vec![];
        let mut depths = vec![];

        for (dataset_id, (root, adapter)) in datasets.iter().enumerate() {
            let root = root.as_ref();
            let adapter = adapter.as_ref();
            let image_files = list_files(&root.join("images"))?;

            if image_files.is_empty() {
                return Err(DataError::config(format!(
                    "no images found in dataset '{}'",
                    root.display()
                ))
                .into());
            }

            for image_file in image_files {
                let file_name = image_file
                    .file_name()
                    .map(Path::new)
                    .ok_or_else(|| format_err!("invalid file path '{}'", image_file.display()))?;
                let depth_file = adapter.depth_path(root, file_name);
                images.push((image_file, dataset_id));
                depths.push((depth_file, dataset_id));
            }
        }

        Ok(Self { images, depths })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[(PathBuf, usize)] {
        &self.images
    }

    pub fn depths(&self) -> &[(PathBuf, usize)] {
        &self.depths
    }

    /// Get the image path, depth path and dataset id of a sample.
    pub fn get(&self, index: usize) -> Option<(&Path, &Path, usize)> {
        let (image_file, dataset_id) = self.images.get(index)?;
        let (depth_file, _) = self.depths.get(index)?;
        Some((image_file, depth_file, *dataset_id))
    }

    /// Count the samples of each dataset.
    pub fn dataset_sizes(&self, num_datasets: usize) -> Vec<usize> {
        let mut sizes = vec![0; num_datasets];
        self.images.iter().for_each(|&(_, dataset_id)| {
            sizes[dataset_id] += 1;
        });
        sizes
    }
}

/// List the regular files directly under `dir` in lexicographic order.
pub(crate) fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DataError::config(format!("'{}' is not a directory", dir.display())).into());
    }

    let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));
    let files: Vec<PathBuf> = glob::glob(&pattern)?
        .map(|entry| entry.with_context(|| format!("failed to list '{}'", dir.display())))
        .filter_ok(|path| path.is_file())
        .try_collect()?;
    Ok(files)
}
