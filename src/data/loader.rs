// ============================================================
// Layer 4 — Post Loader
// ============================================================
// Loads post captions from an arranged dataset directory.
//
// Expected layout (one folder per location, one per post):
//
//   <dataset_dir>/<dataset>/
//     └── <location>/
//           └── <post>/
//                 ├── text.txt     ← caption, one line ending in <EOS>
//                 ├── images.p     (image features, not used here)
//                 └── meta.json    (not used here)
//
// Posts without a readable text.txt are logged and skipped so
// that one broken folder never aborts a whole training run.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::post::Post;
use crate::domain::traits::PostSource;

const TEXT_FILE: &str = "text.txt";

pub struct PostLoader {
    /// <dataset_dir>/<dataset>
    root: PathBuf,
}

impl PostLoader {
    pub fn new(dataset_dir: impl AsRef<Path>, dataset: &str) -> Self {
        Self { root: dataset_dir.as_ref().join(dataset) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PostSource for PostLoader {
    fn load_all(&self) -> Result<Vec<Post>> {
        if !self.root.exists() {
            tracing::warn!(
                "Dataset directory '{}' does not exist; returning empty corpus",
                self.root.display()
            );
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for location in sorted_dirs(&self.root)? {
            let location_name = file_name(&location);

            let post_dirs = match sorted_dirs(&location) {
                Ok(dirs) => dirs,
                Err(e) => {
                    tracing::warn!("Skipping location '{}': {}", location.display(), e);
                    continue;
                }
            };

            for post_dir in post_dirs {
                let path = post_dir.join(TEXT_FILE);
                match fs::read_to_string(&path) {
                    Ok(text) => {
                        posts.push(Post::new(
                            format!("{}/{}", location_name, file_name(&post_dir)),
                            text,
                        ));
                    }
                    Err(e) => {
                        tracing::warn!("Skipping '{}': {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("Loaded {} posts from '{}'", posts.len(), self.root.display());
        Ok(posts)
    }
}

/// Sub-directories of `dir`, sorted by name for a stable order.
fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
