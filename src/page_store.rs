use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::page::page_file_name;

pub fn page_path(out_dir: &Path, page: u32) -> PathBuf {
    out_dir.join(page_file_name(page))
}

pub async fn page_exists(path: &Path) -> anyhow::Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("check page file: {}", path.display()))
}

/// Writes through a `.part` sibling and renames, so `path` only ever holds a
/// complete body.
pub async fn write_page(path: &Path, body: &[u8]) -> anyhow::Result<()> {
    let parent_dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("page path must have parent: {}", path.display()))?;
    tokio::fs::create_dir_all(parent_dir)
        .await
        .with_context(|| format!("create page parent dir: {}", parent_dir.display()))?;

    let mut part_path = path.as_os_str().to_owned();
    part_path.push(".part");
    let part_path = PathBuf::from(part_path);

    tokio::fs::write(&part_path, body)
        .await
        .with_context(|| format!("write page: {}", part_path.display()))?;
    tokio::fs::rename(&part_path, path)
        .await
        .with_context(|| format!("move page into place: {}", path.display()))?;

    Ok(())
}
