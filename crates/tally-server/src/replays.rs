//! Filesystem replay store: one `<score id>.osr` file per result.

use std::{
  io,
  path::{Path, PathBuf},
};

use tally_core::{ScoreId, services::ReplayStore};

pub struct FsReplayStore {
  dir: PathBuf,
}

impl FsReplayStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  pub fn path_for(&self, score_id: ScoreId) -> PathBuf {
    self.dir.join(format!("{score_id}.osr"))
  }
}

impl ReplayStore for FsReplayStore {
  type Error = io::Error;

  /// Written to a temporary name first so readers never see a partial file.
  async fn store(&self, score_id: ScoreId, data: &[u8]) -> io::Result<()> {
    tokio::fs::create_dir_all(&self.dir).await?;
    let path = self.path_for(score_id);
    let partial = path.with_extension("osr.part");
    tokio::fs::write(&partial, data).await?;
    tokio::fs::rename(&partial, &path).await
  }
}
