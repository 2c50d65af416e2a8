//! Loading recorded detector feeds from disk.

use std::path::Path;

use wiscreen_model::feed::{parse_frames, DetectorFrame};

use crate::error::{WiscreenError, WiscreenResult};

/// Read and parse a JSONL detector feed.
pub fn load_feed(path: impl AsRef<Path>) -> WiscreenResult<Vec<DetectorFrame>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(WiscreenError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let frames = parse_frames(&content)?;
    tracing::debug!(path = %path.display(), frames = frames.len(), "Loaded detector feed");
    Ok(frames)
}
