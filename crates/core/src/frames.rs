//! Ordered frame collection (the drag-reorder strip of reference images).
//!
//! The first frame in the collection is the reference frame sent to the
//! remote service. Every frame owns a preview blob that is revoked when
//! the frame is removed or the collection is dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::blob::{BlobHandle, BlobSource, BlobStore};
use crate::types::FrameId;

// ---------------------------------------------------------------------------
// FileHandle
// ---------------------------------------------------------------------------

/// A user-selected image file, not yet read.
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: String,
    mime_type: Option<String>,
    source: BlobSource,
}

impl FileHandle {
    /// Wrap a file on disk. The mime type is inferred from the extension
    /// when it names a known image format.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            name,
            mime_type: mime_from_extension(&path),
            source: BlobSource::File(path),
        }
    }

    /// Wrap bytes already held in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: Option<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type,
            source: BlobSource::Memory(bytes.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared content type, if known.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn source(&self) -> &BlobSource {
        &self.source
    }

    pub async fn read(&self) -> std::io::Result<Arc<[u8]>> {
        self.source.read().await
    }
}

fn mime_from_extension(path: &Path) -> Option<String> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One reference image in the collection.
///
/// Frames are immutable once created. Clones share the preview handle.
#[derive(Debug, Clone)]
pub struct Frame {
    id: FrameId,
    preview: BlobHandle,
    file: FileHandle,
}

impl Frame {
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Handle to the display preview of this frame.
    pub fn preview(&self) -> &BlobHandle {
        &self.preview
    }

    /// The raw file sent to the remote service.
    pub fn file(&self) -> &FileHandle {
        &self.file
    }
}

// ---------------------------------------------------------------------------
// FrameCollection
// ---------------------------------------------------------------------------

/// Ordered list of frames with stable identity.
#[derive(Debug)]
pub struct FrameCollection {
    frames: Vec<Frame>,
    blobs: BlobStore,
}

impl FrameCollection {
    /// Create an empty collection whose previews live in `blobs`.
    pub fn new(blobs: BlobStore) -> Self {
        Self {
            frames: Vec::new(),
            blobs,
        }
    }

    /// Append one frame per file, in input order.
    ///
    /// Returns the ids minted for the new frames, in the same order.
    pub fn add<I>(&mut self, files: I) -> Vec<FrameId>
    where
        I: IntoIterator<Item = FileHandle>,
    {
        let mut added = Vec::new();
        for file in files {
            let preview = self
                .blobs
                .register(file.source().clone(), file.mime_type.clone());
            let frame = Frame {
                id: FrameId::generate(),
                preview,
                file,
            };
            tracing::debug!(frame_id = %frame.id, name = %frame.file.name, "Frame added");
            added.push(frame.id);
            self.frames.push(frame);
        }
        added
    }

    /// Remove the frame with `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: FrameId) -> Option<Frame> {
        let index = self.position(id)?;
        let frame = self.frames.remove(index);
        tracing::debug!(frame_id = %id, "Frame removed");
        Some(frame)
    }

    /// Move `dragged` so that it sits immediately before `target`.
    ///
    /// All other frames keep their relative order. Returns `false` (and
    /// changes nothing) when either id is unknown or both are the same.
    pub fn reorder(&mut self, dragged: FrameId, target: FrameId) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(from), Some(target_index)) = (self.position(dragged), self.position(target))
        else {
            return false;
        };

        // Removing the dragged frame shifts everything after it left by one.
        let to = if from < target_index {
            target_index - 1
        } else {
            target_index
        };
        let frame = self.frames.remove(from);
        self.frames.insert(to, frame);

        tracing::debug!(dragged = %dragged, target = %target, from, to, "Frames reordered");
        true
    }

    /// Drop every frame, releasing all previews.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// The reference frame, if any.
    pub fn first(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn ids(&self) -> Vec<FrameId> {
        self.frames.iter().map(Frame::id).collect()
    }

    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    fn position(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|f| f.id == id)
    }
}

impl<'a> IntoIterator for &'a FrameCollection {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
