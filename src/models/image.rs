use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier reserved for the placeholder bitmap.
const PLACEHOLDER_ID: u64 = 0;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(PLACEHOLDER_ID + 1);

/// Opaque handle to an immutable bitmap.
///
/// Cloning an `Image` shares the underlying pixel buffer; two clones compare
/// equal because they refer to the same bitmap. Images are produced by the
/// acquisition components (camera or gallery) and moved into the workflow.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    id: u64,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Image {
    /// Wrap a decoded pixel buffer in a new handle with a fresh identifier.
    pub fn new(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// The stand-in used when the reorder screen is entered with no photos.
    pub fn placeholder() -> Self {
        Self {
            id: PLACEHOLDER_ID,
            width: 0,
            height: 0,
            pixels: Arc::from(Vec::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }
}

// Pixel buffers can be megabytes; keep Debug output to the handle itself.
impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
