use super::image::Image;
use std::collections::VecDeque;

/// Number of photos kept in the recent-photos strip.
pub const RECENT_PHOTOS_CAPACITY: usize = 4;

/// Most-recent-first list of saved photos, capped at
/// [`RECENT_PHOTOS_CAPACITY`]. Memory only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentPhotosHistory {
    photos: VecDeque<Image>,
}

impl RecentPhotosHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front, evicting the oldest entry when over capacity.
    pub fn push(&mut self, image: Image) {
        self.photos.push_front(image);
        self.photos.truncate(RECENT_PHOTOS_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.photos.iter()
    }

    pub fn to_vec(&self) -> Vec<Image> {
        self.photos.iter().cloned().collect()
    }
}
