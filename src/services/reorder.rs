use crate::models::{Image, ReviewGrid};

/// Number of slots in the 2x2 grid.
pub const SLOT_COUNT: usize = 4;

/// Four image slots with drag-to-swap reordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderableCollection {
    slots: [Image; SLOT_COUNT],
    drag_source: Option<usize>,
    drop_target: Option<usize>,
}

impl ReorderableCollection {
    /// Normalize `images` to exactly four slots.
    ///
    /// No images gives four placeholders, fewer than four are padded with
    /// copies of the last one, more than four keep the first four.
    pub fn new(images: Vec<Image>) -> Self {
        let mut images = images;
        images.truncate(SLOT_COUNT);

        let filler = images.last().cloned().unwrap_or_else(Image::placeholder);
        images.resize(SLOT_COUNT, filler);

        Self {
            slots: std::array::from_fn(|i| images[i].clone()),
            drag_source: None,
            drop_target: None,
        }
    }

    pub fn slots(&self) -> &[Image; SLOT_COUNT] {
        &self.slots
    }

    pub fn into_slots(self) -> [Image; SLOT_COUNT] {
        self.slots
    }

    pub fn drag_source(&self) -> Option<usize> {
        self.drag_source
    }

    pub fn drop_target(&self) -> Option<usize> {
        self.drop_target
    }

    /// Pick up the slot at `index`. Returns false for an invalid index.
    pub fn begin_drag(&mut self, index: usize) -> bool {
        if index >= SLOT_COUNT {
            tracing::debug!("Ignoring drag from invalid slot {}", index);
            return false;
        }
        self.drag_source = Some(index);
        self.drop_target = None;
        true
    }

    /// Mark `index` as the drop target. Only valid while dragging, and never
    /// the slot being dragged.
    pub fn set_drop_target(&mut self, index: usize) -> bool {
        match self.drag_source {
            Some(source) if index < SLOT_COUNT && index != source => {
                self.drop_target = Some(index);
                true
            }
            _ => false,
        }
    }

    /// Swap the dragged slot with the drop target, then clear both.
    /// Returns whether a swap happened.
    pub fn commit_swap(&mut self) -> bool {
        let swapped = match (self.drag_source.take(), self.drop_target.take()) {
            (Some(source), Some(target)) => self.swap(source, target),
            _ => false,
        };
        if swapped {
            tracing::debug!("Reordered grid");
        }
        swapped
    }

    pub fn cancel_drag(&mut self) {
        self.drag_source = None;
        self.drop_target = None;
    }

    /// Swap two slots directly. Returns false when the indices are equal or
    /// out of range.
    pub fn swap(&mut self, i: usize, j: usize) -> bool {
        if i == j || i >= SLOT_COUNT || j >= SLOT_COUNT {
            return false;
        }
        self.slots.swap(i, j);
        true
    }

    /// Snapshot for the observable state.
    pub fn grid(&self) -> ReviewGrid {
        ReviewGrid {
            slots: self.slots.clone(),
            drag_source: self.drag_source,
            drop_target: self.drop_target,
        }
    }
}
