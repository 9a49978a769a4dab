/// Number of photos that make up one booth session.
pub const PHOTOS_PER_SESSION: usize = 4;

/// Result of accepting one more photo into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountProgress {
    /// Still collecting; holds the new count.
    InProgress(usize),
    /// The count just reached [`PHOTOS_PER_SESSION`].
    Complete,
    /// The session was already complete; the photo was not counted.
    AlreadyComplete,
}

/// Accepted-photo counter for a four-photo session.
///
/// Invariant: `0 <= value <= PHOTOS_PER_SESSION`. Only saved photos
/// increment it; failed or discarded captures never do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureCount(usize);

impl CaptureCount {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn value(&self) -> usize {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 == PHOTOS_PER_SESSION
    }

    /// Count one accepted photo. [`CountProgress::Complete`] is returned
    /// exactly once per session.
    pub fn increment(&mut self) -> CountProgress {
        if self.is_complete() {
            return CountProgress::AlreadyComplete;
        }
        self.0 += 1;
        if self.is_complete() {
            CountProgress::Complete
        } else {
            CountProgress::InProgress(self.0)
        }
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_counts_to_complete() {
        let mut count = CaptureCount::new();
        assert_eq!(count.increment(), CountProgress::InProgress(1));
        assert_eq!(count.increment(), CountProgress::InProgress(2));
        assert_eq!(count.increment(), CountProgress::InProgress(3));
        assert_eq!(count.increment(), CountProgress::Complete);
        assert!(count.is_complete());
        assert_eq!(count.increment(), CountProgress::AlreadyComplete);
        assert_eq!(count.value(), 4);
    }

    #[test]
    fn test_reset() {
        let mut count = CaptureCount::new();
        count.increment();
        count.increment();
        count.reset();
        assert_eq!(count.value(), 0);
    }

    proptest! {
        #[test]
        fn prop_complete_fires_once(increments in 0usize..32) {
            let mut count = CaptureCount::new();
            let mut completions = 0;
            for _ in 0..increments {
                if count.increment() == CountProgress::Complete {
                    completions += 1;
                }
                prop_assert!(count.value() <= PHOTOS_PER_SESSION);
            }
            prop_assert_eq!(completions, usize::from(increments >= PHOTOS_PER_SESSION));
        }
    }
}
