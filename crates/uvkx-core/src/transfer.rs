//! Transfer progress reporting

/// Progress sink for downloads and uploads
pub trait TransferProgress {
    /// Called after each block with the bytes done so far, the total, and a
    /// message naming the current phase
    fn update(&mut self, current: usize, max: usize, message: &str);
}

/// A no-op progress reporter
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl TransferProgress for NoProgress {
    fn update(&mut self, _current: usize, _max: usize, _message: &str) {}
}

impl<F: FnMut(usize, usize, &str)> TransferProgress for F {
    fn update(&mut self, current: usize, max: usize, message: &str) {
        self(current, max, message)
    }
}
