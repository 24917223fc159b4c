//! # Sample Window
//!
//! Fixed-capacity ring buffer that keeps the most recent `N` samples.
//! No heap allocation; the storage lives inline.

/// Bounded circular buffer holding the most recent `N` values.
///
/// Pushing into a full window evicts the oldest value first.
///
/// # Examples
///
/// ```
/// use stick_cal::calibration::SampleWindow;
///
/// let mut window: SampleWindow<u16, 3> = SampleWindow::new();
/// for v in [1, 2, 3, 4] {
///     window.push(v);
/// }
/// assert!(window.is_full());
/// assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct SampleWindow<T, const N: usize> {
    slots: [T; N],
    /// Index of the oldest value.
    head: usize,
    len: usize,
}

impl<T: Copy + Default, const N: usize> Default for SampleWindow<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> SampleWindow<T, N> {
    /// Creates an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
            head: 0,
            len: 0,
        }
    }

    /// Appends `value`, evicting and returning the oldest value when full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if N == 0 {
            return Some(value);
        }

        let evicted = if self.is_full() { self.pop_oldest() } else { None };

        let tail = (self.head + self.len) % N;
        self.slots[tail] = value;
        self.len += 1;
        evicted
    }

    /// Removes and returns the oldest value.
    pub fn pop_oldest(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.slots[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(value)
    }

    /// Drops every value.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        N
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).map(move |i| &self.slots[(self.head + i) % N])
    }
}
