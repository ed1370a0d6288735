//! Fixed-capacity running accumulator used by the windowed transforms.

/// Circular buffer of the last `capacity` values with a running sum.
///
/// Pushing is O(1): the new value is added to the sum and, once the buffer is
/// full, the oldest value is evicted and subtracted. While fewer than
/// `capacity` values have been pushed the window is in its ramp-up region.
#[derive(Debug, Clone)]
pub struct RollingSum {
    buf: Vec<f64>,
    capacity: usize,
    head: usize,
    sum: f64,
}

impl RollingSum {
    /// Create an empty window. A capacity of zero is treated as one.
    ///
    /// Storage grows with the values pushed, so a window longer than the
    /// trace only holds the trace.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Vec::new(),
            capacity,
            head: 0,
            sum: 0.0,
        }
    }

    /// Push a value, returning the value evicted from a full window.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.sum += value;
        if self.buf.len() < self.capacity {
            self.buf.push(value);
            return None;
        }
        let evicted = std::mem::replace(&mut self.buf[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        self.sum -= evicted;
        Some(evicted)
    }

    /// Sum of the values currently in the window
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of values currently in the window
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True until `capacity` values have been pushed.
    pub fn is_ramping(&self) -> bool {
        self.buf.len() < self.capacity
    }
}
