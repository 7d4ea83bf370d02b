//! Fixed-capacity lookback of recent closes.

/// Ring buffer of the last `capacity` closes, oldest first on read.
#[derive(Debug, Clone)]
pub struct Lookback {
    data: Vec<f64>,
    head: usize,
    len: usize,
}

impl Lookback {
    /// `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    /// Append a close, overwriting the oldest once full.
    pub fn push(&mut self, value: f64) {
        let capacity = self.capacity();
        self.data[self.head] = value;
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Most recent close.
    pub fn last(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.capacity();
        Some(self.data[(self.head + capacity - 1) % capacity])
    }

    /// Buffered closes from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let capacity = self.capacity();
        let start = (self.head + capacity - self.len) % capacity;
        (0..self.len).map(move |i| self.data[(start + i) % capacity])
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}
