//! Byte budget for resident chunk geometry.

#[derive(Clone, Debug)]
pub struct ByteBudget {
    limit: usize,
    used: usize,
}

impl ByteBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn available(&self) -> usize {
        self.limit.saturating_sub(self.used)
    }

    pub fn add(&mut self, bytes: usize) {
        self.used = self.used.saturating_add(bytes);
    }

    pub fn remove(&mut self, bytes: usize) {
        debug_assert!(bytes <= self.used, "budget underflow: {bytes} > {}", self.used);
        self.used = self.used.saturating_sub(bytes);
    }

    /// Replaces `old` bytes of one chunk with `new`.
    pub fn replace(&mut self, old: usize, new: usize) {
        self.remove(old);
        self.add(new);
    }

    pub fn fits(&self, bytes: usize) -> bool {
        bytes <= self.available()
    }

    pub fn is_over(&self) -> bool {
        self.used > self.limit
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}
