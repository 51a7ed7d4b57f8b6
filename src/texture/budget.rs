//! Memory budget for the texture cache
//!
//! Tracks estimated bytes of resident texture variants against a ceiling and
//! provides pressure metrics for eviction decisions.

/// Byte budget tracker
#[derive(Clone, Debug)]
pub struct MemoryBudget {
    /// Maximum memory allowed (bytes)
    budget_bytes: u64,
    /// Currently used memory (bytes)
    used_bytes: u64,
}

impl MemoryBudget {
    /// Create a budget with a ceiling in bytes
    pub fn new(budget_bytes: u64) -> Self {
        Self {
            budget_bytes,
            used_bytes: 0,
        }
    }

    /// Create a budget with a ceiling in megabytes
    pub fn from_mb(budget_mb: u64) -> Self {
        Self::new(budget_mb.saturating_mul(1024 * 1024))
    }

    // --- Tracking methods ---

    pub fn add(&mut self, bytes: u64) {
        self.used_bytes = self.used_bytes.saturating_add(bytes);
    }

    pub fn remove(&mut self, bytes: u64) {
        self.used_bytes = self.used_bytes.saturating_sub(bytes);
    }

    pub fn reset(&mut self) {
        self.used_bytes = 0;
    }

    /// Change the ceiling; usage is left as is
    pub fn set_budget(&mut self, budget_bytes: u64) {
        self.budget_bytes = budget_bytes;
    }

    // --- Query methods ---

    pub fn budget(&self) -> u64 {
        self.budget_bytes
    }

    pub fn used(&self) -> u64 {
        self.used_bytes
    }

    pub fn available(&self) -> u64 {
        self.budget_bytes.saturating_sub(self.used_bytes)
    }

    /// Usage relative to the ceiling (0.0 to 1.0+)
    ///
    /// Values above 1.0 indicate over-budget.
    pub fn pressure(&self) -> f32 {
        if self.budget_bytes == 0 {
            return if self.used_bytes == 0 { 0.0 } else { f32::INFINITY };
        }
        self.used_bytes as f32 / self.budget_bytes as f32
    }

    // --- Decision methods ---

    pub fn is_over_budget(&self) -> bool {
        self.used_bytes > self.budget_bytes
    }

    pub fn can_fit(&self, bytes: u64) -> bool {
        self.available() >= bytes
    }
}
