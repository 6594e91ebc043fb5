//! Temporary variable allocation.
//!
//! One allocator is used per compiled function body. Names are numbered from
//! 1 in the order they are requested, and the planner declares each temporary
//! right after requesting it, so numbering follows declaration order.

use crate::options::LoweringOptions;

/// Hands out unique temporary names (`$tmp1`, `$tmp2`, ...).
#[derive(Debug, Clone)]
pub struct TemporaryAllocator {
    prefix: String,
    allocated: u32,
}

impl TemporaryAllocator {
    /// Create an allocator with the given name prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            allocated: 0,
        }
    }

    /// Create an allocator using the configured prefix.
    pub fn for_options(options: &LoweringOptions) -> Self {
        Self::new(options.temp_prefix())
    }

    /// Allocate the next temporary name.
    pub fn allocate(&mut self) -> String {
        self.allocated += 1;
        format!("{}{}", self.prefix, self.allocated)
    }

    /// Number of temporaries allocated so far.
    pub fn count(&self) -> u32 {
        self.allocated
    }
}

impl Default for TemporaryAllocator {
    fn default() -> Self {
        Self::for_options(&LoweringOptions::default())
    }
}
