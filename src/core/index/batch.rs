//! Memory-bounded batching for the index build.

use serde::{Deserialize, Serialize};

/// Default memory ceiling for one batch (4 GiB)
pub const DEFAULT_MEMORY_BUDGET_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Typical size of a 24 MP compressed ARW (24 MiB)
pub const DEFAULT_AVG_RAW_SIZE_BYTES: u64 = 24 * 1024 * 1024;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// How many raw files may be in flight at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    /// Raw files inspected per batch
    pub batch_size: usize,
    /// Assumed average raw file size
    pub avg_file_size_bytes: u64,
}

impl BatchPlan {
    /// Largest batch that keeps `batch_size * avg_file_size` under the budget
    pub fn from_memory_budget(budget_bytes: u64, avg_file_size_bytes: u64) -> Self {
        let batch_size = budget_bytes
            .checked_div(avg_file_size_bytes)
            .unwrap_or(budget_bytes)
            .max(1);

        Self {
            batch_size: usize::try_from(batch_size).unwrap_or(usize::MAX),
            avg_file_size_bytes,
        }
    }

    /// A user-chosen batch size (zero is bumped to one)
    pub fn with_batch_size(batch_size: usize, avg_file_size_bytes: u64) -> Self {
        Self {
            batch_size: batch_size.max(1),
            avg_file_size_bytes,
        }
    }

    /// Peak memory if every file in a batch were held at once
    pub fn estimated_memory_bytes(&self) -> u64 {
        (self.batch_size as u64).saturating_mul(self.avg_file_size_bytes)
    }

    pub fn estimated_memory_gb(&self) -> f64 {
        self.estimated_memory_bytes() as f64 / BYTES_PER_GB
    }
}

impl Default for BatchPlan {
    fn default() -> Self {
        Self::from_memory_budget(DEFAULT_MEMORY_BUDGET_BYTES, DEFAULT_AVG_RAW_SIZE_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_fits_four_gigabytes() {
        let plan = BatchPlan::default();
        assert_eq!(plan.batch_size, 170);
        assert!(plan.estimated_memory_bytes() <= DEFAULT_MEMORY_BUDGET_BYTES);
    }

    #[test]
    fn estimate_scales_with_batch_size() {
        let plan = BatchPlan::with_batch_size(100, DEFAULT_AVG_RAW_SIZE_BYTES);
        assert!((plan.estimated_memory_gb() - 2.34375).abs() < 1e-9);
    }

    #[test]
    fn tiny_budget_still_allows_one_file() {
        let plan = BatchPlan::from_memory_budget(1024, DEFAULT_AVG_RAW_SIZE_BYTES);
        assert_eq!(plan.batch_size, 1);
    }

    #[test]
    fn zero_average_size_does_not_divide_by_zero() {
        let plan = BatchPlan::from_memory_budget(4096, 0);
        assert_eq!(plan.batch_size, 4096);
    }

    #[test]
    fn zero_batch_size_is_bumped() {
        assert_eq!(BatchPlan::with_batch_size(0, 1).batch_size, 1);
    }
}
