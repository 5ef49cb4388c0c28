/*!
 * Memory Module
 * Fixed-partition table and allocation strategies
 */

pub mod allocator;
pub mod table;
pub mod types;

// Re-export for convenience
pub use allocator::MemoryManager;
pub use table::{PartitionLayout, PartitionTable};
pub use types::*;
