/*!
 * Process Module
 * Process records, lifecycle state, and table management
 */

pub mod table;
pub mod types;

// Re-export for convenience
pub use table::ProcessTable;
pub use types::*;
