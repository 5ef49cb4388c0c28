/*!
 * Error Types
 * Fatal configuration errors with thiserror, miette, and serde support
 */

use crate::core::types::Size;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export recoverable error kinds from their modules
pub use crate::memory::types::MemoryError;
pub use crate::process::types::ProcessError;

/// Configuration errors reported by `Kernel::new`
///
/// These are fatal: the kernel cannot start with an invalid partition
/// layout or scheduler configuration.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum KernelError {
    #[error("Partition layout needs {required} bytes but only {total} are configured")]
    #[diagnostic(
        code(kernel::layout_overflow),
        help("Reduce the OS reservation or the user partition sizes so they fit in total memory.")
    )]
    LayoutOverflow { required: Size, total: Size },

    #[error("No user partitions configured")]
    #[diagnostic(
        code(kernel::empty_layout),
        help("Configure at least one user partition size.")
    )]
    EmptyLayout,

    #[error("Partition size must be non-zero")]
    #[diagnostic(
        code(kernel::zero_partition),
        help("Remove zero-sized entries from the partition size list.")
    )]
    ZeroPartitionSize,

    #[error("OS reservation must be non-zero")]
    #[diagnostic(
        code(kernel::zero_os_reservation),
        help("The OS partition occupies the bottom of the address space and cannot be empty.")
    )]
    ZeroOsReservation,

    #[error("Scheduler quantum must be at least 1 tick")]
    #[diagnostic(
        code(kernel::zero_quantum),
        help("Configure a quantum of one or more ticks.")
    )]
    ZeroQuantum,

    #[error("Process table capacity must be at least 1")]
    #[diagnostic(
        code(kernel::zero_capacity),
        help("Configure max_processes to one or more slots.")
    )]
    ZeroProcessCapacity,
}
