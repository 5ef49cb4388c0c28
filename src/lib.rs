/*!
 * Fixed-Partition Kernel Simulator
 * Memory partition allocation and process scheduling as a discrete-time simulation
 */

pub mod core;
pub mod kernel;
pub mod memory;
pub mod process;
pub mod scheduler;

// Re-exports
pub use crate::core::errors::KernelError;
pub use crate::core::types::{Address, Pid, Priority, Size, Tick};
pub use crate::kernel::{Kernel, KernelConfig};
pub use crate::memory::{
    FitStrategy, MemoryError, MemoryManager, MemoryStats, PartitionInfo, PartitionLayout,
    PartitionState, PartitionTable,
};
pub use crate::process::{ProcessError, ProcessInfo, ProcessState, ProcessTable};
pub use crate::scheduler::{Scheduler, SchedulerStatus, SchedulingPolicy};
