/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// Address type for the simulated address space
pub type Address = u32;

/// Size type for memory operations, in bytes
pub type Size = u32;

/// Priority level (higher is more important)
pub type Priority = u8;

/// Simulated time, in discrete ticks
pub type Tick = u64;

/// Default priority assigned to newly created processes
pub const DEFAULT_PRIORITY: Priority = 3;

/// Common result type for kernel initialization
pub type KernelResult<T> = Result<T, super::errors::KernelError>;
