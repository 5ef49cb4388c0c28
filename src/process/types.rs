/*!
 * Process Types
 * Common types for process management
 */

use crate::core::types::{Address, Pid, Priority, Size, Tick, DEFAULT_PRIORITY};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process table full: all {capacity} slots in use")]
    #[diagnostic(
        code(process::table_full),
        help("Wait for a process to terminate, or compact to reclaim user partitions.")
    )]
    TableFull { capacity: usize },

    #[error("Burst time must be at least 1 tick")]
    #[diagnostic(
        code(process::zero_burst),
        help("A process must execute for at least one time unit.")
    )]
    ZeroBurst,
}

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Created but not yet admitted; still waiting for memory
    Created,
    /// Holding memory, waiting in the ready queue
    Ready,
    /// Currently executing
    Running,
    /// Parked by the driver; no core transition produces this
    Waiting,
    /// Finished or reclaimed; the slot is recyclable
    Terminated,
}

/// The address range a process was allocated, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryWindow {
    pub start: Address,
    pub end: Address,
}

/// Process control block.
///
/// Lives in a fixed table slot; `Terminated` slots are recycled by the
/// next create. The memory window is set exactly while the process owns
/// an allocated partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pcb {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub memory_size: Size,
    pub memory_window: Option<MemoryWindow>,
    pub arrival_time: Tick,
    pub burst_time: u32,
    pub remaining_time: u32,
    pub priority: Priority,
}

impl Pcb {
    /// An empty recyclable slot. PID 0 is never assigned to a process.
    pub fn vacant() -> Self {
        Self {
            pid: 0,
            name: String::new(),
            state: ProcessState::Terminated,
            memory_size: 0,
            memory_window: None,
            arrival_time: 0,
            burst_time: 0,
            remaining_time: 0,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn set_window(&mut self, start: Address, end: Address) {
        self.memory_window = Some(MemoryWindow { start, end });
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }
}

/// Process metadata row for presentation layers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub memory_size: Size,
    pub memory_window: Option<MemoryWindow>,
    pub arrival_time: Tick,
    pub burst_time: u32,
    pub remaining_time: u32,
    pub priority: Priority,
}

impl From<&Pcb> for ProcessInfo {
    fn from(p: &Pcb) -> Self {
        Self {
            pid: p.pid,
            name: p.name.clone(),
            state: p.state,
            memory_size: p.memory_size,
            memory_window: p.memory_window,
            arrival_time: p.arrival_time,
            burst_time: p.burst_time,
            remaining_time: p.remaining_time,
            priority: p.priority,
        }
    }
}
