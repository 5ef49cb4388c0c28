/*!
 * Memory Types
 * Common types for partition management
 */

use crate::core::types::{Address, Pid, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
///
/// A failed allocation is recoverable: the caller leaves the process in
/// `Created` state and retries on a later tick.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MemoryError {
    #[error("No free partition can fit {requested} bytes")]
    #[diagnostic(
        code(memory::no_fitting_partition),
        help("Wait for a partition to be freed, or compact to reclaim all user partitions.")
    )]
    NoFittingPartition { requested: Size },
}

/// Stable identifier of a partition slot. The OS reservation is always slot 0.
pub type PartitionId = usize;

/// Partition state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionState {
    /// Available for allocation
    Free,
    /// Owned by a process
    Allocated,
    /// Permanently reserved for the operating system
    OsReserved,
}

/// A fixed-size, fixed-position region of the simulated address space.
///
/// Partitions are created once at initialization and never split, grown,
/// or destroyed; only `state` and `owner` change over a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partition {
    pub id: PartitionId,
    pub start: Address,
    pub size: Size,
    pub state: PartitionState,
    pub owner: Option<Pid>,
}

impl Partition {
    /// Last address covered by this partition, inclusive
    #[inline]
    pub fn end(&self) -> Address {
        self.start + self.size - 1
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == PartitionState::Free
    }
}

/// Fit strategy: the rule for choosing among eligible free partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    /// First eligible partition in ascending-address order
    FirstFit,
    /// Smallest eligible partition, lowest address on ties
    BestFit,
    /// Largest eligible partition, lowest address on ties
    WorstFit,
}

impl FitStrategy {
    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "first_fit" | "first" | "ff" => Ok(Self::FirstFit),
            "best_fit" | "best" | "bf" => Ok(Self::BestFit),
            "worst_fit" | "worst" | "wf" => Ok(Self::WorstFit),
            _ => Err(format!(
                "Invalid strategy '{}'. Valid: first_fit, best_fit, worst_fit",
                s
            )),
        }
    }

    /// Convert to string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstFit => "first_fit",
            Self::BestFit => "best_fit",
            Self::WorstFit => "worst_fit",
        }
    }
}

/// One row of the memory map, for presentation layers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PartitionInfo {
    pub id: PartitionId,
    pub start: Address,
    pub end: Address,
    pub size: Size,
    pub state: PartitionState,
    pub owner_pid: Option<Pid>,
}

impl From<&Partition> for PartitionInfo {
    fn from(p: &Partition) -> Self {
        Self {
            id: p.id,
            start: p.start,
            end: p.end(),
            size: p.size,
            state: p.state,
            owner_pid: p.owner,
        }
    }
}

/// Memory statistics over the user partitions
///
/// Percentages are relative to user memory (total minus the OS
/// reservation). External fragmentation is the share of free memory not
/// in the largest free partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MemoryStats {
    pub total_memory: Size,
    pub os_reserved: Size,
    pub total_free: Size,
    pub used_bytes: Size,
    pub largest_free_block: Size,
    pub used_pct: f64,
    pub free_pct: f64,
    pub external_fragmentation_pct: f64,
}
