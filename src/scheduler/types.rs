/*!
 * Scheduler Types
 * Scheduling policy and status reporting
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};

/// Scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// Run to completion in admission order
    Fifo,
    /// Admission order with fixed time quantum preemption
    RoundRobin,
    /// Priority is tracked per process but the queue is deliberately not
    /// reordered; dequeue order matches FIFO
    Priority,
}

impl SchedulingPolicy {
    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "round_robin" | "roundrobin" | "rr" => Ok(Self::RoundRobin),
            "priority" | "prio" => Ok(Self::Priority),
            _ => Err(format!(
                "Invalid policy '{}'. Valid: fifo, round_robin, priority",
                s
            )),
        }
    }

    /// Convert to string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::RoundRobin => "round_robin",
            Self::Priority => "priority",
        }
    }
}

/// Scheduler status snapshot, for presentation layers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStatus {
    pub policy: SchedulingPolicy,
    pub ready_count: usize,
    pub ready_pids: Vec<Pid>,
    pub current: Option<Pid>,
    pub quantum: u32,
    pub remaining_quantum: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(SchedulingPolicy::parse("fifo").unwrap(), SchedulingPolicy::Fifo);
        assert_eq!(
            SchedulingPolicy::parse("rr").unwrap(),
            SchedulingPolicy::RoundRobin
        );
        assert_eq!(
            SchedulingPolicy::parse("Priority").unwrap(),
            SchedulingPolicy::Priority
        );
        assert!(SchedulingPolicy::parse("fair").is_err());
    }
}
