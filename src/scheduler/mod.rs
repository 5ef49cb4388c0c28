/*!
 * CPU Scheduler
 * Ready queue and quantum-based preemption over the process table
 */

pub mod types;

pub use types::{SchedulerStatus, SchedulingPolicy};

use crate::core::types::Pid;
use crate::memory::allocator::MemoryManager;
use crate::memory::table::PartitionTable;
use crate::process::table::ProcessTable;
use crate::process::types::{Pcb, ProcessState};
use log::{debug, info};
use std::collections::VecDeque;

/// What happened when the current process was run for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No process held the CPU
    Idle,
    /// The current process executed and keeps the CPU
    Ran(Pid),
    /// The current process finished; its partition was released
    Completed(Pid),
    /// Round-robin quantum expired; the process was requeued at the tail
    QuantumExpired(Pid),
}

/// Preemptive scheduler over an index-based ready queue.
///
/// Owns no process data: the queue holds PIDs, and every operation
/// resolves them against the borrowed `ProcessTable`. Entries whose
/// process was reclaimed elsewhere (compaction) are skipped on dequeue.
#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: SchedulingPolicy,
    ready: VecDeque<Pid>,
    current: Option<Pid>,
    quantum: u32,
    remaining_quantum: u32,
}

impl Scheduler {
    pub fn new(policy: SchedulingPolicy, quantum: u32) -> Self {
        info!(
            "Scheduler initialized: policy={} quantum={}",
            policy.as_str(),
            quantum
        );
        Self {
            policy,
            ready: VecDeque::new(),
            current: None,
            quantum,
            remaining_quantum: 0,
        }
    }

    #[inline]
    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    /// Switch policy live. Queue membership and the current process are
    /// kept; the new policy applies from the next decision point.
    pub fn set_policy(&mut self, policy: SchedulingPolicy) {
        info!("Scheduling policy changed to {}", policy.as_str());
        self.policy = policy;
    }

    /// Admit a process that already holds memory: mark it ready and
    /// append it to the queue tail.
    pub fn admit(&mut self, pcb: &mut Pcb) {
        debug_assert!(
            pcb.memory_window.is_some(),
            "admission requires an allocated partition"
        );
        pcb.state = ProcessState::Ready;
        self.ready.push_back(pcb.pid);
        debug!("Process {} admitted to ready queue", pcb.pid);
    }

    /// Pick the process to run this tick, according to the policy.
    ///
    /// A current process that is still `Running` keeps the CPU under
    /// every policy; round-robin additionally requeues it first if its
    /// quantum is already exhausted. Priority deliberately dequeues in
    /// FIFO order; the priority field never reorders the queue.
    pub fn schedule(&mut self, processes: &mut ProcessTable) -> Option<Pid> {
        // Drop a current process that terminated or changed state
        // outside of run_current (e.g. compaction).
        if let Some(pid) = self.current {
            match processes.find_by_pid(pid) {
                Some(p) if p.state == ProcessState::Running => {}
                _ => self.current = None,
            }
        }

        if self.policy == SchedulingPolicy::RoundRobin {
            if let Some(pid) = self.current {
                if self.remaining_quantum == 0 {
                    self.requeue(processes, pid);
                    self.current = None;
                }
            }
        }

        if self.current.is_none() {
            if let Some(pid) = self.next_ready(processes) {
                if let Some(pcb) = processes.find_by_pid_mut(pid) {
                    pcb.state = ProcessState::Running;
                }
                self.current = Some(pid);
                self.remaining_quantum = self.quantum;
                debug!("Scheduled process {} ({})", pid, self.policy.as_str());
            }
        }

        self.current
    }

    /// Execute the current process for one time unit.
    ///
    /// On completion the partition is released before the process is
    /// terminated, atomically within the tick. Under round-robin an
    /// exhausted quantum requeues the process at the tail, never the
    /// head.
    pub fn run_current(
        &mut self,
        processes: &mut ProcessTable,
        partitions: &mut PartitionTable,
        memory: &MemoryManager,
    ) -> RunOutcome {
        let pid = match self.current {
            Some(pid) => pid,
            None => return RunOutcome::Idle,
        };

        let pcb = match processes.find_by_pid_mut(pid) {
            Some(pcb) if pcb.state == ProcessState::Running => pcb,
            _ => {
                self.current = None;
                return RunOutcome::Idle;
            }
        };

        pcb.remaining_time -= 1;
        if self.policy == SchedulingPolicy::RoundRobin {
            self.remaining_quantum = self.remaining_quantum.saturating_sub(1);
        }

        if pcb.remaining_time == 0 {
            memory.release(partitions, pid);
            processes.terminate(pid);
            self.current = None;
            return RunOutcome::Completed(pid);
        }

        if self.policy == SchedulingPolicy::RoundRobin && self.remaining_quantum == 0 {
            info!("Quantum expired for process {}", pid);
            self.requeue(processes, pid);
            self.current = None;
            return RunOutcome::QuantumExpired(pid);
        }

        RunOutcome::Ran(pid)
    }

    /// Remove stale entries after an external reclaim (compaction): the
    /// queue keeps only PIDs still in `Ready` state, and the current slot
    /// is cleared unless its process is still `Running`.
    pub fn purge(&mut self, processes: &ProcessTable) {
        self.ready.retain(|&pid| {
            processes
                .find_by_pid(pid)
                .is_some_and(|p| p.state == ProcessState::Ready)
        });

        if let Some(pid) = self.current {
            let running = processes
                .find_by_pid(pid)
                .is_some_and(|p| p.state == ProcessState::Running);
            if !running {
                self.current = None;
            }
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            policy: self.policy,
            ready_count: self.ready.len(),
            ready_pids: self.ready.iter().copied().collect(),
            current: self.current,
            quantum: self.quantum,
            remaining_quantum: self.remaining_quantum,
        }
    }

    #[inline]
    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    #[inline]
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    fn requeue(&mut self, processes: &mut ProcessTable, pid: Pid) {
        if let Some(pcb) = processes.find_by_pid_mut(pid) {
            pcb.state = ProcessState::Ready;
        }
        self.ready.push_back(pid);
    }

    /// Dequeue the next live ready process, dropping entries whose
    /// process was reclaimed since admission.
    fn next_ready(&mut self, processes: &ProcessTable) -> Option<Pid> {
        while let Some(pid) = self.ready.pop_front() {
            let ready = processes
                .find_by_pid(pid)
                .is_some_and(|p| p.state == ProcessState::Ready);
            if ready {
                return Some(pid);
            }
            debug!("Dropping stale ready-queue entry for PID {}", pid);
        }
        None
    }
}
