/*!
 * Process Table
 * Fixed-capacity slot arena with PID assignment and slot reuse
 */

use super::types::{Pcb, ProcessError, ProcessResult, ProcessState};
use crate::core::types::{Pid, Size, Tick};
use log::{debug, info};

/// Owns all process records for a run.
///
/// Slots start out `Terminated` and are recycled once their occupant
/// terminates. PIDs increase monotonically and wrap back to 1 after the
/// table capacity, skipping any PID still attached to a live process.
#[derive(Debug, Clone)]
pub struct ProcessTable {
    slots: Vec<Pcb>,
    next_pid: Pid,
}

impl ProcessTable {
    pub fn new(capacity: usize) -> Self {
        debug!("Process table initialized with {} slots", capacity);
        Self {
            slots: vec![Pcb::vacant(); capacity],
            next_pid: 1,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Create a process in a recyclable slot.
    ///
    /// The process starts in `Created` state with no memory window; it
    /// only becomes `Ready` once allocation succeeds. A zero burst time
    /// is rejected: every process must execute for at least one tick.
    pub fn create(
        &mut self,
        name: &str,
        memory_size: Size,
        burst_time: u32,
        arrival_time: Tick,
    ) -> ProcessResult<Pid> {
        if burst_time == 0 {
            return Err(ProcessError::ZeroBurst);
        }

        let slot = match self.slots.iter().position(|p| p.is_terminated()) {
            Some(i) => i,
            None => {
                return Err(ProcessError::TableFull {
                    capacity: self.slots.len(),
                })
            }
        };

        let pid = self.alloc_pid();
        let pcb = &mut self.slots[slot];
        *pcb = Pcb::vacant();
        pcb.pid = pid;
        pcb.name = name.to_string();
        pcb.state = ProcessState::Created;
        pcb.memory_size = memory_size;
        pcb.arrival_time = arrival_time;
        pcb.burst_time = burst_time;
        pcb.remaining_time = burst_time;

        info!(
            "Process created: PID={} name={} memory={} burst={} arrival={}",
            pid, name, memory_size, burst_time, arrival_time
        );

        Ok(pid)
    }

    /// Next monotonically increasing PID, wrapping after the table
    /// capacity. Skips PIDs still held by live processes; a recyclable
    /// slot is known to exist when this is called, so the scan terminates.
    fn alloc_pid(&mut self) -> Pid {
        loop {
            let pid = self.next_pid;
            self.next_pid = if self.next_pid as usize >= self.slots.len() {
                1
            } else {
                self.next_pid + 1
            };

            let in_use = self
                .slots
                .iter()
                .any(|p| p.pid == pid && !p.is_terminated());
            if !in_use {
                return pid;
            }
        }
    }

    /// Look up a live process. Terminated slots never match.
    pub fn find_by_pid(&self, pid: Pid) -> Option<&Pcb> {
        self.slots
            .iter()
            .find(|p| p.pid == pid && !p.is_terminated())
    }

    pub fn find_by_pid_mut(&mut self, pid: Pid) -> Option<&mut Pcb> {
        self.slots
            .iter_mut()
            .find(|p| p.pid == pid && !p.is_terminated())
    }

    /// Terminate a process: clears its memory window and makes the slot
    /// recyclable. A no-op for already terminated or unknown PIDs.
    pub fn terminate(&mut self, pid: Pid) -> bool {
        match self.find_by_pid_mut(pid) {
            Some(pcb) => {
                pcb.state = ProcessState::Terminated;
                pcb.memory_window = None;
                info!("Process terminated: PID={}", pid);
                true
            }
            None => false,
        }
    }

    /// Live processes in slot order
    pub fn iter_live(&self) -> impl Iterator<Item = &Pcb> {
        self.slots.iter().filter(|p| !p.is_terminated())
    }

    /// PIDs of processes still waiting for admission at `now`
    pub fn pending_arrivals(&self, now: Tick) -> Vec<Pid> {
        self.slots
            .iter()
            .filter(|p| p.state == ProcessState::Created && p.arrival_time <= now)
            .map(|p| p.pid)
            .collect()
    }
}
