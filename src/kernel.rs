/*!
 * Kernel Context
 * Owns the partition and process tables, the scheduler, and the clock
 */

use crate::core::types::{KernelResult, Pid, Size, Tick};
use crate::memory::allocator::MemoryManager;
use crate::memory::table::{PartitionLayout, PartitionTable};
use crate::memory::types::{FitStrategy, MemoryStats, PartitionInfo};
use crate::process::table::ProcessTable;
use crate::process::types::{ProcessInfo, ProcessResult};
use crate::core::errors::KernelError;
use crate::scheduler::{Scheduler, SchedulerStatus, SchedulingPolicy};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Default fixed partition size cycle, smallest to largest
pub const DEFAULT_PARTITION_SIZES: [Size; 4] = [64, 128, 256, 512];

/// Kernel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct KernelConfig {
    pub total_memory: Size,
    pub os_reserved: Size,
    pub partition_sizes: Vec<Size>,
    pub max_processes: usize,
    pub fit_strategy: FitStrategy,
    pub policy: SchedulingPolicy,
    pub quantum: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        let layout = PartitionLayout::fixed_cycle(1024, 128, &DEFAULT_PARTITION_SIZES);
        Self {
            total_memory: layout.total_memory,
            os_reserved: layout.os_reserved,
            partition_sizes: layout.user_sizes,
            max_processes: 32,
            fit_strategy: FitStrategy::BestFit,
            policy: SchedulingPolicy::RoundRobin,
            quantum: 2,
        }
    }
}

/// The whole kernel state as one explicit context object.
///
/// Single-threaded by design: one `tick` is the unit of atomicity, and
/// all mutation goes through `&mut self`. A concurrent host must keep
/// the entire kernel behind a single serialization point; partitions,
/// processes, and the ready queue are never safe to mutate separately.
#[derive(Debug)]
pub struct Kernel {
    partitions: PartitionTable,
    processes: ProcessTable,
    memory: MemoryManager,
    scheduler: Scheduler,
    clock: Tick,
}

impl Kernel {
    /// Build a kernel from a configuration. Fails on an invalid layout,
    /// a zero quantum, or a zero-capacity process table; the simulation
    /// cannot run with any of those.
    pub fn new(config: KernelConfig) -> KernelResult<Self> {
        if config.quantum == 0 {
            return Err(KernelError::ZeroQuantum);
        }
        if config.max_processes == 0 {
            return Err(KernelError::ZeroProcessCapacity);
        }

        let layout = PartitionLayout::new(
            config.total_memory,
            config.os_reserved,
            config.partition_sizes.clone(),
        );
        let partitions = PartitionTable::new(&layout)?;

        info!(
            "Kernel initialized: {} bytes memory, {} user partitions, policy={} quantum={} strategy={}",
            config.total_memory,
            layout.user_sizes.len(),
            config.policy.as_str(),
            config.quantum,
            config.fit_strategy.as_str()
        );

        Ok(Self {
            partitions,
            processes: ProcessTable::new(config.max_processes),
            memory: MemoryManager::new(config.fit_strategy),
            scheduler: Scheduler::new(config.policy, config.quantum),
            clock: 0,
        })
    }

    /// Create a process in `Created` state. It is admitted to the
    /// scheduler on the first tick at or after its arrival time on which
    /// a partition can be allocated for it.
    pub fn create_process(
        &mut self,
        name: &str,
        memory_size: Size,
        burst_time: u32,
        arrival_time: Tick,
    ) -> ProcessResult<Pid> {
        self.processes
            .create(name, memory_size, burst_time, arrival_time)
    }

    /// Advance simulated time by one unit.
    ///
    /// Within the tick the steps are applied in fixed order: arrival
    /// check and allocation, admission, scheduling decision, then one
    /// unit of execution. Returns the new time.
    pub fn tick(&mut self) -> Tick {
        self.clock += 1;
        debug!("Tick {}", self.clock);

        self.admit_arrivals();
        self.scheduler.schedule(&mut self.processes);
        self.scheduler
            .run_current(&mut self.processes, &mut self.partitions, &self.memory);

        self.clock
    }

    /// Allocate memory for every `Created` process that has arrived, and
    /// admit the ones that got a partition. A failed allocation leaves
    /// the process in `Created` state to be retried next tick.
    fn admit_arrivals(&mut self) {
        for pid in self.processes.pending_arrivals(self.clock) {
            let pcb = match self.processes.find_by_pid_mut(pid) {
                Some(pcb) => pcb,
                None => continue,
            };

            match self.memory.allocate(&mut self.partitions, pcb) {
                Ok(_) => {
                    info!(
                        "Process {} ({}) arrived at tick {} and was admitted",
                        pid, pcb.name, self.clock
                    );
                    self.scheduler.admit(pcb);
                }
                Err(e) => {
                    // Recoverable: retried on a later tick
                    warn!("Process {} stays pending at tick {}: {}", pid, self.clock, e);
                }
            }
        }
    }

    /// Administrative full reclaim: terminates every process owning a
    /// user partition and frees their partitions. Not a defragmentation;
    /// fixed partitions cannot be relocated. Returns the number of
    /// processes reclaimed.
    pub fn compact(&mut self) -> usize {
        let reclaimed = self
            .memory
            .compact(&mut self.partitions, &mut self.processes);
        self.scheduler.purge(&self.processes);
        reclaimed
    }

    /// Change the fit strategy live; applies from the next allocation.
    pub fn set_fit_strategy(&mut self, strategy: FitStrategy) {
        self.memory.set_strategy(strategy);
    }

    #[inline]
    pub fn fit_strategy(&self) -> FitStrategy {
        self.memory.strategy()
    }

    /// Change the scheduling policy live; applies from the next decision
    /// point without resetting queue membership.
    pub fn set_policy(&mut self, policy: SchedulingPolicy) {
        self.scheduler.set_policy(policy);
    }

    #[inline]
    pub fn policy(&self) -> SchedulingPolicy {
        self.scheduler.policy()
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock
    }

    /// True once no process is live or awaiting admission.
    pub fn is_idle(&self) -> bool {
        self.processes.iter_live().next().is_none()
    }

    pub fn memory_stats(&self) -> MemoryStats {
        self.memory.stats(&self.partitions)
    }

    pub fn scheduler_status(&self) -> SchedulerStatus {
        self.scheduler.status()
    }

    /// Memory map rows in ascending address order, OS reservation first.
    pub fn list_partitions(&self) -> Vec<PartitionInfo> {
        self.partitions.iter().map(PartitionInfo::from).collect()
    }

    /// Live processes in slot order.
    pub fn list_processes(&self) -> Vec<ProcessInfo> {
        self.processes.iter_live().map(ProcessInfo::from).collect()
    }
}
