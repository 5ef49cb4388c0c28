/*!
 * Memory Management
 * Fit-strategy selection, allocation bookkeeping, compaction, and statistics
 */

use super::table::PartitionTable;
use super::types::{
    FitStrategy, MemoryError, MemoryResult, MemoryStats, PartitionId, PartitionState,
};
use crate::core::types::{Pid, Size};
use crate::process::table::ProcessTable;
use crate::process::types::Pcb;
use log::{info, warn};
use std::cmp::Reverse;

/// Pure decision logic over a borrowed `PartitionTable`.
///
/// Owns no partition or process data itself; the only state is the
/// currently configured fit strategy, which may change between ticks
/// without resetting anything.
#[derive(Debug, Clone)]
pub struct MemoryManager {
    strategy: FitStrategy,
}

impl MemoryManager {
    pub fn new(strategy: FitStrategy) -> Self {
        info!("Memory manager initialized with {} strategy", strategy.as_str());
        Self { strategy }
    }

    #[inline]
    pub fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: FitStrategy) {
        info!("Fit strategy changed to {}", strategy.as_str());
        self.strategy = strategy;
    }

    /// Scan the free user partitions for one that can hold `requested`
    /// bytes under the configured strategy. Ties break to the lowest
    /// address for all strategies.
    pub fn find_free(&self, table: &PartitionTable, requested: Size) -> Option<PartitionId> {
        let mut candidates = table
            .user_partitions()
            .filter(|p| p.is_free() && p.size >= requested);

        match self.strategy {
            // Partitions are stored in ascending address order
            FitStrategy::FirstFit => candidates.next().map(|p| p.id),
            FitStrategy::BestFit => candidates.min_by_key(|p| (p.size, p.start)).map(|p| p.id),
            FitStrategy::WorstFit => candidates
                .min_by_key(|p| (Reverse(p.size), p.start))
                .map(|p| p.id),
        }
    }

    /// Allocate a partition for a process and record its memory window.
    ///
    /// The requested size may be smaller than the chosen partition;
    /// internal fragmentation is expected under a fixed-partition scheme
    /// and is tracked by `stats`, not corrected.
    pub fn allocate(&self, table: &mut PartitionTable, proc: &mut Pcb) -> MemoryResult<PartitionId> {
        let id = match self.find_free(table, proc.memory_size) {
            Some(id) => id,
            None => {
                warn!(
                    "Allocation failed for PID {}: no free partition fits {} bytes",
                    proc.pid, proc.memory_size
                );
                return Err(MemoryError::NoFittingPartition {
                    requested: proc.memory_size,
                });
            }
        };

        let partition = table.get_mut(id);
        partition.state = PartitionState::Allocated;
        partition.owner = Some(proc.pid);
        proc.set_window(partition.start, partition.end());

        info!(
            "Partition {} allocated to PID {}: start=0x{:04x} size={} (requested {})",
            id, proc.pid, partition.start, partition.size, proc.memory_size
        );

        Ok(id)
    }

    /// Free a partition. A no-op on `Free` or `OsReserved` partitions, so
    /// double frees never change ownership.
    pub fn free(&self, table: &mut PartitionTable, id: PartitionId) {
        let partition = table.get_mut(id);
        if partition.state != PartitionState::Allocated {
            return;
        }

        let owner = partition.owner.take();
        partition.state = PartitionState::Free;

        info!(
            "Partition {} freed: start=0x{:04x} size={} (was PID {:?})",
            id, partition.start, partition.size, owner
        );
    }

    /// Free the partition owned by a process, if it holds one.
    pub fn release(&self, table: &mut PartitionTable, pid: Pid) -> Option<PartitionId> {
        let id = table.owned_by(pid)?;
        self.free(table, id);
        Some(id)
    }

    /// Compact memory.
    ///
    /// Fixed-size partitions cannot be defragmented by relocation, so
    /// compaction is an administrative full reclaim: every process owning
    /// a user partition is forcibly terminated and its partition freed,
    /// restoring the all-free initial state. Returns the number of
    /// processes reclaimed.
    pub fn compact(&self, table: &mut PartitionTable, processes: &mut ProcessTable) -> usize {
        let mut reclaimed = 0;

        for id in table.allocated_ids() {
            if let Some(pid) = table.get(id).owner {
                processes.terminate(pid);
                reclaimed += 1;
            }
            self.free(table, id);
        }

        info!(
            "Compaction complete: {} user processes reclaimed, all user partitions free",
            reclaimed
        );

        reclaimed
    }

    /// Free/used/fragmentation statistics over the user partitions.
    ///
    /// Percentages are relative to the partitioned user region. A layout
    /// may leave a trailing remainder of the address space that belongs
    /// to no partition; that remainder is unallocatable and counts in
    /// neither the free nor the used figures.
    pub fn stats(&self, table: &PartitionTable) -> MemoryStats {
        let mut total_free = 0;
        let mut used_bytes = 0;
        let mut largest_free_block = 0;

        for p in table.user_partitions() {
            match p.state {
                PartitionState::Free => {
                    total_free += p.size;
                    largest_free_block = largest_free_block.max(p.size);
                }
                PartitionState::Allocated => used_bytes += p.size,
                PartitionState::OsReserved => {}
            }
        }

        // Every user partition is either free or allocated, so this is
        // the partitioned user capacity.
        let user_memory = total_free + used_bytes;
        let external_fragmentation_pct = if total_free == 0 {
            0.0
        } else {
            (total_free - largest_free_block) as f64 * 100.0 / total_free as f64
        };

        MemoryStats {
            total_memory: table.total_memory(),
            os_reserved: table.os_reserved(),
            total_free,
            used_bytes,
            largest_free_block,
            used_pct: used_bytes as f64 * 100.0 / user_memory as f64,
            free_pct: total_free as f64 * 100.0 / user_memory as f64,
            external_fragmentation_pct,
        }
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new(FitStrategy::BestFit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::table::PartitionLayout;

    fn table_with(sizes: &[Size]) -> PartitionTable {
        let total: Size = 128 + sizes.iter().sum::<Size>();
        PartitionTable::new(&PartitionLayout::new(total, 128, sizes.to_vec())).unwrap()
    }

    fn pcb(pid: Pid, size: Size) -> Pcb {
        let mut p = Pcb::vacant();
        p.pid = pid;
        p.memory_size = size;
        p
    }

    #[test]
    fn test_first_fit_takes_lowest_address() {
        let table = table_with(&[256, 64, 128]);
        let mm = MemoryManager::new(FitStrategy::FirstFit);
        assert_eq!(mm.find_free(&table, 64), Some(1));
    }

    #[test]
    fn test_best_fit_takes_smallest_sufficient() {
        let table = table_with(&[256, 64, 128]);
        let mm = MemoryManager::new(FitStrategy::BestFit);
        assert_eq!(mm.find_free(&table, 60), Some(2));
        assert_eq!(mm.find_free(&table, 100), Some(3));
    }

    #[test]
    fn test_worst_fit_takes_largest() {
        let table = table_with(&[256, 64, 128]);
        let mm = MemoryManager::new(FitStrategy::WorstFit);
        assert_eq!(mm.find_free(&table, 60), Some(1));
    }

    #[test]
    fn test_ties_break_to_lowest_address() {
        let table = table_with(&[128, 128, 128]);
        for strategy in [FitStrategy::FirstFit, FitStrategy::BestFit, FitStrategy::WorstFit] {
            let mm = MemoryManager::new(strategy);
            assert_eq!(mm.find_free(&table, 100), Some(1), "{:?}", strategy);
        }
    }

    #[test]
    fn test_allocate_sets_owner_and_window() {
        let mut table = table_with(&[64, 128]);
        let mm = MemoryManager::new(FitStrategy::BestFit);
        let mut proc = pcb(7, 100);

        let id = mm.allocate(&mut table, &mut proc).unwrap();
        assert_eq!(id, 2);
        assert_eq!(table.get(2).state, PartitionState::Allocated);
        assert_eq!(table.get(2).owner, Some(7));

        let window = proc.memory_window.unwrap();
        assert_eq!(window.start, 128 + 64);
        assert_eq!(window.end, 128 + 64 + 128 - 1);
    }

    #[test]
    fn test_allocation_failure_is_recoverable() {
        let mut table = table_with(&[64]);
        let mm = MemoryManager::default();
        let mut proc = pcb(1, 512);

        let err = mm.allocate(&mut table, &mut proc).unwrap_err();
        assert_eq!(err, MemoryError::NoFittingPartition { requested: 512 });
        assert!(proc.memory_window.is_none());
        assert!(table.user_partitions().all(|p| p.is_free()));
    }

    #[test]
    fn test_free_is_idempotent() {
        let mut table = table_with(&[64]);
        let mm = MemoryManager::default();
        let mut proc = pcb(1, 64);

        let id = mm.allocate(&mut table, &mut proc).unwrap();
        mm.free(&mut table, id);
        assert_eq!(table.get(id).state, PartitionState::Free);
        assert_eq!(table.get(id).owner, None);

        // Second free and a free of the OS reservation are no-ops
        mm.free(&mut table, id);
        mm.free(&mut table, 0);
        assert_eq!(table.get(id).state, PartitionState::Free);
        assert_eq!(table.get(0).state, PartitionState::OsReserved);
    }

    #[test]
    fn test_stats_fragmentation_formula() {
        let mut table = table_with(&[128, 64, 64]);
        let mm = MemoryManager::new(FitStrategy::FirstFit);

        // Allocate the 128 partition; 64 + 64 free, largest 64
        let mut proc = pcb(1, 128);
        mm.allocate(&mut table, &mut proc).unwrap();

        let stats = mm.stats(&table);
        assert_eq!(stats.total_free, 128);
        assert_eq!(stats.used_bytes, 128);
        assert_eq!(stats.largest_free_block, 64);
        assert!((stats.external_fragmentation_pct - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_percentages_over_partitioned_region() {
        // The layout leaves 768 bytes past the single partition
        // unpartitioned; percentages ignore that remainder.
        let mut table =
            PartitionTable::new(&PartitionLayout::new(1024, 128, vec![128])).unwrap();
        let mm = MemoryManager::new(FitStrategy::FirstFit);

        let stats = mm.stats(&table);
        assert_eq!(stats.total_free, 128);
        assert!((stats.free_pct - 100.0).abs() < f64::EPSILON);
        assert_eq!(stats.used_pct, 0.0);

        let mut proc = pcb(1, 100);
        mm.allocate(&mut table, &mut proc).unwrap();
        let stats = mm.stats(&table);
        assert!((stats.used_pct - 100.0).abs() < f64::EPSILON);
        assert_eq!(stats.free_pct, 0.0);
    }

    #[test]
    fn test_stats_zero_free_means_zero_fragmentation() {
        let mut table = table_with(&[64]);
        let mm = MemoryManager::new(FitStrategy::FirstFit);
        let mut proc = pcb(1, 64);
        mm.allocate(&mut table, &mut proc).unwrap();

        let stats = mm.stats(&table);
        assert_eq!(stats.total_free, 0);
        assert_eq!(stats.external_fragmentation_pct, 0.0);
    }
}
