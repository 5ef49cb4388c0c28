/*!
 * Partition Table
 * Fixed arena of memory partitions built once from a validated layout
 */

use super::types::{Partition, PartitionId, PartitionState};
use crate::core::errors::KernelError;
use crate::core::types::{KernelResult, Pid, Size};
use log::debug;
use serde::{Deserialize, Serialize};

/// Partition layout: an OS reservation at the bottom of the address space
/// followed by an ordered list of user partition sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PartitionLayout {
    pub total_memory: Size,
    pub os_reserved: Size,
    pub user_sizes: Vec<Size>,
}

impl PartitionLayout {
    pub fn new(total_memory: Size, os_reserved: Size, user_sizes: Vec<Size>) -> Self {
        Self {
            total_memory,
            os_reserved,
            user_sizes,
        }
    }

    /// Generate a layout by cycling through a list of partition sizes.
    ///
    /// One partition of each size is placed first (so every size class
    /// exists at least once), then the cycle repeats until no listed size
    /// fits in the remaining memory.
    pub fn fixed_cycle(total_memory: Size, os_reserved: Size, sizes: &[Size]) -> Self {
        // Zero entries never advance the fill and are skipped; additions
        // are checked so oversized entries cannot overflow the cursor.
        let fits = |addr: Size, size: Size| {
            size > 0 && addr.checked_add(size).is_some_and(|end| end <= total_memory)
        };

        let mut user_sizes = Vec::new();
        let mut addr = os_reserved;

        for &size in sizes {
            if fits(addr, size) {
                user_sizes.push(size);
                addr += size;
            }
        }

        loop {
            let mut added = false;
            for &size in sizes {
                if fits(addr, size) {
                    user_sizes.push(size);
                    addr += size;
                    added = true;
                    break;
                }
            }
            if !added {
                break;
            }
        }

        Self::new(total_memory, os_reserved, user_sizes)
    }

    /// Validate the layout: non-empty, non-zero sizes, and everything
    /// fits within total memory.
    pub fn validate(&self) -> KernelResult<()> {
        if self.os_reserved == 0 {
            return Err(KernelError::ZeroOsReservation);
        }
        if self.user_sizes.is_empty() {
            return Err(KernelError::EmptyLayout);
        }
        if self.user_sizes.iter().any(|&s| s == 0) {
            return Err(KernelError::ZeroPartitionSize);
        }

        // Checked sum: a layout whose sizes overflow the address type
        // cannot fit any total either.
        let required = self
            .user_sizes
            .iter()
            .try_fold(self.os_reserved, |acc, &s| acc.checked_add(s));
        match required {
            Some(required) if required <= self.total_memory => Ok(()),
            required => Err(KernelError::LayoutOverflow {
                required: required.unwrap_or(Size::MAX),
                total: self.total_memory,
            }),
        }
    }
}

/// Owns the fixed set of partitions for a run.
///
/// Slot 0 is the OS reservation; user partitions follow contiguously in
/// ascending address order. Free and allocated views are filters over the
/// arena, addressed by stable `PartitionId` rather than references.
#[derive(Debug, Clone)]
pub struct PartitionTable {
    partitions: Vec<Partition>,
    total_memory: Size,
    os_reserved: Size,
}

impl PartitionTable {
    /// Build the table from a layout. Fails on an invalid configuration.
    pub fn new(layout: &PartitionLayout) -> KernelResult<Self> {
        layout.validate()?;

        let mut partitions = Vec::with_capacity(layout.user_sizes.len() + 1);
        partitions.push(Partition {
            id: 0,
            start: 0,
            size: layout.os_reserved,
            state: PartitionState::OsReserved,
            owner: None,
        });

        let mut addr = layout.os_reserved;
        for (i, &size) in layout.user_sizes.iter().enumerate() {
            partitions.push(Partition {
                id: i + 1,
                start: addr,
                size,
                state: PartitionState::Free,
                owner: None,
            });
            addr += size;
        }

        debug!(
            "Partition table initialized: {} user partitions, {} bytes OS reserved, {} bytes total",
            layout.user_sizes.len(),
            layout.os_reserved,
            layout.total_memory
        );

        Ok(Self {
            partitions,
            total_memory: layout.total_memory,
            os_reserved: layout.os_reserved,
        })
    }

    /// Look up a partition by id. An out-of-range id is a programmer
    /// error and panics.
    #[inline]
    pub fn get(&self, id: PartitionId) -> &Partition {
        &self.partitions[id]
    }

    #[inline]
    pub fn get_mut(&mut self, id: PartitionId) -> &mut Partition {
        &mut self.partitions[id]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    #[inline]
    pub fn total_memory(&self) -> Size {
        self.total_memory
    }

    #[inline]
    pub fn os_reserved(&self) -> Size {
        self.os_reserved
    }

    /// All partitions in ascending address order, OS reservation included
    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter()
    }

    /// User partitions (everything except the OS reservation)
    pub fn user_partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter().skip(1)
    }

    /// The partition currently owned by a process, if any
    pub fn owned_by(&self, pid: Pid) -> Option<PartitionId> {
        self.partitions
            .iter()
            .find(|p| p.state == PartitionState::Allocated && p.owner == Some(pid))
            .map(|p| p.id)
    }

    /// Ids of user partitions currently allocated to a process
    pub fn allocated_ids(&self) -> Vec<PartitionId> {
        self.user_partitions()
            .filter(|p| p.state == PartitionState::Allocated)
            .map(|p| p.id)
            .collect()
    }
}
