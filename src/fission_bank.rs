// Per-worker fission banks and their merge.
//
// During the transport phase every worker owns exactly one slot of the arena:
// its private fission bank and its private tally scratch. Nothing else is
// written concurrently. After the parallel region the slots are merged, in
// slot order, into one master bank whose contents end up in the primary slot.

use crate::bank::Bank;
use crate::error::Result;
use crate::tally::{Tally, TallyScratch};

/// Everything a single worker writes while transporting its particles.
#[derive(Debug, Clone)]
pub struct WorkerSlot {
    pub fission_bank: Bank,
    pub tally: TallyScratch,
}

/// Owner of all worker slots for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct WorkerArena {
    master: Bank,
    slots: Vec<WorkerSlot>,
}

impl WorkerArena {
    /// One slot per worker, each fission bank sized for `capacity` sites.
    pub fn new(n_workers: usize, capacity: usize, tally: &Tally) -> Result<Self> {
        let n_workers = n_workers.max(1);
        let slots = (0..n_workers)
            .map(|_| {
                Ok(WorkerSlot {
                    fission_bank: Bank::with_capacity(capacity)?,
                    tally: tally.scratch(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            master: Bank::with_capacity(capacity)?,
            slots,
        })
    }

    /// Arena for transporting `n_particles` source particles over `n_workers`
    /// workers. Each fission bank starts sized for its worker's share of the
    /// particles and grows on demand.
    pub fn for_particles(n_workers: usize, n_particles: usize, tally: &Tally) -> Result<Self> {
        let n_workers = n_workers.max(1);
        Self::new(n_workers, n_particles.div_ceil(n_workers), tally)
    }

    pub fn n_workers(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[WorkerSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [WorkerSlot] {
        &mut self.slots
    }

    /// The fission bank that holds the merged sites after [`WorkerArena::merge`].
    pub fn primary(&self) -> &Bank {
        &self.slots[0].fission_bank
    }

    pub fn primary_mut(&mut self) -> &mut Bank {
        &mut self.slots[0].fission_bank
    }

    /// Total number of fission sites across all workers.
    pub fn total_sites(&self) -> usize {
        self.slots.iter().map(|s| s.fission_bank.len()).sum()
    }

    /// Combine every worker's fission sites into the primary bank.
    ///
    /// Sites are laid out contiguously by worker, worker 0 first, each
    /// worker's own order preserved. Afterwards the primary bank holds all of
    /// them and every other worker bank is empty. Returns the merged count.
    pub fn merge(&mut self) -> Result<usize> {
        let n_sites = self.total_sites();
        if self.slots.len() == 1 {
            return Ok(n_sites);
        }

        // Grow the master and primary banks together when the merged set does not fit
        if n_sites > self.master.capacity() || n_sites > self.primary().capacity() {
            self.master.ensure_capacity(n_sites)?;
            self.primary_mut().ensure_capacity(n_sites)?;
        }

        self.master.clear();
        for slot in &self.slots {
            self.master.extend_from_slice(slot.fission_bank.as_slice())?;
        }

        if let Some((primary, rest)) = self.slots.split_first_mut() {
            primary.fission_bank.clear();
            primary.fission_bank.extend_from_slice(self.master.as_slice())?;
            for slot in rest {
                slot.fission_bank.clear();
            }
        }

        debug_assert_eq!(self.primary().len(), n_sites);
        Ok(n_sites)
    }

    /// Empty every fission bank.
    pub fn clear(&mut self) {
        self.master.clear();
        for slot in &mut self.slots {
            slot.fission_bank.clear();
        }
    }
}
