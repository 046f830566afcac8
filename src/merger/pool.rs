//! Bounded merger pools.
//!
//! A pool owns a fixed set of `MarcMerger` instances. `checkout()` waits on a
//! semaphore until an instance is idle and hands it out as a `MergerLease`;
//! the lease puts the instance back when dropped, so every exit path of the
//! borrowing code releases it exactly once.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error_handling::PoolError;

use super::{MarcMerger, MergerFlavor};

/// A bounded pool of merge engines of one flavor.
#[derive(Debug)]
pub struct MergerPool {
    flavor: MergerFlavor,
    capacity: usize,
    idle: Mutex<Vec<MarcMerger>>,
    permits: Arc<Semaphore>,
}

impl MergerPool {
    /// Creates a pool holding `capacity` fresh instances.
    pub fn new(flavor: MergerFlavor, capacity: usize) -> Arc<Self> {
        let idle = (0..capacity).map(|i| MarcMerger::new(i, flavor)).collect();
        Arc::new(MergerPool {
            flavor,
            capacity,
            idle: Mutex::new(idle),
            permits: Arc::new(Semaphore::new(capacity)),
        })
    }

    pub fn flavor(&self) -> MergerFlavor {
        self.flavor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of instances currently idle.
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    /// Waits for an idle instance and leases it exclusively.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Closed` once the pool has been shut down.
    pub async fn checkout(self: &Arc<Self>) -> Result<MergerLease, PoolError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed(self.flavor))?;

        // A permit guarantees an idle instance: permits and idle instances move together.
        let merger = self
            .lock_idle()
            .pop()
            .ok_or(PoolError::Closed(self.flavor))?;
        debug!(
            "Checked out {} merger #{}",
            self.flavor,
            merger.instance_id()
        );

        Ok(MergerLease {
            merger: Some(merger),
            pool: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Returns a leased instance to the pool.
    ///
    /// Same as dropping the lease; provided for call sites that want the
    /// release to be explicit.
    pub fn checkin(&self, lease: MergerLease) {
        drop(lease);
    }

    /// Stops handing out instances. Waiting and future checkouts fail;
    /// outstanding leases can still be returned.
    pub fn close(&self) {
        info!("Closing {} merger pool", self.flavor);
        self.permits.close();
    }

    fn return_instance(&self, merger: MarcMerger) {
        debug!("Checked in {} merger #{}", self.flavor, merger.instance_id());
        self.lock_idle().push(merger);
    }

    fn lock_idle(&self) -> MutexGuard<'_, Vec<MarcMerger>> {
        // The idle stack stays consistent even if a holder panicked mid-push.
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive use of one pooled `MarcMerger`.
///
/// Dereferences to the merger. Dropping the lease returns the instance to
/// its pool before the semaphore permit is released.
#[derive(Debug)]
pub struct MergerLease {
    merger: Option<MarcMerger>,
    pool: Arc<MergerPool>,
    _permit: OwnedSemaphorePermit,
}

impl MergerLease {
    /// Releases the lease now.
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for MergerLease {
    type Target = MarcMerger;

    fn deref(&self) -> &MarcMerger {
        self.merger
            .as_ref()
            .expect("merger lease holds an instance until dropped")
    }
}

impl DerefMut for MergerLease {
    fn deref_mut(&mut self) -> &mut MarcMerger {
        self.merger
            .as_mut()
            .expect("merger lease holds an instance until dropped")
    }
}

impl Drop for MergerLease {
    fn drop(&mut self) {
        if let Some(merger) = self.merger.take() {
            self.pool.return_instance(merger);
        }
    }
}

/// The two process-lifetime merger pools.
#[derive(Debug, Clone)]
pub struct MergerPools {
    default: Arc<MergerPool>,
    parent_agency: Arc<MergerPool>,
}

impl MergerPools {
    pub fn new(default_capacity: usize, parent_agency_capacity: usize) -> Self {
        MergerPools {
            default: MergerPool::new(MergerFlavor::Default, default_capacity),
            parent_agency: MergerPool::new(MergerFlavor::ParentAgency, parent_agency_capacity),
        }
    }

    pub fn pool(&self, flavor: MergerFlavor) -> &Arc<MergerPool> {
        match flavor {
            MergerFlavor::Default => &self.default,
            MergerFlavor::ParentAgency => &self.parent_agency,
        }
    }

    /// Leases a merger of the flavor selected by `use_parent_overlay`.
    pub async fn checkout(&self, use_parent_overlay: bool) -> Result<MergerLease, PoolError> {
        self.pool(MergerFlavor::from_parent_overlay(use_parent_overlay))
            .checkout()
            .await
    }

    pub fn close(&self) {
        self.default.close();
        self.parent_agency.close();
    }
}
