//! Bounded work buffer pool.
//!
//! The pool owns a fixed set of [`WorkBuffer`]s. `acquire` hands one out by
//! value and blocks while none are idle; `release` takes it back and wakes a
//! single waiter. A woken waiter re-takes the lock and checks the idle set
//! again, so a buffer released while a waiter is being woken may go to
//! another caller first.

use super::{HeapAllocator, WorkBuffer, WorkmemAllocator};
use crate::Result;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Work memory get/put discipline used by a backend.
///
/// [`WorkBufferPool`] is the default. A backend may supply its own policy as
/// long as `get` always returns a buffer sized for its algorithm.
pub trait WorkmemPolicy: Send + Sync {
    /// Obtain a work buffer, waiting if necessary.
    fn get(&self) -> WorkBuffer;

    /// Give back a buffer obtained from [`WorkmemPolicy::get`].
    fn put(&self, wm: WorkBuffer);

    /// Number of `get` calls that had to wait.
    fn contended(&self) -> u64 {
        0
    }
}

struct PoolState {
    idle: VecDeque<WorkBuffer>,
    /// Buffers owned by the pool, idle or lent out.
    total: usize,
    /// Callers parked in `acquire`.
    waiters: usize,
}

/// Fixed-capacity pool of work buffers shared by concurrent callers.
pub struct WorkBufferPool {
    state: Mutex<PoolState>,
    available: Condvar,
    capacity: usize,
    workmem_size: usize,
    contended: AtomicU64,
    allocator: Arc<dyn WorkmemAllocator>,
}

impl WorkBufferPool {
    /// Create a pool holding a single buffer with a `workmem_size` byte
    /// working area.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Allocation`] if the buffer cannot be allocated.
    pub fn init(workmem_size: usize) -> Result<Self> {
        Self::with_allocator(workmem_size, NonZeroUsize::MIN, Arc::new(HeapAllocator))
    }

    /// Create a pool of `capacity` buffers drawn from `allocator`.
    ///
    /// Either every buffer is allocated or none is: on failure the regions
    /// obtained so far are returned to `allocator`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Allocation`] if any region cannot be allocated.
    pub fn with_allocator(
        workmem_size: usize,
        capacity: NonZeroUsize,
        allocator: Arc<dyn WorkmemAllocator>,
    ) -> Result<Self> {
        let capacity = capacity.get();
        let mut idle = VecDeque::with_capacity(capacity);
        for _ in 0..capacity {
            match WorkBuffer::alloc(allocator.as_ref(), workmem_size) {
                Ok(wm) => idle.push_back(wm),
                Err(e) => {
                    for wm in idle.drain(..) {
                        wm.free(allocator.as_ref());
                    }
                    return Err(e);
                }
            }
        }

        debug!(capacity, workmem_size, "workmem pool initialised");

        Ok(Self {
            state: Mutex::new(PoolState {
                idle,
                total: capacity,
                waiters: 0,
            }),
            available: Condvar::new(),
            capacity,
            workmem_size,
            contended: AtomicU64::new(0),
            allocator,
        })
    }

    /// Take an idle buffer, blocking until one is released if none is idle.
    ///
    /// Never fails. Calling this while already holding the last buffer of
    /// the same pool deadlocks.
    pub fn acquire(&self) -> WorkBuffer {
        let mut state = self.state.lock();
        if let Some(wm) = state.idle.pop_front() {
            return wm;
        }

        self.contended.fetch_add(1, Ordering::Relaxed);
        loop {
            state.waiters += 1;
            trace!(waiters = state.waiters, "workmem pool empty, waiting");
            self.available.wait(&mut state);
            state.waiters -= 1;

            if let Some(wm) = state.idle.pop_front() {
                trace!("workmem waiter resumed");
                return wm;
            }
        }
    }

    /// Take an idle buffer without waiting.
    pub fn try_acquire(&self) -> Option<WorkBuffer> {
        self.state.lock().idle.pop_front()
    }

    /// Return a buffer to the idle set and wake at most one waiter.
    pub fn release(&self, wm: WorkBuffer) {
        debug_assert_eq!(wm.mem().len(), self.workmem_size);

        let waiters = {
            let mut state = self.state.lock();
            state.idle.push_back(wm);
            debug_assert!(state.idle.len() <= state.total);
            state.waiters
        };

        if waiters > 0 {
            self.available.notify_one();
        }
    }

    /// Free every idle buffer.
    ///
    /// Buffers still held elsewhere are not reclaimed here; they are freed
    /// when released back and the pool is dropped, or when their holder
    /// drops them.
    pub fn teardown(&mut self) {
        let state = self.state.get_mut();
        let held = state.total.saturating_sub(state.idle.len());
        if held > 0 {
            warn!(held, "tearing down workmem pool with buffers still held");
        }

        let freed = state.idle.len();
        for wm in state.idle.drain(..) {
            wm.free(self.allocator.as_ref());
        }
        state.total = held;

        if freed > 0 {
            debug!(freed, "workmem pool torn down");
        }
    }

    /// Number of buffers allocated at init.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Working area size of every buffer.
    #[must_use]
    pub fn workmem_size(&self) -> usize {
        self.workmem_size
    }

    /// Buffers currently idle.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.state.lock().idle.len()
    }

    /// Callers currently parked in [`WorkBufferPool::acquire`].
    #[must_use]
    pub fn waiters(&self) -> usize {
        self.state.lock().waiters
    }

    /// Number of `acquire` calls that found the pool empty.
    #[must_use]
    pub fn contended(&self) -> u64 {
        self.contended.load(Ordering::Relaxed)
    }
}

impl WorkmemPolicy for WorkBufferPool {
    fn get(&self) -> WorkBuffer {
        self.acquire()
    }

    fn put(&self, wm: WorkBuffer) {
        self.release(wm);
    }

    fn contended(&self) -> u64 {
        WorkBufferPool::contended(self)
    }
}

impl Drop for WorkBufferPool {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for WorkBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkBufferPool")
            .field("capacity", &self.capacity)
            .field("workmem_size", &self.workmem_size)
            .field("idle", &self.idle())
            .finish_non_exhaustive()
    }
}

/// A work buffer that goes back to its policy when dropped.
pub struct WorkmemLease<'a> {
    policy: &'a dyn WorkmemPolicy,
    /// `None` only once detached by `into_inner`.
    wm: Option<WorkBuffer>,
}

impl<'a> WorkmemLease<'a> {
    /// Get a buffer from `policy`, waiting if necessary.
    pub fn new(policy: &'a dyn WorkmemPolicy) -> Self {
        Self {
            wm: Some(policy.get()),
            policy,
        }
    }

    /// Detach the buffer. The caller becomes responsible for putting it back.
    #[must_use]
    pub fn into_inner(mut self) -> WorkBuffer {
        self.wm.take().expect("lease holds a buffer until detached")
    }
}

impl Deref for WorkmemLease<'_> {
    type Target = WorkBuffer;

    fn deref(&self) -> &WorkBuffer {
        self.wm.as_ref().expect("lease holds a buffer until detached")
    }
}

impl DerefMut for WorkmemLease<'_> {
    fn deref_mut(&mut self) -> &mut WorkBuffer {
        self.wm.as_mut().expect("lease holds a buffer until detached")
    }
}

impl Drop for WorkmemLease<'_> {
    fn drop(&mut self) {
        if let Some(wm) = self.wm.take() {
            self.policy.put(wm);
        }
    }
}
