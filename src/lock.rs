//! The append lock (§5): a re-entrant, unfair mutex owned by the queue.
//!
//! This is a pure synchronization primitive — it hands out a unit guard,
//! never a reference to protected data — so there is no soundness hazard
//! from granting two overlapping `&mut` views into the same memory the way
//! a naive "re-entrant mutex wrapping a value" would. Callers pair it with
//! their own exclusively-owned `PageQueue` the same way a `Mutex<()>` is
//! traditionally paired with data protected "by convention" rather than by
//! the type system. std does not expose a stable, generically usable
//! re-entrant mutex, so this rolls the minimal one the append lock needs:
//! recursive acquisition from the *same* thread succeeds immediately,
//! acquisition from another thread blocks until the depth returns to zero.
//! Depth is expected to bottom out at 1 (§3 invariant 7, §9): the one-slot
//! heap headroom bounds how deep `append`'s own reentrancy can go.

use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};

pub struct AppendLock {
    state: Mutex<LockState>,
    cond: Condvar,
}

struct LockState {
    owner: Option<ThreadId>,
    depth: u32,
}

pub struct AppendLockGuard<'a> {
    lock: &'a AppendLock,
}

impl AppendLock {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState {
                owner: None,
                depth: 0,
            }),
            cond: Condvar::new(),
        }
    }

    /// Acquires the lock, blocking only if another thread currently holds
    /// it. Re-entrant on the calling thread.
    pub fn acquire(&self) -> AppendLockGuard<'_> {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap();
        loop {
            match state.owner {
                Some(owner) if owner == me => {
                    state.depth += 1;
                    break;
                }
                None => {
                    state.owner = Some(me);
                    state.depth = 1;
                    break;
                }
                Some(_) => {
                    state = self.cond.wait(state).unwrap();
                }
            }
        }
        AppendLockGuard { lock: self }
    }

    /// Current reentrancy depth on the holding thread, for assertions.
    pub fn depth(&self) -> u32 {
        self.state.lock().unwrap().depth
    }
}

impl Default for AppendLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AppendLockGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.lock.state.lock().unwrap();
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            self.lock.cond.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentrant_on_same_thread() {
        let lock = AppendLock::new();
        let outer = lock.acquire();
        assert_eq!(lock.depth(), 1);
        let inner = lock.acquire();
        assert_eq!(lock.depth(), 2);
        drop(inner);
        assert_eq!(lock.depth(), 1);
        drop(outer);
        assert_eq!(lock.depth(), 0);
    }

    #[test]
    fn blocks_across_threads() {
        use std::sync::Arc;
        use std::time::Duration;

        let lock = Arc::new(AppendLock::new());
        let guard = lock.acquire();

        let lock2 = lock.clone();
        let handle = thread::spawn(move || {
            let _g = lock2.acquire();
        });

        thread::sleep(Duration::from_millis(50));
        assert_eq!(lock.depth(), 1);

        drop(guard);
        handle.join().unwrap();
        assert_eq!(lock.depth(), 0);
    }
}
