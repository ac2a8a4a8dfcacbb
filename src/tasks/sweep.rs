//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries, and the
//! handle that owns it across interval changes.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::error::{CacheError, Result};

/// Spawns a background task that sweeps `store` every `interval`.
///
/// Each pass runs to completion before the next sleep starts, so at most one
/// sweep is ever in flight. The returned handle aborts the task.
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::new(storage, Duration::from_secs(3600)));
/// let handle = spawn_sweep_task(store.clone(), Duration::from_secs(5));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(store: Arc<CacheStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(sweep_loop(store, interval))
}

async fn sweep_loop(store: Arc<CacheStore>, interval: Duration) {
    info!("Starting TTL sweep task with interval of {:?}", interval);

    loop {
        tokio::time::sleep(interval).await;

        match store.sweep() {
            Ok(removed) if removed > 0 => {
                info!("TTL sweep: removed {} expired entries", removed);
            }
            Ok(_) => debug!("TTL sweep: no expired entries found"),
            Err(e) => warn!("TTL sweep failed: {}", e),
        }
    }
}

// == Sweeper ==
/// Owns the single sweep timer of a cache context.
///
/// Changing the interval while running aborts the current task and spawns a
/// new one on the runtime the sweeper was started on; dropping the sweeper
/// aborts the task.
pub struct Sweeper {
    store: Arc<CacheStore>,
    state: Mutex<SweeperState>,
}

struct SweeperState {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
    /// Runtime captured by the first successful start
    runtime: Option<Handle>,
}

impl Sweeper {
    pub fn new(store: Arc<CacheStore>, interval: Duration) -> Self {
        Self {
            store,
            state: Mutex::new(SweeperState {
                interval,
                handle: None,
                runtime: None,
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.state.lock().interval
    }

    pub fn is_running(&self) -> bool {
        self.state
            .lock()
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Start ==
    /// Starts the sweep task if it is not already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }
        let runtime = Handle::try_current()
            .map_err(|e| CacheError::Runtime(format!("Cannot start sweep task: {}", e)))?;
        state.handle = Some(self.spawn_on(&runtime, state.interval));
        state.runtime = Some(runtime);
        Ok(())
    }

    // == Set Interval ==
    /// Changes the sweep period, restarting the task if it is running.
    ///
    /// On error neither the interval nor the running task is touched.
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(CacheError::InvalidRequest(
                "Sweep interval must be greater than zero".to_string(),
            ));
        }

        let mut state = self.state.lock();
        if state.handle.is_some() {
            let runtime = match &state.runtime {
                Some(runtime) => runtime.clone(),
                None => Handle::try_current().map_err(|e| {
                    CacheError::Runtime(format!("Cannot restart sweep task: {}", e))
                })?,
            };
            if let Some(old) = state.handle.replace(self.spawn_on(&runtime, interval)) {
                old.abort();
            }
            info!("Sweep task restarted with interval of {:?}", interval);
        }
        state.interval = interval;
        Ok(())
    }

    // == Stop ==
    pub fn stop(&self) {
        if let Some(handle) = self.state.lock().handle.take() {
            handle.abort();
            debug!("Sweep task stopped");
        }
    }

    fn spawn_on(&self, runtime: &Handle, interval: Duration) -> JoinHandle<()> {
        runtime.spawn(sweep_loop(self.store.clone(), interval))
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().handle.take() {
            handle.abort();
        }
    }
}
