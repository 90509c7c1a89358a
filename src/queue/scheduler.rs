//! Auto-dismiss timers.
//!
//! Each running toast owns at most one pending check task. Arming stamps the
//! toast with a fresh generation; a check only acts when the toast still
//! exists and still carries the generation it was armed with. Pausing,
//! exiting and removal bump or drop the generation, which retires the chain
//! even if the abort below loses the race with a firing timer.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::time::{Instant, sleep, sleep_until};
use tracing::trace;

use super::{EXIT_GRACE, Shared, State, ToastQueue};
use crate::toast::ToastId;

/// Schedules a check `budget` from now, replacing any pending one.
pub(super) fn arm(shared: &Arc<Shared>, state: &mut State, id: &ToastId, budget: Duration) {
    let Some(deadline) = Instant::now().checked_add(budget) else {
        trace!(toast_id = %id, "budget past the clock range; never auto-dismissed");
        cancel(state, id);
        return;
    };
    let generation = state.next_generation();
    let Some(toast) = state.find_mut(id) else {
        return;
    };
    toast.generation = generation;
    trace!(toast_id = %id, generation, budget_ms = budget.as_millis(), "dismiss check armed");

    let task = shared
        .runtime
        .spawn(check(Arc::downgrade(shared), id.clone(), generation, deadline));
    if let Some(previous) = state.timers.insert(id.clone(), task.abort_handle()) {
        previous.abort();
    }
}

/// Retires the pending check of `id`, if any.
pub(super) fn cancel(state: &mut State, id: &ToastId) {
    let generation = state.next_generation();
    if let Some(toast) = state.find_mut(id) {
        toast.generation = generation;
    }
    if let Some(task) = state.timers.remove(id) {
        task.abort();
    }
}

async fn check(queue: Weak<Shared>, id: ToastId, generation: u64, deadline: Instant) {
    sleep_until(deadline).await;
    let Some(shared) = queue.upgrade() else {
        return;
    };

    {
        let mut state = shared.lock();
        let Some(toast) = state.find(&id) else {
            trace!(toast_id = %id, "dismiss check dropped; toast gone");
            return;
        };
        if toast.generation != generation || toast.is_paused || toast.is_exiting {
            trace!(toast_id = %id, generation, "dismiss check dropped; stale");
            return;
        }
        let left = toast.time_left(Instant::now());
        state.timers.remove(&id);
        if !left.is_zero() {
            arm(&shared, &mut state, &id, left);
            return;
        }
        // Exit under the same lock as the expiry test.
        shared.begin_exit(&mut state, &id);
    }

    trace!(toast_id = %id, "toast budget exhausted");
    schedule_removal(&shared, vec![id]);
}

/// Removes `ids` once the exit grace period is over.
pub(super) fn schedule_removal(shared: &Arc<Shared>, ids: Vec<ToastId>) {
    let queue = Arc::downgrade(shared);
    shared.runtime.spawn(async move {
        sleep(EXIT_GRACE).await;
        if let Some(shared) = queue.upgrade() {
            ToastQueue::from_shared(shared).finish_exit(&ids);
        }
    });
}
