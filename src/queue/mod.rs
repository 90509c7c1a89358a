//! The toast queue: single owner of the live toasts and their display config.
//!
//! Every mutation takes one short lock, applies the change and releases it
//! before user callbacks run, so callbacks may call back into the queue.
//! Timers live in [`scheduler`].

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_channel::Receiver;
use lru::LruCache;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::{Defaults, QueueConfig, Settings};
use crate::render::render_order;
use crate::resolver::{effective_mode, resolve};
use crate::toast::{Callback, Toast, ToastId, ToastPatch, ToastRequest};
use crate::types::{Position, Variant};

mod events;
mod scheduler;

pub use events::QueueEvent;
use events::EventSink;

/// Delay between a toast starting to exit and its removal.
pub const EXIT_GRACE: Duration = Duration::from_millis(200);

/// Handle to a toast queue. Clones share the same queue.
#[derive(Clone)]
pub struct ToastQueue {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<State>,
    events: EventSink,
    runtime: Handle,
}

struct State {
    /// Insertion order, oldest first.
    toasts: VecDeque<Toast>,
    config: QueueConfig,
    defaults: Defaults,
    /// Recently removed ids, refused by `enqueue` until they age out.
    tombstones: LruCache<ToastId, ()>,
    timers: HashMap<ToastId, AbortHandle>,
    generation: u64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `id` exiting and stops its countdown. The caller schedules the
    /// removal once the lock is released. Returns `false` for unknown or
    /// already exiting toasts.
    fn begin_exit(&self, state: &mut State, id: &ToastId) -> bool {
        let Some(toast) = state.find_mut(id) else {
            return false;
        };
        if toast.is_exiting {
            return false;
        }
        toast.is_exiting = true;
        scheduler::cancel(state, id);
        self.events.emit(QueueEvent::Exiting { id: id.clone() });
        true
    }
}

impl State {
    fn find(&self, id: &ToastId) -> Option<&Toast> {
        self.toasts.iter().find(|toast| &toast.id == id)
    }

    fn find_mut(&mut self, id: &ToastId) -> Option<&mut Toast> {
        self.toasts.iter_mut().find(|toast| &toast.id == id)
    }

    fn is_known(&self, id: &ToastId) -> bool {
        self.find(id).is_some() || self.tombstones.contains(id)
    }

    fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    fn retire(&mut self, id: &ToastId) {
        if let Some(task) = self.timers.remove(id) {
            task.abort();
        }
        self.tombstones.put(id.clone(), ());
    }
}

/// User callbacks collected under the lock and run after it is released.
#[derive(Default)]
struct Fired(Vec<(Callback, Toast)>);

impl Fired {
    fn push(&mut self, callback: Option<&Callback>, toast: &Toast) {
        if let Some(callback) = callback {
            self.0.push((callback.clone(), toast.clone()));
        }
    }

    fn run(self) {
        for (callback, toast) in self.0 {
            callback.call(&toast);
        }
    }
}

impl ToastQueue {
    /// Builds a queue bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Runtime`] when called outside a runtime.
    pub fn new(settings: &Settings) -> Result<Self> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_runtime(settings, runtime))
    }

    /// Builds a queue whose timers run on `runtime`.
    pub fn with_runtime(settings: &Settings, runtime: Handle) -> Self {
        let state = State {
            toasts: VecDeque::with_capacity(settings.queue.max_visible.get() + 1),
            config: settings.queue,
            defaults: settings.defaults,
            tombstones: LruCache::new(settings.tombstones),
            timers: HashMap::new(),
            generation: 0,
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                events: EventSink::new(settings.event_buffer),
                runtime,
            }),
        }
    }

    fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Adds a toast at the tail, evicting the oldest ones past `max_visible`.
    ///
    /// Evicted toasts are removed at once, without an exit phase, and their
    /// dismiss callback fires before the new toast's show callback. A request
    /// reusing a live or recently removed id is ignored.
    pub fn enqueue(&self, request: impl Into<ToastRequest>) -> ToastId {
        let now = Instant::now();
        let mut fired = Fired::default();
        let id = {
            let mut state = self.shared.lock();
            let toast = resolve(request.into(), &state.defaults, now);
            let id = toast.id.clone();
            if state.is_known(&id) {
                warn!(toast_id = %id, "toast id already in use; request ignored");
                return id;
            }

            debug!(
                toast_id = %id,
                variant = %toast.variant,
                dismiss_mode = %toast.dismiss_mode,
                duration_ms = toast.duration.as_millis(),
                "toast enqueued"
            );
            let budget = toast.auto_dismisses().then_some(toast.remaining);
            state.toasts.push_back(toast);

            while state.toasts.len() > state.config.max_visible.get() {
                let Some(evicted) = state.toasts.pop_front() else {
                    break;
                };
                info!(
                    toast_id = %evicted.id,
                    max_visible = state.config.max_visible.get(),
                    "queue full; evicting oldest toast"
                );
                state.retire(&evicted.id);
                self.shared.events.emit(QueueEvent::Removed {
                    id: evicted.id.clone(),
                    evicted: true,
                });
                fired.push(evicted.on_dismiss.as_ref(), &evicted);
            }

            self.shared.events.emit(QueueEvent::Shown { id: id.clone() });
            if let Some(toast) = state.find(&id) {
                fired.push(toast.on_show.as_ref(), toast);
            }
            if let Some(budget) = budget {
                scheduler::arm(&self.shared, &mut state, &id, budget);
            }
            id
        };
        fired.run();
        id
    }

    fn enqueue_variant(&self, request: impl Into<ToastRequest>, variant: Variant) -> ToastId {
        self.enqueue(request.into().variant(variant))
    }

    pub fn message(&self, request: impl Into<ToastRequest>) -> ToastId {
        self.enqueue_variant(request, Variant::Default)
    }

    pub fn success(&self, request: impl Into<ToastRequest>) -> ToastId {
        self.enqueue_variant(request, Variant::Success)
    }

    pub fn error(&self, request: impl Into<ToastRequest>) -> ToastId {
        self.enqueue_variant(request, Variant::Error)
    }

    pub fn warning(&self, request: impl Into<ToastRequest>) -> ToastId {
        self.enqueue_variant(request, Variant::Warning)
    }

    pub fn info(&self, request: impl Into<ToastRequest>) -> ToastId {
        self.enqueue_variant(request, Variant::Info)
    }

    /// Starts the exit phase. The toast is removed, and its dismiss callback
    /// fired, [`EXIT_GRACE`] later.
    ///
    /// Returns `false` for unknown or already exiting toasts.
    pub fn dismiss(&self, id: &ToastId) -> bool {
        {
            let mut state = self.shared.lock();
            if !self.shared.begin_exit(&mut state, id) {
                debug!(toast_id = %id, "dismiss ignored; unknown or exiting toast");
                return false;
            }
        }
        debug!(toast_id = %id, "toast exiting");
        scheduler::schedule_removal(&self.shared, vec![id.clone()]);
        true
    }

    /// Starts the exit phase of every toast present now. After the grace
    /// period all of them are removed in insertion order; toasts enqueued in
    /// between are left alone.
    ///
    /// Returns how many toasts started exiting.
    pub fn dismiss_all(&self) -> usize {
        let (ids, started) = {
            let mut state = self.shared.lock();
            let ids: Vec<ToastId> = state.toasts.iter().map(|t| t.id.clone()).collect();
            let started = ids
                .iter()
                .filter(|id| self.shared.begin_exit(&mut state, id))
                .count();
            (ids, started)
        };
        if ids.is_empty() {
            return 0;
        }
        debug!(count = ids.len(), "dismissing all toasts");
        scheduler::schedule_removal(&self.shared, ids);
        started
    }

    /// Freezes the countdown. No-op for unknown, paused or exiting toasts.
    pub fn pause(&self, id: &ToastId) -> bool {
        let now = Instant::now();
        let mut state = self.shared.lock();
        let Some(toast) = state.find_mut(id) else {
            return false;
        };
        if toast.is_paused || toast.is_exiting {
            return false;
        }
        toast.pause(now);
        let remaining = toast.remaining;
        scheduler::cancel(&mut state, id);
        debug!(toast_id = %id, remaining_ms = remaining.as_millis(), "toast paused");
        self.shared.events.emit(QueueEvent::Paused { id: id.clone() });
        true
    }

    /// Restarts the countdown from the budget stored at pause time.
    /// No-op for unknown, running or exiting toasts.
    pub fn resume(&self, id: &ToastId) -> bool {
        let now = Instant::now();
        let expired = {
            let mut state = self.shared.lock();
            let Some(toast) = state.find_mut(id) else {
                return false;
            };
            if !toast.is_paused || toast.is_exiting {
                return false;
            }
            toast.resume(now);
            let remaining = toast.remaining;
            let auto = toast.auto_dismisses();
            debug!(toast_id = %id, remaining_ms = remaining.as_millis(), "toast resumed");
            self.shared.events.emit(QueueEvent::Resumed { id: id.clone() });
            if auto && !remaining.is_zero() {
                scheduler::arm(&self.shared, &mut state, id, remaining);
            }
            auto && remaining.is_zero()
        };
        if expired {
            self.dismiss(id);
        }
        true
    }

    /// Overwrites the fields set in `patch`; the others keep their value.
    ///
    /// A new duration restarts the countdown from the full duration (or stops
    /// it when zero). Returns `false` for unknown toasts.
    pub fn update(&self, id: &ToastId, patch: ToastPatch) -> bool {
        let now = Instant::now();
        let mut state = self.shared.lock();
        let Some(toast) = state.find_mut(id) else {
            return false;
        };
        let duration_changed = toast.merge(patch);
        let mode = effective_mode(&toast.id, toast.dismiss_mode, toast.action.is_some());
        toast.dismiss_mode = mode;

        if duration_changed && !toast.is_exiting {
            toast.rearm(now);
            let budget = (toast.auto_dismisses() && !toast.is_paused).then_some(toast.remaining);
            match budget {
                Some(budget) => scheduler::arm(&self.shared, &mut state, id, budget),
                None => scheduler::cancel(&mut state, id),
            }
        }
        debug!(toast_id = %id, duration_changed, "toast updated");
        self.shared.events.emit(QueueEvent::Updated { id: id.clone() });
        true
    }

    /// Runs the toast's action callback, then dismisses it unless the action
    /// asks to stay open. Returns `false` when there is nothing to activate.
    pub fn activate_action(&self, id: &ToastId) -> bool {
        let (toast, action) = {
            let state = self.shared.lock();
            let Some(toast) = state.find(id) else {
                return false;
            };
            let Some(action) = toast.action.clone() else {
                return false;
            };
            if toast.is_exiting {
                return false;
            }
            (toast.clone(), action)
        };
        debug!(toast_id = %id, label = %action.label, "toast action activated");
        if let Some(on_click) = &action.on_click {
            on_click.call(&toast);
        }
        if action.dismiss_on_click {
            self.dismiss(id);
        }
        true
    }

    pub fn set_position(&self, position: Position) {
        let mut state = self.shared.lock();
        state.config.position = position;
        info!(%position, "toast position changed");
        self.shared.events.emit(QueueEvent::ConfigChanged);
    }

    /// Changes the capacity for future enqueues. Toasts already queued past
    /// the new limit stay until the next enqueue.
    pub fn set_max_visible(&self, max_visible: NonZeroUsize) {
        let mut state = self.shared.lock();
        state.config.max_visible = max_visible;
        info!(max_visible = max_visible.get(), "toast capacity changed");
        self.shared.events.emit(QueueEvent::ConfigChanged);
    }

    pub fn config(&self) -> QueueConfig {
        self.shared.lock().config
    }

    /// Live toasts, oldest first.
    pub fn snapshot(&self) -> Vec<Toast> {
        self.shared.lock().toasts.iter().cloned().collect()
    }

    /// Live toasts in the order a renderer should stack them.
    pub fn render_order(&self) -> Vec<Toast> {
        let state = self.shared.lock();
        let toasts = state.toasts.iter().cloned().collect::<Vec<_>>();
        render_order(&toasts, state.config.position).cloned().collect()
    }

    pub fn get(&self, id: &ToastId) -> Option<Toast> {
        self.shared.lock().find(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle events. Events are only buffered once this has been called.
    pub fn events(&self) -> Receiver<QueueEvent> {
        self.shared.events.subscribe()
    }

    /// Removes the listed toasts still present and fires their callbacks.
    fn finish_exit(&self, ids: &[ToastId]) {
        let mut fired = Fired::default();
        {
            let mut state = self.shared.lock();
            let (gone, kept): (VecDeque<Toast>, VecDeque<Toast>) =
                std::mem::take(&mut state.toasts)
                    .into_iter()
                    .partition(|toast| ids.contains(&toast.id));
            state.toasts = kept;
            for toast in &gone {
                state.retire(&toast.id);
                debug!(toast_id = %toast.id, "toast removed");
                self.shared.events.emit(QueueEvent::Removed {
                    id: toast.id.clone(),
                    evicted: false,
                });
                fired.push(toast.on_dismiss.as_ref(), toast);
            }
        }
        fired.run();
    }
}

impl fmt::Debug for ToastQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ToastQueue")
            .field("config", &state.config)
            .field("len", &state.toasts.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::Fired;
    use crate::config::Defaults;
    use crate::resolver::resolve;
    use crate::toast::{Callback, ToastRequest};
    use tokio::time::Instant;

    #[test]
    fn fired_callbacks_run_in_push_order_after_collection() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = |seen: &Arc<Mutex<Vec<String>>>| {
            let seen = Arc::clone(seen);
            Callback::new(move |toast| seen.lock().unwrap().push(toast.message.clone()))
        };
        let first = resolve(ToastRequest::new("first"), &Defaults::default(), Instant::now());
        let second = resolve(ToastRequest::new("second"), &Defaults::default(), Instant::now());

        let mut fired = Fired::default();
        fired.push(Some(&record(&seen)), &first);
        fired.push(None, &first);
        fired.push(Some(&record(&seen)), &second);
        assert!(seen.lock().unwrap().is_empty());

        fired.run();
        assert_eq!(*seen.lock().unwrap(), ["first", "second"]);
    }
}
