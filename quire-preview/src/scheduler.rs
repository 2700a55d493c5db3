//! Deferred execution and render coalescing
//!
//! Everything here runs on one thread. The host owns a [`TaskQueue`] that is
//! drained once per idle tick of its event loop; [`UpdateScheduler`] uses it to
//! turn any number of update requests into a single render per tick.

use log::trace;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

/// Single-threaded "run later" primitive
pub trait TaskQueue {
    /// Queue `task` to run on a later tick, never synchronously
    fn post(&self, task: Task);
}

/// FIFO task queue driven explicitly by the owner of the event loop
#[derive(Default)]
pub struct LocalTaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl LocalTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the tasks that were queued when the tick started.
    ///
    /// Tasks posted while the tick runs wait for the next tick. Returns the
    /// number of tasks executed.
    pub fn run_tick(&self) -> usize {
        let count = self.len();
        for _ in 0..count {
            // The borrow must end before the task runs, tasks may post again
            let task = self.tasks.borrow_mut().pop_front();
            if let Some(task) = task {
                task();
            }
        }
        count
    }

    /// Run ticks until the queue is empty, at most `max_ticks` of them.
    /// Returns the number of tasks executed.
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut executed = 0;
        for _ in 0..max_ticks {
            let ran = self.run_tick();
            if ran == 0 {
                break;
            }
            executed += ran;
        }
        executed
    }
}

impl TaskQueue for LocalTaskQueue {
    fn post(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

/// Coalesces render requests: at most one render is pending at any time.
pub struct UpdateScheduler {
    queue: Rc<dyn TaskQueue>,
    pending: Rc<Cell<bool>>,
    disposed: Rc<Cell<bool>>,
}

impl UpdateScheduler {
    pub fn new(queue: Rc<dyn TaskQueue>) -> Self {
        Self {
            queue,
            pending: Rc::new(Cell::new(false)),
            disposed: Rc::new(Cell::new(false)),
        }
    }

    /// Request a render on the next tick.
    ///
    /// Returns `true` if this call scheduled the render, `false` if one was
    /// already pending (or the scheduler is disposed) and `render` was dropped.
    /// The pending flag is cleared before `render` runs, so a render may
    /// request the next one.
    pub fn request_update<F>(&self, render: F) -> bool
    where
        F: FnOnce() + 'static,
    {
        if self.disposed.get() {
            return false;
        }
        if self.pending.get() {
            trace!("Update already pending, coalescing request");
            return false;
        }

        self.pending.set(true);
        let pending = Rc::clone(&self.pending);
        let disposed = Rc::clone(&self.disposed);
        self.queue.post(Box::new(move || {
            pending.set(false);
            if !disposed.get() {
                render();
            }
        }));
        true
    }

    /// A render has been scheduled but not yet executed
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Turn any scheduled render into a no-op and ignore future requests
    pub fn dispose(&self) {
        self.disposed.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Rc<LocalTaskQueue>, UpdateScheduler, Rc<Cell<usize>>) {
        let queue = Rc::new(LocalTaskQueue::new());
        let scheduler = UpdateScheduler::new(queue.clone());
        (queue, scheduler, Rc::new(Cell::new(0)))
    }

    #[test]
    fn test_post_is_deferred() {
        let queue = LocalTaskQueue::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        queue.post(Box::new(move || flag.set(true)));

        assert!(!ran.get());
        assert_eq!(queue.run_tick(), 1);
        assert!(ran.get());
    }

    #[test]
    fn test_tasks_posted_during_tick_wait() {
        let queue = Rc::new(LocalTaskQueue::new());
        let inner = queue.clone();
        queue.post(Box::new(move || inner.post(Box::new(|| {}))));

        assert_eq!(queue.run_tick(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.run_tick(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_many_requests_one_render() {
        let (queue, scheduler, renders) = setup();

        for i in 0..100 {
            let renders = renders.clone();
            let scheduled = scheduler.request_update(move || renders.set(renders.get() + 1));
            assert_eq!(scheduled, i == 0);
        }
        assert!(scheduler.is_pending());

        queue.run_tick();
        assert_eq!(renders.get(), 1);
        assert!(!scheduler.is_pending());

        queue.run_tick();
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn test_requests_after_render_schedule_again() {
        let (queue, scheduler, renders) = setup();

        let r = renders.clone();
        scheduler.request_update(move || r.set(r.get() + 1));
        queue.run_tick();

        let r = renders.clone();
        assert!(scheduler.request_update(move || r.set(r.get() + 1)));
        queue.run_tick();
        assert_eq!(renders.get(), 2);
    }

    #[test]
    fn test_render_may_request_next_render() {
        let queue = Rc::new(LocalTaskQueue::new());
        let scheduler = Rc::new(UpdateScheduler::new(queue.clone()));
        let renders = Rc::new(Cell::new(0));

        let inner_scheduler = scheduler.clone();
        let inner_renders = renders.clone();
        scheduler.request_update(move || {
            inner_renders.set(inner_renders.get() + 1);
            let again = inner_renders.clone();
            // Flag is already cleared, so this schedules a second render
            assert!(inner_scheduler.request_update(move || again.set(again.get() + 1)));
        });

        queue.run_tick();
        assert_eq!(renders.get(), 1);
        assert!(scheduler.is_pending());

        queue.run_tick();
        assert_eq!(renders.get(), 2);
    }

    #[test]
    fn test_disposed_before_tick_is_noop() {
        let (queue, scheduler, renders) = setup();

        let r = renders.clone();
        scheduler.request_update(move || r.set(r.get() + 1));
        scheduler.dispose();
        queue.run_tick();

        assert_eq!(renders.get(), 0);
        assert!(!scheduler.request_update(|| {}));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_run_until_idle_bounded() {
        let queue = Rc::new(LocalTaskQueue::new());
        queue.post(Box::new(|| {}));
        queue.post(Box::new(|| {}));
        assert_eq!(queue.run_until_idle(10), 2);
        assert_eq!(queue.run_until_idle(10), 0);
    }
}
