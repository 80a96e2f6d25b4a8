//! The [`Binding`] future and its settle/cancel plumbing.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Cancel hook returned by a start function.
///
/// Invoked at most once, and only while the binding is still pending.
pub type Cancel = Box<dyn FnOnce()>;

/// Shared state between a [`Binding`] and its [`Settle`] handles.
enum State<T> {
    /// No terminal event yet; the waker belongs to the most recent poll.
    Pending { waker: Option<Waker> },
    /// Settled; the value is taken by the first poll that observes it.
    Settled(Option<T>),
    /// Cancelled; late settle attempts are ignored.
    Cancelled,
}

/// The at-most-once settle callback handed to a start function.
///
/// Cloning is cheap (a shared pointer); all clones refer to the same
/// pending computation. Only the first [`resolve`](Self::resolve) has any
/// effect, and none do after cancellation.
pub struct Settle<T> {
    state: Rc<RefCell<State<T>>>,
}

impl<T> Clone for Settle<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> Settle<T> {
    /// Deliver the computation's value and wake the awaiting task.
    ///
    /// Ignored if the binding has already settled or been cancelled.
    pub fn resolve(&self, value: T) {
        let mut state = self.state.borrow_mut();
        let waker = match &mut *state {
            State::Pending { waker } => waker.take(),
            _ => return,
        };
        *state = State::Settled(Some(value));
        drop(state);
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// A cancellable unit of deferred work that settles at most once.
///
/// Built from a start function that registers whatever native listeners the
/// operation needs and returns control immediately; the result arrives later
/// through the host event loop via the [`Settle`] handle. Dropping a pending
/// binding runs the cancel hook (if the start function produced one), after
/// which no settle event can reach the awaiting task.
pub struct Binding<T> {
    state: Rc<RefCell<State<T>>>,
    cancel: Option<Cancel>,
}

impl<T> Binding<T> {
    /// Build a binding from a callback-registering start function.
    ///
    /// `start` runs immediately, before `new` returns: the operation is in
    /// flight as soon as the binding exists, it is only the settlement that
    /// is deferred. The returned hook, if any, is invoked at most once, when
    /// the binding is cancelled or dropped while still pending.
    pub fn new<F>(start: F) -> Self
    where
        F: FnOnce(Settle<T>) -> Option<Cancel>,
    {
        let state = Rc::new(RefCell::new(State::Pending { waker: None }));
        let cancel = start(Settle {
            state: Rc::clone(&state),
        });
        Self { state, cancel }
    }

    /// A binding that is already settled with `value`.
    pub fn ready(value: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Settled(Some(value)))),
            cancel: None,
        }
    }

    /// Cancel the computation explicitly.
    ///
    /// Equivalent to dropping the binding: the cancel hook runs if the
    /// binding is still pending, and no settle event is observed afterwards.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the computation has settled (its value may not be taken yet).
    pub fn is_settled(&self) -> bool {
        matches!(*self.state.borrow(), State::Settled(_))
    }

    fn abort(&mut self) {
        {
            let mut state = self.state.borrow_mut();
            match *state {
                // Marked before the hook runs so a settle attempt from
                // inside the hook is ignored.
                State::Pending { .. } => *state = State::Cancelled,
                _ => return,
            }
        }
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl<T> Future for Binding<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut state = this.state.borrow_mut();
        match &mut *state {
            State::Settled(value) => Poll::Ready(
                value
                    .take()
                    .expect("binding polled again after completion"),
            ),
            State::Pending { waker } => {
                match waker {
                    Some(existing) if existing.will_wake(cx.waker()) => {}
                    _ => *waker = Some(cx.waker().clone()),
                }
                Poll::Pending
            }
            // A cancelled binding never settles; awaiting it is unbounded.
            State::Cancelled => Poll::Pending,
        }
    }
}

impl<T> Drop for Binding<T> {
    fn drop(&mut self) {
        self.abort();
    }
}
