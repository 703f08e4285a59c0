//! Futures behind suspendable evaluation.
//!
//! Evaluation is written as async code so a glide can park the whole
//! interpreter mid-statement, nested blocks and calls included. The host
//! polls the run with a no-op waker; the only leaf that ever returns
//! `Pending` is [`GlideWait`].

use super::runtime::Monitor;
use crate::turtle::TurtleRef;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// A boxed step of evaluation that grows the native stack before polling.
///
/// Boxing breaks the recursion between statement and expression futures.
pub(crate) struct Grow<'a, T> {
    inner: Pin<Box<dyn Future<Output = T> + 'a>>,
}

impl<'a, T> Grow<'a, T> {
    pub(crate) fn new(future: impl Future<Output = T> + 'a) -> Self {
        Grow {
            inner: Box::pin(future),
        }
    }
}

impl<T> Future for Grow<'_, T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let inner = self.inner.as_mut();
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || inner.poll(cx))
    }
}

/// Pending while the turtle glides, unless the run has been killed
pub(crate) struct GlideWait {
    turtle: TurtleRef,
    monitor: Rc<RefCell<Monitor>>,
}

impl GlideWait {
    pub(crate) fn new(turtle: TurtleRef, monitor: Rc<RefCell<Monitor>>) -> Self {
        GlideWait { turtle, monitor }
    }
}

impl Future for GlideWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.monitor.borrow().kill_requested || !self.turtle.borrow().gliding() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Poll `future` once without a waker; the host decides when to poll again
pub(crate) fn poll_once<F: Future + ?Sized>(future: Pin<&mut F>) -> Poll<F::Output> {
    let mut cx = Context::from_waker(Waker::noop());
    future.poll(&mut cx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::turtle::{Sprite, Turtle};

    #[test]
    fn test_grow_passes_through_ready() {
        let mut future = Grow::new(async { 41 + 1 });
        assert_eq!(poll_once(Pin::new(&mut future)), Poll::Ready(42));
    }

    #[test]
    fn test_glide_wait_pends_until_glide_ends() {
        let config = Config {
            turtle_speed: 10.0,
            ..Config::default()
        };
        let sprite = Rc::new(RefCell::new(Sprite::new(&config)));
        let monitor = Rc::new(RefCell::new(Monitor::default()));
        sprite.borrow_mut().forward(100.0);

        let turtle: TurtleRef = sprite.clone();
        let mut wait = GlideWait::new(turtle, Rc::clone(&monitor));
        assert_eq!(poll_once(Pin::new(&mut wait)), Poll::Pending);

        sprite.borrow_mut().update(100.0);
        assert_eq!(poll_once(Pin::new(&mut wait)), Poll::Ready(()));
    }

    #[test]
    fn test_glide_wait_released_by_kill() {
        let config = Config {
            turtle_speed: 10.0,
            ..Config::default()
        };
        let sprite = Rc::new(RefCell::new(Sprite::new(&config)));
        sprite.borrow_mut().forward(100.0);
        let monitor = Rc::new(RefCell::new(Monitor::default()));

        let turtle: TurtleRef = sprite.clone();
        let mut wait = GlideWait::new(turtle, Rc::clone(&monitor));
        monitor.borrow_mut().kill_requested = true;
        assert_eq!(poll_once(Pin::new(&mut wait)), Poll::Ready(()));
    }
}
