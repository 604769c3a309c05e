// SPDX-License-Identifier: MIT
//
// Scroll animator — one background thread per pane turning scroll requests
// into frame-by-frame deltas.
//
// Requests travel over a single-slot channel to the pane's coordinator
// thread. While an animation runs, the thread waits for the next request
// with `recv_timeout(tick)`: a timeout means "emit the next frame", a
// message means "a newer request arrived". That is the same hybrid
// event/tick model the terminal event loop uses, and it keeps cancellation
// trivially race-free: settling the old animation and starting the new one
// happen on one thread, in that order.
//
// Frames are never applied here. Each one is published to the update queue
// and applied by whoever drains it.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, trace};
use parking_lot::Mutex;

use crate::pane::PaneId;
use crate::update::{Update, UpdateQueue};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing and step counts for smooth scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatorConfig {
    /// Delay between frames.
    pub tick: Duration,
    /// Frames for a short scroll.
    pub short_steps: u32,
    /// Frames for a long scroll.
    pub long_steps: u32,
    /// A scroll is short when both |dx| and |dy| are below this many pixels.
    pub threshold: i32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(16),
            short_steps: 3,
            long_steps: 10,
            threshold: 100,
        }
    }
}

impl AnimatorConfig {
    /// Number of frames an animation of `(dx, dy)` is spread over.
    #[must_use]
    pub fn steps_for(&self, dx: i32, dy: i32) -> u32 {
        let short = dx.unsigned_abs() < self.threshold.unsigned_abs()
            && dy.unsigned_abs() < self.threshold.unsigned_abs();
        let steps = if short { self.short_steps } else { self.long_steps };
        steps.max(1)
    }
}

// ---------------------------------------------------------------------------
// Requests and plans
// ---------------------------------------------------------------------------

/// A pixel displacement to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollRequest {
    pub dx: i32,
    pub dy: i32,
}

impl ScrollRequest {
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// The frames of one animation, without any timing.
///
/// Each axis moves `ceil(|total| / steps)` pixels per frame toward its
/// total; the last frame on an axis is shortened so the sum lands exactly.
/// An axis that has arrived emits 0 while the other catches up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPlan {
    step_x: i64,
    step_y: i64,
    remaining_x: i64,
    remaining_y: i64,
}

impl ScrollPlan {
    #[must_use]
    pub fn new(request: ScrollRequest, config: &AnimatorConfig) -> Self {
        let steps = i64::from(config.steps_for(request.dx, request.dy));
        let dx = i64::from(request.dx);
        let dy = i64::from(request.dy);
        Self {
            step_x: (dx.abs() + steps - 1) / steps,
            step_y: (dy.abs() + steps - 1) / steps,
            remaining_x: dx,
            remaining_y: dy,
        }
    }

    /// True once both axes have emitted their full distance.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.remaining_x == 0 && self.remaining_y == 0
    }

    /// Distance not yet emitted.
    #[must_use]
    pub fn remaining(&self) -> (i32, i32) {
        (narrow(self.remaining_x), narrow(self.remaining_y))
    }

    /// The next frame's delta, `None` once done.
    pub fn next_frame(&mut self) -> Option<(i32, i32)> {
        if self.is_done() {
            return None;
        }
        let dx = advance(&mut self.remaining_x, self.step_x);
        let dy = advance(&mut self.remaining_y, self.step_y);
        Some((narrow(dx), narrow(dy)))
    }

    /// Emit everything left as one delta.
    pub fn settle(&mut self) -> (i32, i32) {
        let rest = self.remaining();
        self.remaining_x = 0;
        self.remaining_y = 0;
        rest
    }
}

/// Take one step of at most `step` from `remaining`, keeping its sign.
fn advance(remaining: &mut i64, step: i64) -> i64 {
    let delta = remaining.signum() * step.min(remaining.abs());
    *remaining -= delta;
    delta
}

// Safe: every frame is bounded by its i32 request.
#[allow(clippy::cast_possible_truncation)]
const fn narrow(v: i64) -> i32 {
    v as i32
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Fires once a request's full displacement has been emitted, including
/// when a newer request settled it early.
///
/// A completion whose animator is gone counts as fired: nothing will ever
/// move that pane again.
#[derive(Debug)]
pub struct Completion(Receiver<()>);

impl Completion {
    /// A completion that has already fired.
    #[must_use]
    pub fn fired() -> Self {
        let (_, rx) = mpsc::sync_channel(1);
        Self(rx)
    }

    /// Block until fired.
    pub fn wait(&self) {
        let _ = self.0.recv();
    }

    /// Block until fired or `timeout` passes. Returns whether it fired.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        !matches!(self.0.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
    }

    /// Non-blocking check.
    #[must_use]
    pub fn is_done(&self) -> bool {
        !matches!(self.0.try_recv(), Err(mpsc::TryRecvError::Empty))
    }
}

// ---------------------------------------------------------------------------
// Handle and animator
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Command {
    Scroll(ScrollRequest, SyncSender<()>),
    Shutdown,
}

/// Cloneable sender for one pane's animator. Safe to use from any thread.
///
/// Every clone shares one counter of distance submitted but not yet applied
/// to the pane, so a new scroll can be computed against where the view is
/// heading rather than where it is.
#[derive(Debug, Clone)]
pub struct ScrollHandle {
    pane: PaneId,
    tx: SyncSender<Command>,
    pending: Arc<Mutex<(i64, i64)>>,
}

impl ScrollHandle {
    #[must_use]
    pub const fn pane(&self) -> PaneId {
        self.pane
    }

    /// Hand `request` to the animator. Blocks only while the single slot
    /// is occupied, which the animator drains between frames.
    pub fn submit(&self, request: ScrollRequest) -> Completion {
        let (done_tx, done_rx) = mpsc::sync_channel(1);
        self.track(i64::from(request.dx), i64::from(request.dy));
        // On failure the sender is dropped with the error, which fires the
        // completion.
        if self.tx.send(Command::Scroll(request, done_tx)).is_err() {
            debug!("scroll {request:?} for stopped pane {}", self.pane);
            self.track(-i64::from(request.dx), -i64::from(request.dy));
        }
        Completion(done_rx)
    }

    /// Distance submitted whose frames have not been applied yet.
    #[must_use]
    pub fn pending(&self) -> (i32, i32) {
        let (x, y) = *self.pending.lock();
        (clamp_i32(x), clamp_i32(y))
    }

    /// Record that a published frame has been applied to the pane.
    pub fn applied(&self, dx: i32, dy: i32) {
        self.track(-i64::from(dx), -i64::from(dy));
    }

    fn track(&self, dx: i64, dy: i64) {
        let mut pending = self.pending.lock();
        pending.0 += dx;
        pending.1 += dy;
    }
}

fn clamp_i32(v: i64) -> i32 {
    i32::try_from(v.clamp(i64::from(i32::MIN), i64::from(i32::MAX))).unwrap_or_default()
}

/// Owns a pane's coordinator thread. Stops and joins it on drop.
#[derive(Debug)]
pub struct ScrollAnimator {
    handle: ScrollHandle,
    thread: Option<JoinHandle<()>>,
}

impl ScrollAnimator {
    /// Start the coordinator thread for `pane`, publishing frames to
    /// `queue`.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread.
    #[must_use]
    pub fn spawn(pane: PaneId, queue: Arc<UpdateQueue>, config: AnimatorConfig) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        let thread = thread::Builder::new()
            .name(format!("scroll-{pane}"))
            .spawn(move || Coordinator::new(pane, queue, config).run(&rx))
            .expect("failed to spawn scroll animator thread");
        Self {
            handle: ScrollHandle {
                pane,
                tx,
                pending: Arc::new(Mutex::new((0, 0))),
            },
            thread: Some(thread),
        }
    }

    #[must_use]
    pub fn handle(&self) -> ScrollHandle {
        self.handle.clone()
    }

    pub fn submit(&self, request: ScrollRequest) -> Completion {
        self.handle.submit(request)
    }

    /// See [`ScrollHandle::pending`].
    #[must_use]
    pub fn pending(&self) -> (i32, i32) {
        self.handle.pending()
    }

    /// See [`ScrollHandle::applied`].
    pub fn applied(&self, dx: i32, dy: i32) {
        self.handle.applied(dx, dy);
    }

    /// Settle any animation in flight and join the thread.
    ///
    /// Idempotent.
    pub fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.tx.send(Command::Shutdown);
            let _ = thread.join();
        }
    }
}

impl Drop for ScrollAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Coordinator thread
// ---------------------------------------------------------------------------

struct Coordinator {
    pane: PaneId,
    queue: Arc<UpdateQueue>,
    config: AnimatorConfig,
    active: Option<(ScrollPlan, SyncSender<()>)>,
}

impl Coordinator {
    const fn new(pane: PaneId, queue: Arc<UpdateQueue>, config: AnimatorConfig) -> Self {
        Self {
            pane,
            queue,
            config,
            active: None,
        }
    }

    fn run(mut self, rx: &Receiver<Command>) {
        loop {
            let command = if self.active.is_some() {
                match rx.recv_timeout(self.config.tick) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => Some(Command::Shutdown),
                }
            } else {
                Some(rx.recv().unwrap_or(Command::Shutdown))
            };

            match command {
                None => self.frame(),
                Some(Command::Scroll(request, done)) => {
                    if self.active.is_some() {
                        debug!("pane {}: superseded by {request:?}", self.pane);
                    }
                    self.settle();
                    if request.is_zero() {
                        let _ = done.send(());
                    } else {
                        self.active = Some((ScrollPlan::new(request, &self.config), done));
                        self.frame();
                    }
                }
                Some(Command::Shutdown) => {
                    self.settle();
                    break;
                }
            }
        }
    }

    fn frame(&mut self) {
        let Some((plan, _)) = self.active.as_mut() else { return };
        if let Some((dx, dy)) = plan.next_frame() {
            trace!("pane {}: frame ({dx}, {dy})", self.pane);
            self.queue.publish(Update::Scroll { pane: self.pane, dx, dy });
        }
        if plan.is_done() {
            self.finish();
        }
    }

    /// Emit whatever the active animation has left as one frame, then
    /// finish it.
    fn settle(&mut self) {
        let Some((plan, _)) = self.active.as_mut() else { return };
        let (dx, dy) = plan.settle();
        if dx != 0 || dy != 0 {
            self.queue.publish(Update::Scroll { pane: self.pane, dx, dy });
        }
        self.finish();
    }

    fn finish(&mut self) {
        if let Some((_, done)) = self.active.take() {
            self.queue.publish(Update::Settled { pane: self.pane });
            let _ = done.send(());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const P: PaneId = PaneId::from_raw(3);
    const WAIT: Duration = Duration::from_secs(5);

    fn frames(dx: i32, dy: i32) -> Vec<(i32, i32)> {
        let mut plan = ScrollPlan::new(ScrollRequest::new(dx, dy), &AnimatorConfig::default());
        std::iter::from_fn(|| plan.next_frame()).collect()
    }

    fn fast() -> AnimatorConfig {
        AnimatorConfig {
            tick: Duration::from_millis(1),
            ..AnimatorConfig::default()
        }
    }

    /// Sum of all scroll deltas in the queue, and the number of Settled.
    fn totals(queue: &UpdateQueue) -> ((i32, i32), usize) {
        let mut sum = (0, 0);
        let mut settled = 0;
        for update in queue.drain() {
            match update {
                Update::Scroll { dx, dy, .. } => {
                    sum.0 += dx;
                    sum.1 += dy;
                }
                Update::Settled { .. } => settled += 1,
                other => panic!("unexpected {other:?}"),
            }
        }
        (sum, settled)
    }

    // ── Step count ───────────────────────────────────────────────────────

    #[test]
    fn short_scrolls_take_three_steps() {
        let c = AnimatorConfig::default();
        assert_eq!(c.steps_for(0, 99), 3);
        assert_eq!(c.steps_for(-99, 99), 3);
        assert_eq!(c.steps_for(0, 100), 10);
        assert_eq!(c.steps_for(-100, 0), 10);
    }

    // ── Plans ────────────────────────────────────────────────────────────

    #[test]
    fn short_plan_lands_exactly() {
        assert_eq!(frames(0, 60), vec![(0, 20), (0, 20), (0, 20)]);
        assert_eq!(frames(0, 10), vec![(0, 4), (0, 4), (0, 2)]);
    }

    #[test]
    fn long_plan_uses_ten_steps() {
        let f = frames(0, 400);
        assert_eq!(f.len(), 10);
        assert!(f.iter().all(|&(_, dy)| dy == 40));
    }

    #[test]
    fn negative_plan_keeps_sign() {
        assert_eq!(frames(-7, 0), vec![(-3, 0), (-3, 0), (-1, 0)]);
    }

    #[test]
    fn finished_axis_emits_zero() {
        assert_eq!(frames(3, 90), vec![(1, 30), (1, 30), (1, 30)]);
        assert_eq!(frames(1, 90), vec![(1, 30), (0, 30), (0, 30)]);
    }

    #[test]
    fn zero_plan_has_no_frames() {
        assert!(frames(0, 0).is_empty());
    }

    #[test]
    fn settle_takes_the_rest() {
        let mut plan = ScrollPlan::new(ScrollRequest::new(0, 500), &AnimatorConfig::default());
        plan.next_frame();
        assert_eq!(plan.remaining(), (0, 450));
        assert_eq!(plan.settle(), (0, 450));
        assert!(plan.is_done());
        assert_eq!(plan.next_frame(), None);
    }

    #[test]
    fn extreme_requests_do_not_overflow() {
        let f = frames(i32::MIN, i32::MAX);
        let sum = f.iter().fold((0i64, 0i64), |a, &(x, y)| (a.0 + i64::from(x), a.1 + i64::from(y)));
        assert_eq!(sum, (i64::from(i32::MIN), i64::from(i32::MAX)));
    }

    // ── Completion ───────────────────────────────────────────────────────

    #[test]
    fn fired_completion_is_done() {
        let c = Completion::fired();
        assert!(c.is_done());
        assert!(c.wait_timeout(Duration::ZERO));
        c.wait();
    }

    // ── Coordinator thread ───────────────────────────────────────────────

    #[test]
    fn animation_emits_full_distance_then_settles() {
        let queue = Arc::new(UpdateQueue::new());
        let animator = ScrollAnimator::spawn(P, Arc::clone(&queue), fast());
        assert!(animator.submit(ScrollRequest::new(30, -250)).wait_timeout(WAIT));
        assert_eq!(totals(&queue), ((30, -250), 1));
    }

    #[test]
    fn superseding_request_adds_up() {
        let queue = Arc::new(UpdateQueue::new());
        let config = AnimatorConfig {
            tick: Duration::from_millis(50),
            ..AnimatorConfig::default()
        };
        let animator = ScrollAnimator::spawn(P, Arc::clone(&queue), config);
        let first = animator.submit(ScrollRequest::new(0, 1000));
        let second = animator.submit(ScrollRequest::new(0, -300));
        // The first one fires no later than the second starts.
        assert!(first.wait_timeout(WAIT));
        assert!(second.wait_timeout(WAIT));
        let ((dx, dy), settled) = totals(&queue);
        assert_eq!((dx, dy), (0, 700));
        assert_eq!(settled, 2);
    }

    #[test]
    fn zero_request_completes_immediately() {
        let queue = Arc::new(UpdateQueue::new());
        let animator = ScrollAnimator::spawn(P, Arc::clone(&queue), fast());
        assert!(animator.submit(ScrollRequest::default()).wait_timeout(WAIT));
        assert!(queue.is_empty());
    }

    #[test]
    fn frames_are_signaled() {
        let queue = Arc::new(UpdateQueue::new());
        let animator = ScrollAnimator::spawn(P, Arc::clone(&queue), fast());
        let done = animator.submit(ScrollRequest::new(0, 20));
        assert!(queue.wait_redraw(WAIT));
        assert!(done.wait_timeout(WAIT));
    }

    #[test]
    fn stop_settles_in_flight_animation() {
        let queue = Arc::new(UpdateQueue::new());
        let config = AnimatorConfig {
            tick: Duration::from_secs(60),
            ..AnimatorConfig::default()
        };
        let mut animator = ScrollAnimator::spawn(P, Arc::clone(&queue), config);
        let done = animator.submit(ScrollRequest::new(0, 500));
        animator.stop();
        assert!(done.is_done());
        assert_eq!(totals(&queue), ((0, 500), 1));
        animator.stop();
    }

    #[test]
    fn submit_after_stop_is_already_fired() {
        let queue = Arc::new(UpdateQueue::new());
        let mut animator = ScrollAnimator::spawn(P, Arc::clone(&queue), fast());
        let handle = animator.handle();
        animator.stop();
        assert!(handle.submit(ScrollRequest::new(0, 40)).wait_timeout(WAIT));
        assert!(queue.is_empty());
    }

    #[test]
    fn handle_works_from_other_threads() {
        let queue = Arc::new(UpdateQueue::new());
        let animator = ScrollAnimator::spawn(P, Arc::clone(&queue), fast());
        let handle = animator.handle();
        assert_eq!(handle.pane(), P);
        let worker = thread::spawn(move || handle.submit(ScrollRequest::new(5, 5)).wait());
        worker.join().unwrap();
        assert_eq!(totals(&queue), ((5, 5), 1));
    }
}
