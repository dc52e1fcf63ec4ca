//! Cooperative message pump.
//!
//! Two logical execution contexts share one OS thread: the **main context** runs the
//! application's frame, the **message context** drains the OS message queue. Control
//! moves between them only by explicit handoff:
//!
//!   1. `Device::pull` (main) calls [`MessagePump::resume`], handing control to the
//!      message context.
//!   2. The message context takes queued messages one at a time, dispatching each to
//!      the [`MessageHandler`] synchronously, and hands control back once the queue
//!      is empty.
//!   3. When the OS enters a modal loop (interactive resize, menu tracking) the pump
//!      arms a periodic timer on the [`MessageSource`]. The OS keeps dispatching from
//!      inside its own loop, and every timer tick hands control back to the main
//!      context mid-drain. Messages still queued stay where they are; the next
//!      `resume` continues from the same point, so the pump is a restartable
//!      continuation rather than a loop that must run to completion. Leaving the
//!      modal loop cancels the timer.
//!
//! `resume` borrows the pump, the source and the handler mutably for the whole
//! handoff, so the two contexts can never run at the same time and handlers cannot
//! re-enter the pump.

use std::time::Duration;

/// Interval of the forced-yield timer armed while the OS runs a modal loop.
pub const FORCED_YIELD_INTERVAL: Duration = Duration::from_millis(1);

/// Relative mouse input from the raw input device.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawMouse {
    pub dx: i32,
    pub dy: i32,
    /// `Some(down)` when the event carried a transition for the button.
    pub left: Option<bool>,
    pub right: Option<bool>,
    /// Wheel movement in notches.
    pub wheel: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformMessage {
    RawMouse(RawMouse),
    /// A character typed into the window.
    Char(char),
    /// The user is resizing the window.
    Sizing,
    /// The window was destroyed; the application should stop.
    Destroy,
    EnterModalLoop,
    ExitModalLoop,
    /// Tick of the forced-yield timer.
    Timer,
}

/// OS message queue as seen by the message context.
pub trait MessageSource {
    /// Removes and returns the next queued message, `None` once the queue is empty.
    fn peek_message(&mut self) -> Option<PlatformMessage>;

    /// Starts delivering [`PlatformMessage::Timer`] every `interval`, including from
    /// inside OS modal loops.
    fn set_forced_yield_timer(&mut self, interval: Duration);

    fn kill_forced_yield_timer(&mut self);
}

/// Receives every message that is not pump-internal (modal bracketing and timer ticks).
pub trait MessageHandler {
    fn handle(&mut self, message: &PlatformMessage);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionContext {
    #[default]
    Main,
    Messages,
}

/// Why the message context handed control back to the main context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldReason {
    QueueDrained,
    /// A timer tick inside an OS modal loop; messages may still be queued.
    ForcedByModalTimer,
}

#[derive(Debug, Default)]
pub struct MessagePump {
    context: ExecutionContext,
    in_modal_loop: bool,
    forced_yields: u64,
}

impl MessagePump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands control from the main context to the message context and returns once
    /// the message context yields back.
    pub fn resume<S: MessageSource + ?Sized>(
        &mut self,
        source: &mut S,
        handler: &mut dyn MessageHandler,
    ) -> YieldReason {
        debug_assert_eq!(self.context, ExecutionContext::Main);
        self.context = ExecutionContext::Messages;
        let reason = self.drain(source, handler);
        self.context = ExecutionContext::Main;
        reason
    }

    fn drain<S: MessageSource + ?Sized>(
        &mut self,
        source: &mut S,
        handler: &mut dyn MessageHandler,
    ) -> YieldReason {
        while let Some(message) = source.peek_message() {
            match message {
                PlatformMessage::EnterModalLoop => {
                    if !self.in_modal_loop {
                        self.in_modal_loop = true;
                        source.set_forced_yield_timer(FORCED_YIELD_INTERVAL);
                        log::debug!("Entered OS modal loop, forced-yield timer armed");
                    }
                }
                PlatformMessage::ExitModalLoop => {
                    if self.in_modal_loop {
                        self.in_modal_loop = false;
                        source.kill_forced_yield_timer();
                        log::debug!(
                            "Left OS modal loop after {} forced yields",
                            self.forced_yields
                        );
                        self.forced_yields = 0;
                    }
                }
                PlatformMessage::Timer => {
                    if self.in_modal_loop {
                        self.forced_yields += 1;
                        return YieldReason::ForcedByModalTimer;
                    }
                    log::trace!("Dropping timer tick outside of a modal loop");
                }
                other => handler.handle(&other),
            }
        }
        YieldReason::QueueDrained
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    pub fn in_modal_loop(&self) -> bool {
        self.in_modal_loop
    }
}
