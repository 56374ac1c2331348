//! Control signals returned by event handlers.
//!
//! Every handler callback answers with a signal telling the driver whether to
//! keep consuming input. A handler either returns the runtime tri-state
//! [`Control`], or one of the unit types [`KeepGoing`], [`Stop`], [`Abort`]
//! when it always answers the same way. The unit types carry their answer in
//! [`Signal::FIXED`], so the driver's check folds away at compile time:
//!
//! ```
//! use sacsv_core::signal::{Control, KeepGoing, Signal};
//!
//! assert_eq!(KeepGoing::FIXED, Some(Control::KeepGoing));
//! assert_eq!(<Control as Signal>::FIXED, None);
//! ```

/// Runtime control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Control {
    /// Continue with the next event.
    #[default]
    KeepGoing,
    /// Pause. The session can resume from the reported position.
    Stop,
    /// The handler gave up. Resumable like `Stop`; the only legal answer to
    /// a syntax error.
    Abort,
}

/// Anything a handler may return from an event callback.
pub trait Signal: Copy {
    /// The control every value of this type stands for, when it is known
    /// without looking at the value.
    const FIXED: Option<Control> = None;

    /// The control this value stands for.
    fn control(self) -> Control;
}

impl Signal for Control {
    #[inline]
    fn control(self) -> Control {
        self
    }
}

/// Handler that never interrupts the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeepGoing;

/// Handler that always pauses after the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Stop;

/// Handler that always gives up. Required return type of
/// [`Handler::error`](crate::Handler::error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Abort;

macro_rules! fixed_signal {
    ($ty:ident) => {
        impl Signal for $ty {
            const FIXED: Option<Control> = Some(Control::$ty);

            #[inline(always)]
            fn control(self) -> Control {
                Control::$ty
            }
        }

        impl From<$ty> for Control {
            #[inline]
            fn from(_: $ty) -> Control {
                Control::$ty
            }
        }
    };
}

fixed_signal!(KeepGoing);
fixed_signal!(Stop);
fixed_signal!(Abort);

/// Whether the driver should keep consuming after `signal`.
#[inline(always)]
pub(crate) fn proceeds<S: Signal>(signal: S) -> bool {
    match S::FIXED {
        Some(control) => control == Control::KeepGoing,
        None => signal.control() == Control::KeepGoing,
    }
}
