//! Session equality and hashing.
//!
//! Everything a session will do with future input is decided by two
//! things: its [`State`] and the decoded bytes of the field in flight.
//! Equality and hashing look at exactly that pair, so sessions compare
//! equal regardless of what they already delivered, how much input they
//! consumed, or which sink strategy they use:
//!
//! ```
//! use sacsv_core::{handler_fn, Control, Event, Fingerprint, InPlaceParser, Parser};
//!
//! let mut handler = handler_fn(|_: Event<'_>| Control::KeepGoing);
//!
//! let mut a = Parser::new();
//! let _ = a.parse(&mut handler, b"\"B").unwrap();
//!
//! let mut buf = b"A,\"B".to_vec();
//! let mut b = InPlaceParser::new(&mut buf);
//! let _ = b.parse(&mut handler).unwrap();
//!
//! assert!(a == b);
//! assert_eq!(a.fingerprint(), b.fingerprint());
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::in_place::InPlaceParser;
use crate::machine::State;
use crate::parser::Parser;
use crate::storage::Storage;

/// Observable session identity: state plus pending field bytes.
pub trait Fingerprint {
    /// Current state of the machine.
    fn state(&self) -> State;

    /// Decoded bytes of the field in flight.
    fn pending(&self) -> &[u8];

    /// Whether `other` will behave exactly like `self` on any future input.
    fn same_session<F: Fingerprint + ?Sized>(&self, other: &F) -> bool {
        self.state() == other.state() && self.pending() == other.pending()
    }

    /// Deterministic hash of the session identity.
    ///
    /// Agrees with [`same_session`](Self::same_session): equal sessions
    /// produce equal fingerprints. Stable within a build of this crate.
    fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hash_session(self.state(), self.pending(), &mut hasher);
        hasher.finish()
    }
}

#[inline]
fn hash_session<H: Hasher>(state: State, pending: &[u8], hasher: &mut H) {
    state.hash(hasher);
    pending.hash(hasher);
}

impl<S: Storage> Fingerprint for Parser<S> {
    #[inline]
    fn state(&self) -> State {
        Parser::state(self)
    }

    #[inline]
    fn pending(&self) -> &[u8] {
        Parser::pending(self)
    }
}

impl Fingerprint for InPlaceParser<'_> {
    #[inline]
    fn state(&self) -> State {
        InPlaceParser::state(self)
    }

    #[inline]
    fn pending(&self) -> &[u8] {
        InPlaceParser::pending(self)
    }
}

impl<S: Storage, T: Storage> PartialEq<Parser<T>> for Parser<S> {
    fn eq(&self, other: &Parser<T>) -> bool {
        self.same_session(other)
    }
}

impl<S: Storage> Eq for Parser<S> {}

impl<S: Storage> Hash for Parser<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_session(Parser::state(self), Parser::pending(self), state);
    }
}

impl<'b> PartialEq<InPlaceParser<'b>> for InPlaceParser<'_> {
    fn eq(&self, other: &InPlaceParser<'b>) -> bool {
        self.same_session(other)
    }
}

impl Eq for InPlaceParser<'_> {}

impl Hash for InPlaceParser<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_session(InPlaceParser::state(self), InPlaceParser::pending(self), state);
    }
}

impl<'b, S: Storage> PartialEq<InPlaceParser<'b>> for Parser<S> {
    fn eq(&self, other: &InPlaceParser<'b>) -> bool {
        self.same_session(other)
    }
}

impl<S: Storage> PartialEq<Parser<S>> for InPlaceParser<'_> {
    fn eq(&self, other: &Parser<S>) -> bool {
        self.same_session(other)
    }
}
