//! Strongly typed identifier wrappers.
//!
//! Ids are handed out by the host harness; the reactor adapter only echoes
//! them back (a bid names the request it answers, a response names its trade).

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// The id after `self`; used by hosts that allocate ids sequentially.
            #[inline]
            pub fn next(self) -> $name {
                $name(self.0 + 1)
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// A participant in the host simulation (the reactor, a source, a sink).
    pub struct AgentId(u32);
}

typed_id! {
    /// One material request posted during a step's negotiation phase.
    pub struct RequestId(u64);
}

typed_id! {
    /// One matched trade produced by the host's resolution phase.
    pub struct TradeId(u64);
}
