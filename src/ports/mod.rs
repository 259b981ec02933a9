//! Ports (trait boundaries) between the match loop and its collaborators.
//!
//! Strategies plug in through [`Learner`]; reporting plugs in through
//! [`Observer`].

pub mod learner;
pub mod observer;

pub use learner::Learner;
pub use observer::Observer;
