//! Dialogue session state machine
//!
//! Elm architecture: a pure `transition` turns (state, event) into a new state
//! plus effects. The runtime executes the effects (timers, cancellation,
//! observer notification) and feeds timer events back in.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::{Effect, WidgetUpdate};
pub use event::Event;
pub use state::{DialogueSession, Message, Phase, Sender, SessionData, WidgetState};
pub use transition::{transition, TransitionError, TransitionResult};
