pub mod autoplay;
pub mod bonus;
pub mod cancel;
pub mod context;
pub mod events;
pub mod layout;
pub mod phase;
pub mod round;
pub mod rules;
pub mod snapshot;
