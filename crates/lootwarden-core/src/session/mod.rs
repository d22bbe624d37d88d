//! Session state: the active loot window, processed items, and no-drop waits.

pub mod tracker;
pub mod wait;

pub use self::tracker::{ProcessedRecord, Session, SessionPhase, SessionTracker};
pub use self::wait::{NoDropWaitTimer, WaitingItem};
