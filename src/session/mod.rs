mod store;

pub use store::{SessionPhase, SessionSnapshot, SessionStore};
