pub mod pin_audit;
pub mod profile;

pub use pin_audit::{PinAuditEntry, PinEvent};
pub use profile::{PinState, Profile};
