//! PIN-based profile access control for the wallboard kiosk.
//!
//! A profile may carry a 4-6 digit PIN. Wrong guesses are counted and a
//! profile that reaches the attempt limit is locked for a fixed time. An
//! admin can overwrite any profile's PIN, which also lifts a lockout.
//!
//! - [`PinGuard`] - the state machine: verify, set, remove, reset, status
//! - [`PinHasher`] / [`Argon2PinHasher`] - salted slow hashing
//! - [`PinApi`] - JSON request handlers with HTTP-style status codes
//! - [`GuardConfig`] - attempt limit, lockout length, store bounds
//!
//! The guard fails closed: a missing profile, a store error or a timeout
//! never grants access.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod hashing;

pub use api::{ApiResponse, PinApi, RemovePinRequest, ResetPinRequest, SetPinRequest, VerifyPinRequest};
pub use config::GuardConfig;
pub use error::{GuardError, GuardResult};
pub use guard::{PinGuard, PinStatus, VerifyOutcome};
pub use hashing::{Argon2PinHasher, PinHasher};
