//! Core of the training-program admin console.
//!
//! - **state**: persisted user and time slot collections over a key-value backend
//! - **managers**: login sessions and admin operations on top of the store
//! - **models**: user and time slot records as stored on disk

pub mod config;
pub mod error;
pub mod managers;
pub mod models;
pub mod state;

pub use config::ConsoleConfig;
pub use error::{ConsoleError, Result};
pub use managers::{AdminManager, AuthState, SessionManager, SuspensionCheck};
pub use models::{new_record_id, TimeSlot, User};
pub use state::{FileStorage, KeyValueStorage, MemoryStorage, Store};
