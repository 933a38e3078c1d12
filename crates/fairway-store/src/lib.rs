//! Session repository for Fairway.
//!
//! The game core persists lobby and score state through the [`Store`]
//! trait and never assumes a specific storage technology. This crate
//! provides the trait, the record shapes, and [`MemStore`], the
//! in-memory implementation used in development and tests.
//!
//! ```text
//! Session state machine (above)  ← mirrors records into live sessions
//!     ↕
//! Repository (this crate)        ← one atomic write per call
//! ```

mod error;
mod memory;
mod records;
mod store;

pub use error::StoreError;
pub use memory::MemStore;
pub use records::{GameRecord, PlayerRecord, UserRecord};
pub use store::Store;
