//! Browser-independent UI controllers.
//!
//! Everything here is plain data and transitions so the page logic runs and
//! tests natively; `frontend` only wires these into the DOM.

pub mod anim;
pub mod contact;
pub mod projects;
pub mod scroll;
pub mod state;
pub mod store;
pub mod viewport;

pub use state::{CookieNotice, Effect, Theme, Transition, UiState};
pub use store::{KeyValueStore, MemoryStore};
