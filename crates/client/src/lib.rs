//! Front end of the essay editor: API client, local store, key bindings and
//! terminal rendering.

pub mod http;
pub mod keymap;
pub mod local;
pub mod store;
pub mod tui;

pub use http::{ApiClient, ClientError};
pub use local::LocalClient;
pub use store::FileStore;
