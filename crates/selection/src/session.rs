mod context;
mod store;

pub use context::{SessionContext, SessionSearchState};
pub use store::SessionStore;
