//! Session token management: persisted credential pair plus authenticated requests.

mod manager;
mod request;
mod tokens;

pub use manager::{Manager, RefreshSource, REFRESH_PATH};
pub use request::RequestOptions;
pub use tokens::Tokens;
