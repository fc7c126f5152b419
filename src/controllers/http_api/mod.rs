mod router;
mod state;
mod v1;

pub use router::{HttpApiConfig, HttpApiRouter};
pub use state::HttpApiState;
