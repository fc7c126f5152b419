mod blockchain;
mod decoder;
mod repository;
mod sync;

pub use blockchain::*;
pub use decoder::*;
pub use repository::*;
pub use sync::*;
