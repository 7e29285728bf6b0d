mod blockchain;
mod repository;
mod sink;
mod task;

pub use blockchain::*;
pub use repository::*;
pub use sink::*;
pub use task::*;
