pub mod lifecycle;
pub mod scheduler;
pub mod standings;

pub use lifecycle::*;
pub use scheduler::*;
pub use standings::*;
