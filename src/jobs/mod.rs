pub mod handler;
pub mod handlers;
pub mod registry;
pub mod scheduler;

pub use handler::*;
pub use handlers::*;
pub use registry::*;
pub use scheduler::*;
