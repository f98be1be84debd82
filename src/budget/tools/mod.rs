pub mod backup;
pub mod error;
pub mod io;
pub mod layout;
pub mod maintenance;
pub mod model;
pub mod reconcile;
pub mod resolve;

pub use error::{Result, ToolError};
