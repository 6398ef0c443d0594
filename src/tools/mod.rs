//! One handler per MCP tool. Each takes a single index snapshot and answers
//! from it.

pub mod apis;
pub mod endpoint;
pub mod reload;
pub mod search;
pub mod sections;

pub use apis::*;
pub use endpoint::*;
pub use reload::*;
pub use search::*;
pub use sections::*;
