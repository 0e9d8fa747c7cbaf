//! LifeDash Tools module
//!
//! Operation layer behind the MCP tools. Each function takes the database
//! handle and returns a serializable response or an error message.

pub mod academic;
pub mod dashboard;
pub mod productivity;
pub mod status;
pub mod vitality;
