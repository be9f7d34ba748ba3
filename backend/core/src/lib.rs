pub mod error;
pub mod params;
pub mod tools;
pub mod traits;
pub mod types;

pub use error::{KvError, ToolError};
pub use params::{CompressionParameters, ValidatedParameters};
pub use tools::ToolRegistry;
pub use traits::{Tool, ToolDefinition};
pub use types::{Cache, Token};
