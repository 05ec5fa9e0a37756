// actions-sdk: Foundation layer for the GitHub Actions toolkit.
// This crate has ZERO dependencies on other workspace crates and provides
// the environment, output and string primitives the toolkit is built on.

pub mod environment;
pub mod output;
pub mod path_util;
pub mod string_util;

// Re-export commonly used items at crate root
pub use environment::{Environment, MemoryEnvironment, ProcessEnvironment};
pub use output::{CollectingWriter, NullWriter, OutputWriter, StdoutWriter};
pub use path_util::{PathUtil, PATH_SEPARATOR, PATH_VARIABLE};
pub use string_util::{StringUtil, LINE_ENDING};
