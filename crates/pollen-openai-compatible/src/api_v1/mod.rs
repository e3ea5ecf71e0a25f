mod chat_completion;
mod chat_completion_stream;
mod common;
mod tools;

pub use chat_completion::*;
pub use chat_completion_stream::*;
pub use common::Usage;
pub use tools::*;
