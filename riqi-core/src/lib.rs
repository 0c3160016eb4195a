pub mod config;
pub mod date_rules;
pub mod dates;
pub mod error;
pub mod keywords;
pub mod numerals;
pub mod offset;
pub mod parse_input;
pub mod parsed_input;
pub mod priority;
pub mod render;
pub mod store;
pub mod time_rules;
pub mod title;
pub mod todo;

pub use config::Config;
pub use error::{ParseError, StoreError};
pub use parse_input::{Parser, parse};
pub use parsed_input::{ParseInput, ParseResult, Span};
pub use priority::Priority;
pub use store::{InMemoryTaskStore, Task, TaskPatch, TaskStore};
pub use todo::TodoDraft;
