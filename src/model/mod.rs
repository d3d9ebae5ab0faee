// File: ./src/model/mod.rs
pub mod adapter;
pub mod display;
pub mod item;
pub mod mutator;
pub mod parser;
pub mod token;

pub use adapter::{IndexedTask, TaskIndexProvider};
pub use display::{TaskDisplay, serialize};
pub use item::{DateKind, Priority, Property, Task, TaskStatus};
pub use mutator::TaskEdit;
pub use parser::{ParsedLine, TaskLine, parse, parse_line};
