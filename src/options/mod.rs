//! The option-handler abstraction.
//!
//! - `definition`: validated flag metadata.
//! - `handler`: the `OptionHandler` capability trait.
//! - `registry`: collects handlers and dispatches a command line to them.

mod definition;
mod handler;
mod registry;

pub use definition::OptionDefinition;
pub use handler::OptionHandler;
pub use registry::{build_command, values_of, OptionRegistry};
