//! Handles Command Line Interface (CLI) related functionalities.
//!
//! Includes the concrete options of the `bo` binary and the interactive menu
//! used when no option is given.

mod handlers;
mod menu;

pub use handlers::*;
pub use menu::*;
