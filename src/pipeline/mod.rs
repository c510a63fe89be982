//! Pipeline entry points for sintautils operations.
//!
//! - `run_dump`: Fetch the selected fields for a batch of authors and export them
//! - `run_login`: Check a credential against the portal

pub mod dump;
pub mod login;

pub use dump::{DumpReport, DumpRequest, run_dump, run_dump_with};
pub use login::run_login;
