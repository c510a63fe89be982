//! Service layer for sintautils.
//!
//! This module contains the retrieval logic:
//! - Portal login and session renewal (`SessionManager`)
//! - Author identifier normalization (`normalize`)
//! - Batch fan-out over authors and fields (`Aggregator`)

mod aggregator;
mod normalizer;
mod session;

pub use aggregator::Aggregator;
pub use normalizer::{non_numeric, normalize};
pub use session::{Session, SessionManager, SessionProvider};
