// src/lib.rs

//! sintautils: author data retrieval from the SINTA portal.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod storage;
pub mod utils;
