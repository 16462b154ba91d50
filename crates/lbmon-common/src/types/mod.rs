//! Core data types shared by the walker and the usage aggregator

pub mod binding;
pub mod oid;
