//! Typed records shared by the database and HTTP layers.

pub mod log;
