pub mod defs;
pub mod grammar;
pub mod types;
