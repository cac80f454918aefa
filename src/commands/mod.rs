pub mod config;
pub mod name;
pub mod push;
pub mod validate;
