pub mod tip;
pub mod user;
