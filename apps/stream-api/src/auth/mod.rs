pub mod identity;
pub mod middleware;
