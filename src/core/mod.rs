pub mod error;
pub mod extract;
pub mod id;
pub mod middleware;
pub mod pagination;
pub mod response;
