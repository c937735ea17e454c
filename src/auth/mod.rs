pub mod blacklist;
pub mod handler;
pub mod jwt;
pub mod model;
pub mod service;
