pub mod accounts;
pub mod attendance;
pub mod classes;
pub mod core;
pub mod courses;
pub mod session;
