//! Store operations. Each takes the open connection and the caller's session
//! and checks the session's capability before touching any table.

pub mod accounts;
pub mod attendance;
pub mod registry;
