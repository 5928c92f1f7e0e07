pub mod prelude;

pub mod communities;
pub mod members;
pub mod roles;
pub mod users;
