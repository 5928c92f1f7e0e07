pub mod community;
pub mod member;
pub mod role;
pub mod user;
