pub use super::communities::Entity as Communities;
pub use super::members::Entity as Members;
pub use super::roles::Entity as Roles;
pub use super::users::Entity as Users;
