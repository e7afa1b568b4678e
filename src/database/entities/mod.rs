pub mod blogs;
pub mod users;

pub use blogs::Entity as Blogs;
pub use users::Entity as Users;

// Type aliases
pub type UserRecord = users::Model;
pub type BlogEntry = blogs::Model;
