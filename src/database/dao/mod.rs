pub mod blogs;
pub mod users;

pub use blogs::{BlogChanges, BlogsDao, NewBlog};
pub use users::UsersDao;
