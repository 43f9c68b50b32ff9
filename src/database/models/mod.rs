pub mod todo;
pub mod user;

pub use todo::{Todo, TodoView};
pub use user::{NewUser, User, UserSummary};
