// handlers/mod.rs - one file per route
//
// Public routes carry no authentication of their own. The query endpoint is
// reachable anonymously too; guarded fields are enforced inside the query engine.

pub mod health;
pub mod query;
pub mod root;

pub use health::{health, health_check};
pub use query::query;
pub use root::root;
