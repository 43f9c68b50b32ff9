pub mod response;
pub mod session;

pub use response::ApiResponse;
pub use session::{resolve_identity, session_middleware};
