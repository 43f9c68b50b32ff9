pub mod error;
pub mod identity;
pub mod password;
pub mod token;

pub use error::{AuthError, TokenRejection};
pub use identity::{current_identity, RequestIdentity, ResolvedIdentity};
pub use password::{hash_password, verify_password};
pub use token::{Claims, KeyPair, TokenAuthority, TokenKind, TokenLifetimes, TokenPair};
