mod middleware;
mod password;
mod token;

pub use middleware::{AuthError, RequireUser};
pub use password::PasswordHasher;
pub use token::{Claims, TokenSigner};
