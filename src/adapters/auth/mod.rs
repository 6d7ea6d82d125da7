//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `jwt` - HS256 shared-secret tokens
//! - `mock` - Test implementation that accepts registered tokens

mod jwt;
mod mock;

pub use jwt::{JwtSessionValidator, OperatorClaims};
pub use mock::MockSessionValidator;
