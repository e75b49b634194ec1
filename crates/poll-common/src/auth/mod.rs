//! Admin authentication

mod jwt;

pub use jwt::{AdminClaims, JwtService};
