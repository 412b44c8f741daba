//! Bearer token issuing and verification

pub mod jwt;

pub use jwt::{Claims, JwtService};
