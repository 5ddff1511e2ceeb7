//! Authentication utilities
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and password rules
//! - [`jwt`]: session token signing and validation
//! - [`session`]: login, token issue, revocation and resolution
//! - [`middleware`]: bearer-token extraction and the [`middleware::AuthContext`] extractor
//!
//! # Example
//!
//! ```
//! use taskdeck_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("correct horse")?;
//! assert!(verify_password("correct horse", &hash)?);
//! assert!(!verify_password("wrong horse", &hash)?);
//! # Ok(())
//! # }
//! ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;
