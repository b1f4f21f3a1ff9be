//! Cinelog-Common: shared types used across cinelog.
//!
//! - **Typed IDs**: integer newtypes for users and movies so the two can
//!   never be swapped at a call site
//! - **Error Handling**: the common error type and result alias
//!
//! # Examples
//!
//! ```
//! use cinelog_common::{Error, MovieId, Result};
//!
//! let id = MovieId::from(7);
//! assert_eq!(id.get(), 7);
//!
//! fn example(id: MovieId) -> Result<()> {
//!     Err(Error::not_found("movie", id))
//! }
//! assert!(example(id).is_err());
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
