//! Cinelog-DB: schema, migrations, queries and the data manager.
//!
//! SQLite through rusqlite, pooled with r2d2.
//!
//! # Modules
//!
//! - `migrations` - Embedded schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the schema
//! - `queries` - Per-table query functions
//! - `manager` - The [`DataManager`] capability trait and its SQLite implementation
//!
//! # Example
//!
//! ```
//! use cinelog_db::{DataManager, NewUser, SqliteDataManager};
//! use cinelog_db::pool::init_memory_pool;
//!
//! let manager = SqliteDataManager::new(init_memory_pool().unwrap());
//! let user = manager
//!     .add_user(NewUser { user_name: "ada".into(), avatar_url: None })
//!     .unwrap();
//! assert_eq!(manager.get_user_name(user.id).unwrap().as_deref(), Some("ada"));
//! ```

pub mod manager;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;

pub use manager::{DataManager, SqliteDataManager};
pub use models::{Movie, MovieUpdate, NewMovie, NewUser, User, UserMovie};
