#![warn(missing_docs)]
//! Durable named styles for `folio-core`.
//!
//! The `styles` table keeps one row per saved [`StyleRecord`](folio_core::StyleRecord). It lives in
//! a single JSON file holding the column list and the rows, every cell stored as text:
//!
//! ```text
//! styles(name, shrift, pt, bold, italic, underlined, interval, color)
//! ```
//!
//! # Example
//!
//! ```rust
//! use folio_core::StyleRecord;
//! use folio_core_styles::StyleStore;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = StyleStore::open(dir.path().join("styles.json"));
//! store.create().unwrap();
//!
//! let mut heading = StyleRecord::new("Heading");
//! heading.bold = true;
//! store.save(&heading).unwrap();
//!
//! assert_eq!(store.list_names().unwrap(), vec!["Heading".to_string()]);
//! assert_eq!(store.fetch("Heading").unwrap(), Some(heading));
//! ```

mod error;
mod row;
mod store;

pub use error::StoreError;
pub use row::{COLUMNS, StyleRow};
pub use store::StyleStore;
