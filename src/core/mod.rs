//! Presentation-agnostic table engine
//!
//! Everything in here is plain state and pure functions: no HTTP, no
//! storage, no async. The interface layer composes these pieces into
//! endpoints; embedders can use them directly.

pub mod column;
pub mod form;
pub mod pagination;
pub mod row;
pub mod session;
pub mod table;
pub mod upload;

// Re-export the types most callers need
pub use column::{Align, Column, SortOrder, SortSpec};
pub use pagination::{PageRange, PageRequest, PageResult, RawPage};
pub use row::{CellValue, TableRow};
pub use session::{Session, SessionManager, TokenStore};
pub use table::{FetchOutcome, FetchTicket, TableController};
pub use upload::{FileAsset, UploadCandidate, UploadError, UploadPolicy};
