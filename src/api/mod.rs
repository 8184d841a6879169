pub mod format;
pub mod pagination;

pub use pagination::{PageRequest, Pagination};
