//! In-memory listing engine: filter, sort, then paginate.
//!
//! Listing endpoints load the full published set once per request and run it
//! through these stages, so filter, order and page arithmetic stay identical
//! for jobs, candidates and saved-search digests.

pub mod filter;
pub mod pagination;
pub mod sort;

pub use filter::{CandidateFilterOptions, CvFilter, JobFilter, JobFilterOptions};
pub use pagination::{paginate, Page, PageLink, Pagination, DEFAULT_PAGE_SIZE};
pub use sort::{sort_featured_first, FeaturedRecency};
