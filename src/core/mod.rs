pub mod breeds;
pub mod geocode;
pub mod query;
pub mod search;

pub use query::{DogQuery, Sort, SortDirection, SortField};
pub use search::DogSearch;
