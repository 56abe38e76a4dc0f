pub mod lead;
pub mod persist;
