pub mod import;
pub mod jobs;
pub mod leads;
pub mod model;
pub mod requests;
