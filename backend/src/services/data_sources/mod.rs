pub mod csv;
pub mod sheet;
