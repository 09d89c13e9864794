pub mod store;
pub mod student;
