pub mod catalog;
pub mod documents;
pub mod progress;
pub mod requests;
