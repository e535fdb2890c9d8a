pub mod error;
pub mod csv_list;
pub mod normalize;
