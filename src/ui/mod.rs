pub mod explore;
pub mod filter;
pub mod load;
pub mod panels;
pub mod select;
pub mod table;
