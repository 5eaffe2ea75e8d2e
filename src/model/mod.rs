pub mod alignment;
pub mod cluster;
pub mod gold;
pub mod tally;
pub mod taxonomy;
