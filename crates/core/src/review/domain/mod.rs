pub mod filter;
pub mod session;
pub mod sort;
