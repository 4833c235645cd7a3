pub mod accounts;
pub mod polls;
pub mod voting;
