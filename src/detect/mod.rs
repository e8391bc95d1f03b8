pub mod client;
pub mod dto;
pub mod extract;
pub mod transport;
