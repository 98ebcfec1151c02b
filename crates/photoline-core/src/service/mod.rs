pub mod http;
pub mod keepalive;
