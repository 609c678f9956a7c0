pub mod http_backend;

pub use http_backend::HttpChatBackend;
