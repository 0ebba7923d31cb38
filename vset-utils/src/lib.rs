pub mod content_hash;
pub mod serde_int;
