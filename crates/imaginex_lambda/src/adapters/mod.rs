pub mod download;
pub mod http;
pub mod object_store;
pub mod s3;
