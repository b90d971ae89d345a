// file: src/storage/mod.rs
// description: storage module exports
// reference: internal module structure

pub mod fs;
pub mod object_store;
pub mod requests;
pub mod s3;
pub mod uploads;

pub use fs::FsObjectStore;
pub use object_store::{MemoryObjectStore, ObjectStore, StoredObject};
pub use requests::RequestStore;
pub use s3::S3ObjectStore;
pub use uploads::UploadStore;
