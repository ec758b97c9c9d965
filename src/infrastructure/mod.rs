pub mod in_memory;
pub mod provider;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
