pub mod archive;
pub mod store;

pub use archive::UplinkArchive;
pub use store::StoreSink;
