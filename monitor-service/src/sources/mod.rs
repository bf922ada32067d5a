pub mod archive_dir;
pub mod http_uplink;

pub use archive_dir::ArchiveDirSource;
