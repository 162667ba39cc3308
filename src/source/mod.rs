#[cfg(feature = "download")]
pub mod auto_loader;
pub mod dates;
pub mod format;
pub mod iana;
pub mod loader;
pub mod psl;

#[cfg(feature = "download")]
pub use auto_loader::AutoSourceLoader;
pub use dates::{creation_date_map, parse_creation_dates, parse_registration_date};
pub use format::SourceKind;
pub use iana::parse_iana;
pub use loader::{FileSourceLoader, MemorySourceLoader, SourceLoader, DEFAULT_UPDATE_INTERVAL};
pub use psl::parse_psl;
