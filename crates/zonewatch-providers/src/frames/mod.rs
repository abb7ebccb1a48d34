//! Frame Source Implementations
//!
//! | Source | Description |
//! |--------|-------------|
//! | [`HttpSnapshotSource`] | GET `<base_url>/<camera_entity>` with optional bearer token |
//! | [`FileFrameSource`] | Reads `<dir>/<camera_entity>.{jpg,jpeg,png}` |
//! | [`NullFrameSource`] | Empty frame, for tests and dry runs |

pub mod file;
pub mod http;
pub mod null;

pub use file::FileFrameSource;
pub use http::HttpSnapshotSource;
pub use null::NullFrameSource;
