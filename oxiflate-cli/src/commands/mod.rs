//! Command implementations for the oxiflate CLI.

pub mod compress;
pub mod decompress;
pub mod detect;
pub mod info;
pub mod ratio;

pub use compress::{CompressArgs, cmd_compress};
pub use decompress::{DecompressArgs, cmd_decompress};
pub use detect::cmd_detect;
pub use info::cmd_info;
pub use ratio::cmd_ratio;
