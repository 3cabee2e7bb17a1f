//! Serialization and deserialization for BPE models.
//!
//! Models are saved in the native `SharifBPE v1` text layout or as JSON. Loading
//! detects the layout from the file content.

pub mod format;
pub mod load;
pub mod save;

pub use format::{ModelFormat, SerializedModel, FORMAT_VERSION, MAGIC};
pub use load::ModelLoader;
pub use save::ModelSaver;
