//! Host-facing reader plugin.
//!
//! [`napari_get_reader`] decides from the path alone whether this plugin
//! handles a file; [`read_bioformats`] does the read: start (or reuse) the
//! runtime, open the file, extract display metadata and wrap the pixels in a
//! [`crate::array::LazyArray`].

mod reader;
mod remediation;

pub use reader::{
    napari_get_reader, open_lazy, read_bioformats, read_with_reader, LayerData, ReadOptions,
    ReaderFn, ReaderInput,
};
pub use remediation::{CondaJdkInstaller, ConfirmFn, RuntimeRemediation};
