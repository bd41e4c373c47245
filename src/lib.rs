// The document engine behind the editor: the text tree and its readers,
// grapheme cluster segmentation, incremental syntax tokenization, and
// the buffer, configuration, and file layers that tie them together.

pub mod buffer;
pub mod config;
pub mod file;
pub mod segment;
pub mod syntax;
pub mod text;
