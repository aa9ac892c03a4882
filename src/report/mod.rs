//! Document output
//!
//! - [`html`]: the self-contained page (markup, data, runtime and the
//!   generated handlers)
//! - [`escape`]: escaping shared by the writer and the widget bindings
//!
//! # Usage
//!
//! ```ignore
//! use mediascatter::report;
//!
//! report::generate("bundle/index.html", &document)?;
//! let page: String = report::render(&document)?;
//! ```

pub mod escape;
pub mod html;

pub use html::Document;

use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write the document to `path`
pub fn generate<P: AsRef<Path>>(path: P, document: &Document) -> io::Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    html::write(&mut writer, document)?;
    writer.flush()
}

/// Render the document to a string
pub fn render(document: &Document) -> io::Result<String> {
    let mut buf = Vec::new();
    html::write(&mut buf, document)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
