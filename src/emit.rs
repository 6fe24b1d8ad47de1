//! Document emitter: the merged document as a single YAML file.

use std::path::Path;

use tracing::info;

use crate::document::MergedDocument;
use crate::error::ResolveError;
use crate::ports::FileSystem;

/// Identity written into the provenance header.
pub const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Renders the provenance header followed by `app`, `widgets` and `data`.
///
/// Output depends only on the document and `source`, so identical inputs
/// produce byte-identical files.
///
/// # Errors
///
/// Returns [`ResolveError::Serialize`] if the document cannot be serialized.
pub fn render(document: &MergedDocument, source: &Path) -> Result<String, ResolveError> {
    let body = serde_yaml::to_string(&document.to_value()).map_err(ResolveError::Serialize)?;
    let mut out = header(source);
    out.push_str(&body);
    Ok(out)
}

/// Renders `document` and writes it to `output`.
///
/// # Errors
///
/// Returns [`ResolveError::Serialize`] or [`ResolveError::Io`].
pub fn write(
    fs: &dyn FileSystem,
    output: &Path,
    document: &MergedDocument,
    source: &Path,
) -> Result<(), ResolveError> {
    let text = render(document, source)?;
    info!(output = %output.display(), "writing aggregated document");
    fs.write(output, &text).map_err(|source| ResolveError::Io {
        path: output.to_path_buf(),
        source,
    })
}

fn header(source: &Path) -> String {
    format!(
        "# Auto-generated aggregated layout file\n\
         # Source: {}\n\
         # Generator: {GENERATOR}\n\
         # Do not edit manually - regenerate with `layout aggregate`\n\n",
        source.display()
    )
}
