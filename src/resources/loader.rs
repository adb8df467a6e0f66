use crate::resources::{Descriptor, ResourceError, ResourceRow};
use std::path::Path;

/// Reads the resource list, keeping file order
///
/// Rows that cannot be decoded or validated come back as
/// [`Descriptor::Invalid`] so the crawler can skip them with a warning. Only
/// I/O failures abort the load.
pub fn load_resources(path: &Path) -> Result<Vec<Descriptor>, ResourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| ResourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| ResourceError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let mut descriptors = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => {
                return Err(ResourceError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                descriptors.push(Descriptor::Invalid {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let descriptor = match record.deserialize::<ResourceRow>(Some(&headers)) {
            Ok(row) => match row.validate() {
                Ok(resource) => Descriptor::Valid(resource),
                Err(reason) => Descriptor::Invalid { line, reason },
            },
            Err(e) => Descriptor::Invalid {
                line,
                reason: e.to_string(),
            },
        };
        descriptors.push(descriptor);
    }

    tracing::debug!(
        "Loaded {} resource descriptors from {}",
        descriptors.len(),
        path.display()
    );

    Ok(descriptors)
}
