use std::path::Path;

use crate::survey::InputType;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Guesses the input type from the file extension. Unknown extensions are
/// read as CSV.
pub fn guess_input_type(path: &str) -> InputType {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("xlsx") | Some("xlsm") => InputType::Excel,
        _ => InputType::Csv,
    }
}

/// Name given to columns with an empty header.
pub fn unnamed_header(idx: usize) -> String {
    format!("Unnamed: {}", idx)
}
