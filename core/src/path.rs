//! Field path construction and inspection.
//!
//! A field path names a node in a document tree: `root` for the document
//! itself, `.name` for object properties, `[i]` for a positional array
//! element and `[]` for "any element of this array".

/// Path of the document root.
pub const ROOT_PATH: &str = "root";

/// Group used for paths that do not live under a top-level property.
pub const OTHER_GROUP: &str = "Other";

/// Appends an object property to `parent`.
pub fn child_path(parent: &str, name: &str) -> String {
    format!("{parent}.{name}")
}

/// Appends a positional array index to `parent`.
pub fn indexed_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Appends the array wildcard to `parent`.
pub fn wildcard_path(parent: &str) -> String {
    format!("{parent}[]")
}

/// Returns the top-level property a path belongs to.
///
/// # Examples
///
/// ```
/// use schema_survey_core::top_level_group;
///
/// assert_eq!(top_level_group("root.jobInfo[].salary"), "jobInfo");
/// assert_eq!(top_level_group("root.status"), "status");
/// assert_eq!(top_level_group("root"), "Other");
/// ```
pub fn top_level_group(path: &str) -> &str {
    let Some(rest) = path.strip_prefix("root.") else {
        return OTHER_GROUP;
    };
    let end = rest.find(['.', '[']).unwrap_or(rest.len());
    if end == 0 {
        OTHER_GROUP
    } else {
        &rest[..end]
    }
}

/// Returns the last property name of a path with array suffixes removed.
///
/// # Examples
///
/// ```
/// use schema_survey_core::leaf_name;
///
/// assert_eq!(leaf_name("root.employee.roles[]"), "roles");
/// assert_eq!(leaf_name("root.items[3].brandCode"), "brandCode");
/// assert_eq!(leaf_name("root"), "root");
/// ```
pub fn leaf_name(path: &str) -> &str {
    let last = path.rsplit('.').next().unwrap_or(path);
    match last.find('[') {
        Some(idx) => &last[..idx],
        None => last,
    }
}
