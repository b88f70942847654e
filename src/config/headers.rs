//! HTTP header constants for the SharePoint REST API.

/// Media type requested for every call (JSON without OData metadata noise).
pub const ODATA_NOMETADATA: &str = "application/json;odata=nometadata";

/// Conditional-update header name; `*` matches any entity version.
pub const HEADER_IF_MATCH: &str = "IF-MATCH";
/// Value used with `IF-MATCH` so updates are not rejected on concurrent edits.
pub const IF_MATCH_ANY: &str = "*";
