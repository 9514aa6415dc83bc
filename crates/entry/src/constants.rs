//! Fixed protocol constants.
//!
//! Namespace declarations, extension prefixes, and scheme strings are part of
//! the wire protocol, not configuration.

/// Atom namespace declaration.
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Shared-data extension namespace declaration.
pub const GD_NS: &str = "http://schemas.google.com/g/2005";

/// Contact extension namespace declaration.
pub const GCONTACT_NS: &str = "http://schemas.google.com/contact/2008";

/// Batch envelope namespace declaration.
pub const BATCH_NS: &str = "http://schemas.google.com/gdata/batch";

/// Field-key prefixes carrying extension (non-core) entry data.
pub const EXTENSION_PREFIXES: [&str; 2] = ["gd:", "gContact:"];

/// Field-key prefix carrying per-item batch outcome data.
pub const BATCH_PREFIX: &str = "batch:";

/// Category scheme emitted on serialized entries.
pub const CATEGORY_SCHEME: &str = "http://schemas.google.com/g/2005#kind";

/// Prefix concatenated with the category label to build the category term.
pub const CATEGORY_TERM_PREFIX: &str = "http://schemas.google.com/g/2008#";

/// Extension field keys feeding the typed projections.
pub const ADDRESS_FIELD: &str = "gd:structuredPostalAddress";
pub const EMAIL_FIELD: &str = "gd:email";
pub const PHONE_FIELD: &str = "gd:phoneNumber";
pub const WEBSITE_FIELD: &str = "gContact:website";
pub const GROUP_FIELD: &str = "gContact:groupMembershipInfo";
pub const ORGANIZATION_FIELD: &str = "gd:organization";
pub const BIRTHDAY_FIELD: &str = "gContact:birthday";

/// Suffix identifying a photo link relation.
pub const PHOTO_REL_SUFFIX: &str = "rel#photo";

/// Link relation pointing at the entry's edit endpoint.
pub const EDIT_REL: &str = "edit";
