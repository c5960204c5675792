//! Strictness flags and the breadcrumb-carrying validation context.

use crate::error::{ValidationError, ValidationIssue};

/// What to do with object keys a schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnrecognizedKeys {
    /// Report every undeclared key as a validation issue.
    Fail,
    /// Drop undeclared keys silently.
    #[default]
    Strip,
    /// Keep undeclared keys verbatim next to the declared ones.
    Passthrough,
}

/// How strictly a document is validated.
///
/// Resolved once per call and applied to every node of the document.
///
/// ## Examples
///
/// ```rust
/// use opik_client::schema::{Strictness, UnrecognizedKeys};
///
/// let strict = Strictness::strict();
/// assert_eq!(strict.unrecognized_object_keys, UnrecognizedKeys::Strip);
/// assert!(!strict.allow_unrecognized_enum_values);
///
/// let lenient = Strictness::permissive();
/// assert!(lenient.allow_unrecognized_union_members);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strictness {
    /// Handling of undeclared object keys.
    pub unrecognized_object_keys: UnrecognizedKeys,
    /// Preserve a value matching no union member instead of failing.
    pub allow_unrecognized_union_members: bool,
    /// Accept any string for an enum, preserved verbatim.
    pub allow_unrecognized_enum_values: bool,
    /// On failure, log a warning and return the input unchanged.
    pub skip_validation: bool,
}

impl Strictness {
    /// Drops unknown keys and rejects unknown enum values and union members.
    pub const fn strict() -> Self {
        Self {
            unrecognized_object_keys: UnrecognizedKeys::Strip,
            allow_unrecognized_union_members: false,
            allow_unrecognized_enum_values: false,
            skip_validation: false,
        }
    }

    /// Keeps unknown keys and preserves unknown enum values and union members.
    pub const fn permissive() -> Self {
        Self {
            unrecognized_object_keys: UnrecognizedKeys::Passthrough,
            allow_unrecognized_union_members: true,
            allow_unrecognized_enum_values: true,
            skip_validation: false,
        }
    }

    /// Sets the unknown-key handling.
    pub const fn with_unrecognized_keys(mut self, mode: UnrecognizedKeys) -> Self {
        self.unrecognized_object_keys = mode;
        self
    }

    /// Sets whether unknown enum values are preserved.
    pub const fn with_unrecognized_enum_values(mut self, allow: bool) -> Self {
        self.allow_unrecognized_enum_values = allow;
        self
    }

    /// Sets whether values matching no union member are preserved.
    pub const fn with_unrecognized_union_members(mut self, allow: bool) -> Self {
        self.allow_unrecognized_union_members = allow;
        self
    }

    /// Sets whether validation failures are downgraded to warnings.
    pub const fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }
}

impl Default for Strictness {
    fn default() -> Self {
        Self::strict()
    }
}

/// Validation state passed down the document tree.
///
/// Carries the breadcrumb path from the document root and the strictness
/// flags for the call. Children get their own copy of the path, so sibling
/// branches never see each other's segments.
#[derive(Debug, Clone, Default)]
pub struct Context {
    strictness: Strictness,
    path: Vec<String>,
}

impl Context {
    /// Creates a root context.
    pub fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            path: Vec::new(),
        }
    }

    /// Prepends breadcrumb segments, e.g. `["response"]`.
    pub fn with_prefix<I, S>(mut self, prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path: Vec<String> = prefix.into_iter().map(Into::into).collect();
        path.append(&mut self.path);
        self.path = path;
        self
    }

    /// Returns the active strictness flags.
    pub fn strictness(&self) -> &Strictness {
        &self.strictness
    }

    /// Returns the breadcrumb path of this node.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Context for a named child (object field or map entry).
    pub(crate) fn field(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Self {
            strictness: self.strictness,
            path,
        }
    }

    /// Context for a list item.
    pub(crate) fn index(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(format!("[{index}]"));
        Self {
            strictness: self.strictness,
            path,
        }
    }

    /// Builds an issue located at this node.
    pub(crate) fn issue(&self, message: impl Into<String>) -> ValidationIssue {
        ValidationIssue::new(self.path.clone(), message)
    }

    /// Builds a single-issue error located at this node.
    pub(crate) fn error(&self, message: impl Into<String>) -> ValidationError {
        ValidationError::new(vec![self.issue(message)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_comes_before_existing_segments() {
        let ctx = Context::new(Strictness::strict())
            .with_prefix(["items"])
            .with_prefix(["response"]);
        assert_eq!(ctx.path(), ["response", "items"]);
    }

    #[test]
    fn children_do_not_share_paths() {
        let root = Context::new(Strictness::strict()).with_prefix(["response"]);
        let a = root.field("a");
        let b = root.index(3);
        assert_eq!(a.path(), ["response", "a"]);
        assert_eq!(b.path(), ["response", "[3]"]);
        assert_eq!(root.path(), ["response"]);
    }

    #[test]
    fn builders_override_single_flags() {
        let s = Strictness::strict()
            .with_unrecognized_enum_values(true)
            .with_unrecognized_keys(UnrecognizedKeys::Fail);
        assert!(s.allow_unrecognized_enum_values);
        assert!(!s.allow_unrecognized_union_members);
        assert_eq!(s.unrecognized_object_keys, UnrecognizedKeys::Fail);
    }

    #[test]
    fn root_issue_gets_placeholder_breadcrumb() {
        let err = Context::default().error("Expected string. Received 1.");
        assert_eq!(err.issues()[0].breadcrumb(), "<root>");
    }
}
