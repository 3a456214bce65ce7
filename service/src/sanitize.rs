//! HTML sanitization seam
//!
//! Sanitization itself is a collaborator supplied by the host
//! application; the catalog only routes generated HTML (feature-info
//! templates, external descriptions) through this trait.

/// Strips disallowed tags and attributes from HTML
pub trait HtmlSanitizer: Send + Sync {
    /// Sanitize an HTML fragment
    fn sanitize(&self, html: &str) -> String;
}

/// Identity sanitizer, used when the host supplies none
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughSanitizer;

impl HtmlSanitizer for PassthroughSanitizer {
    fn sanitize(&self, html: &str) -> String {
        html.to_string()
    }
}
