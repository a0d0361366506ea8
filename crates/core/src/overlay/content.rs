//! Tooltip content and sanitization.

/// What goes inside an overlay element.
///
/// Provider output is untrusted: it is sanitized before being kept as
/// markup. Error text is never interpreted as markup.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayContent {
    /// Sanitized markup, safe to insert as HTML.
    Markup(String),
    /// Plain text, to be inserted as a text node.
    Text(String),
}

impl OverlayContent {
    /// Sanitizes a provider response.
    ///
    /// Formatting tags such as `<b>`, `<i>` and `<br>` survive; scripts,
    /// event handler attributes and `javascript:` links do not.
    pub fn sanitized(raw: &str) -> Self {
        OverlayContent::Markup(ammonia::clean(raw))
    }

    pub fn text(text: impl Into<String>) -> Self {
        OverlayContent::Text(text.into())
    }

    /// The string handed to the host: markup as-is, text as-is.
    pub fn as_str(&self) -> &str {
        match self {
            OverlayContent::Markup(s) | OverlayContent::Text(s) => s,
        }
    }

    /// HTML for hosts that can only set markup; plain text is escaped.
    pub fn to_html(&self) -> String {
        match self {
            OverlayContent::Markup(markup) => markup.clone(),
            OverlayContent::Text(text) => ammonia::clean_text(text),
        }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, OverlayContent::Markup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_keeps_formatting() {
        let content = OverlayContent::sanitized("<b>xin</b> chào<script>alert(1)</script>");
        assert_eq!(content.as_str(), "<b>xin</b> chào");
    }

    #[test]
    fn strips_event_handlers() {
        let content = OverlayContent::sanitized(r#"<img src="x" onerror="alert(1)">"#);
        assert!(!content.as_str().contains("onerror"));
    }

    #[test]
    fn plain_text_is_escaped_for_html() {
        let content = OverlayContent::text("Error: <script>");
        assert_eq!(content.as_str(), "Error: <script>");
        assert!(!content.to_html().contains('<'));
    }
}
