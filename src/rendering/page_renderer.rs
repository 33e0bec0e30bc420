//! Page renderer implementation.
//!
//! Templates are compiled into the binary and share `layout/main`. HTML
//! auto-escaping is on for every template, so contact fields can be
//! rendered without manual escaping.

use std::fmt::Write;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::{Error, Result};

const LAYOUT_NAME: &str = "layout/main";
const LAYOUT_SOURCE: &str = include_str!("../../templates/layout/main.html");

/// A page the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Landing page with the static sample listing.
    Index,
    /// About page.
    About,
    /// Contact list with flash message.
    ContactList,
    /// Add-contact form.
    AddContact,
    /// Edit-contact form.
    EditContact,
    /// Contact detail page.
    Details,
    /// 404 page.
    NotFound,
    /// 500 page.
    Error,
}

impl Page {
    /// All pages, in registration order.
    pub const ALL: [Self; 8] = [
        Self::Index,
        Self::About,
        Self::ContactList,
        Self::AddContact,
        Self::EditContact,
        Self::Details,
        Self::NotFound,
        Self::Error,
    ];

    /// Returns the template name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::About => "about",
            Self::ContactList => "contact",
            Self::AddContact => "add-contact",
            Self::EditContact => "edit-contact",
            Self::Details => "details",
            Self::NotFound => "not-found",
            Self::Error => "error",
        }
    }

    const fn source(self) -> &'static str {
        match self {
            Self::Index => include_str!("../../templates/index.html"),
            Self::About => include_str!("../../templates/about.html"),
            Self::ContactList => include_str!("../../templates/contact.html"),
            Self::AddContact => include_str!("../../templates/add-contact.html"),
            Self::EditContact => include_str!("../../templates/edit-contact.html"),
            Self::Details => include_str!("../../templates/details.html"),
            Self::NotFound => include_str!("../../templates/not-found.html"),
            Self::Error => include_str!("../../templates/error.html"),
        }
    }
}

/// Renders named pages with a data payload.
#[derive(Debug)]
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    /// Creates a renderer with every page template registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a template has invalid syntax.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_filter("path_segment", path_segment);

        env.add_template(LAYOUT_NAME, LAYOUT_SOURCE)
            .map_err(template_error(LAYOUT_NAME))?;
        for page in Page::ALL {
            env.add_template(page.as_str(), page.source())
                .map_err(template_error(page.as_str()))?;
        }

        Ok(Self { env })
    }

    /// Renders a page.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails (e.g. a filter rejects a value).
    pub fn render<S: Serialize>(&self, page: Page, data: &S) -> Result<String> {
        let name = page.as_str();
        let template = self.env.get_template(name).map_err(template_error(name))?;
        template.render(data).map_err(template_error(name))
    }
}

/// Percent-encodes a value for use as one URL path segment.
///
/// Everything outside the RFC 3986 unreserved set is encoded, `/` included.
fn path_segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

fn template_error(name: &str) -> impl FnOnce(minijinja::Error) -> Error + '_ {
    move |e| Error::OperationFailed {
        operation: format!("render_template:{name}"),
        cause: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_all_templates_compile() {
        let renderer = PageRenderer::new().unwrap();
        assert!(renderer.env.get_template(LAYOUT_NAME).is_ok());
        for page in Page::ALL {
            assert!(renderer.env.get_template(page.as_str()).is_ok());
        }
    }

    #[test]
    fn test_layout_wraps_page() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer
            .render(Page::About, &json!({ "title": "About" }))
            .unwrap();
        assert!(html.contains("<title>About</title>"));
        assert!(html.contains("/public/style.css"));
    }

    #[test]
    fn test_contact_fields_are_escaped() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer
            .render(
                Page::ContactList,
                &json!({
                    "title": "Contact",
                    "contacts": [{ "name": "<script>x</script>", "email": "a@b.com", "phone": "0812" }],
                    "msg": null,
                }),
            )
            .unwrap();
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test_case("Agung", "Agung"; "plain")]
    #[test_case("AC/DC", "AC%2FDC"; "slash")]
    #[test_case("Ann Lee", "Ann%20Lee"; "space")]
    #[test_case("a&b?c#d", "a%26b%3Fc%23d"; "query characters")]
    #[test_case("Ségolène", "S%C3%A9gol%C3%A8ne"; "utf8")]
    fn test_path_segment_encoding(name: &str, expected: &str) {
        assert_eq!(path_segment(name), expected);
    }

    #[test]
    fn test_detail_link_keeps_slash_inside_segment() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer
            .render(
                Page::Details,
                &json!({
                    "title": "Contact Detail",
                    "contact": { "name": "AC/DC", "email": "acdc@test.com", "phone": "0812" },
                }),
            )
            .unwrap();
        assert!(html.contains("href=\"/contact/edit/AC%2FDC\""));
    }

    #[test]
    fn test_add_form_lists_errors_in_order() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer
            .render(
                Page::AddContact,
                &json!({
                    "title": "Add Contact",
                    "contact": { "name": "Agung", "email": "bad", "phone": "1" },
                    "errors": [
                        { "field": "email", "message": "Invalid email address." },
                        { "field": "phone", "message": "Invalid mobile phone number." },
                    ],
                }),
            )
            .unwrap();

        let email = html.find("Invalid email address.").unwrap();
        let phone = html.find("Invalid mobile phone number.").unwrap();
        assert!(email < phone);
        assert!(html.contains("value=\"Agung\""));
    }
}
