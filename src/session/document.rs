//! Synthetic search document
//!
//! The indexer never navigates to a Google page. It serves its own minimal
//! document that embeds the CSE widget for the requested engine; the widget
//! picks the query up from `location.search` on the synthetic address, which
//! is why the document must be served at a real http URL (a `data:` URL has
//! an empty `location.search` and leaves the widget idle).

use crate::utils::constants::{CSE_BOOTSTRAP_URL, SYNTHETIC_ORIGIN};

/// What one indexing run searches for
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// CSE engine id, the `cx` parameter of the widget bootstrap script
    pub engine_id: String,
    /// Query string, carried to the widget via the synthetic address
    pub query: String,
    /// Optional site restriction rendered as an `as_sitesearch` attribute
    pub site: Option<String>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(
        engine_id: impl Into<String>,
        query: impl Into<String>,
        site: Option<String>,
    ) -> Self {
        Self {
            engine_id: engine_id.into(),
            query: query.into(),
            site,
        }
    }

    /// Address the synthesized document is served at
    #[must_use]
    pub fn address(&self) -> String {
        format!("{SYNTHETIC_ORIGIN}?q={}", form_encode(&self.query))
    }

    /// Renders the widget-bootstrap document
    ///
    /// The script element is the standard CSE embed: create an async script
    /// tag for `cse.js` and insert it before the first script in the
    /// document. The `<gcse:search>` element in the body is where the
    /// widget renders.
    #[must_use]
    pub fn document(&self) -> String {
        let site_attr = match &self.site {
            Some(site) => format!(
                " as_sitesearch=\"{}\"",
                html_escape::encode_double_quoted_attribute(site)
            ),
            None => String::new(),
        };

        format!(
            concat!(
                "<!DOCTYPE html>\n",
                "<html>\n",
                "<head>\n",
                "<title>search</title>\n",
                "<meta charset=\"utf-8\">\n",
                "<script>\n",
                "(function() {{\n",
                "    var gcse = document.createElement('script');\n",
                "    gcse.type = 'text/javascript';\n",
                "    gcse.async = true;\n",
                "    gcse.src = '{bootstrap}{engine}';\n",
                "    var s = document.getElementsByTagName('script')[0];\n",
                "    s.parentNode.insertBefore(gcse, s);\n",
                "}})();\n",
                "</script>\n",
                "</head>\n",
                "<body>\n",
                "<gcse:search{site_attr}></gcse:search>\n",
                "</body>\n",
                "</html>\n",
            ),
            bootstrap = CSE_BOOTSTRAP_URL,
            engine = form_encode(&self.engine_id),
            site_attr = site_attr,
        )
    }
}

/// Form-urlencodes one value for embedding in a URL query
///
/// The encoded form is also safe inside the single-quoted script string of
/// the synthesized document.
fn form_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
