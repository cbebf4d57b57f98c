//! Live CSE widget bindings
//!
//! The Google CSE widget renders into class-named containers:
//! `gsc-cursor-page` pagination controls (one element per page, page N is
//! element N-1), a `gsc-cursor-current-page` marker whose text is the
//! current page number, and `gsc-webResult` result containers where the
//! FIRST element is the outer results box wrapping all the others.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;

use super::{PageState, WidgetPage};

/// Produces the [`PageState`] snapshot in one evaluation
const PAGE_STATE_SCRIPT: &str = r#"
(function() {
    var current = document.getElementsByClassName('gsc-cursor-current-page');
    var pages = document.getElementsByClassName('gsc-cursor-page');
    var results = document.getElementsByClassName('gsc-webResult');
    var currentPage = -1;
    if (current.length > 0) {
        var parsed = parseInt(current[0].textContent, 10);
        if (!isNaN(parsed)) {
            currentPage = parsed;
        }
    }
    var noResults = results.length === 1 &&
        results[0].textContent.indexOf('No Results') !== -1;
    return {
        currentPage: currentPage,
        totalPages: pages.length,
        hasResults: !noResults
    };
})()
"#;

/// Collects result hrefs, skipping the outer results box at index 0
const EXTRACT_LINKS_SCRIPT: &str = r#"
(function() {
    var results = document.getElementsByClassName('gsc-webResult');
    var links = [];
    for (var i = 1; i < results.length; i++) {
        var anchors = results[i].getElementsByTagName('a');
        for (var j = 0; j < anchors.length; j++) {
            if (anchors[j].href) {
                links.push(anchors[j].href);
            }
        }
    }
    return links;
})()
"#;

/// Clicks the cursor control at the given 0-based index, reporting whether
/// the control existed
fn click_script(page: u32) -> String {
    format!(
        r#"(function() {{
    var cursor = document.getElementsByClassName('gsc-cursor-page');
    var control = cursor[{}];
    if (!control) {{
        return false;
    }}
    control.click();
    return true;
}})()"#,
        page.saturating_sub(1)
    )
}

/// CSE widget driven through a chromiumoxide page
pub struct CseWidget {
    page: Page,
}

impl CseWidget {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl WidgetPage for CseWidget {
    async fn page_state(&self) -> Result<PageState> {
        self.page
            .evaluate(PAGE_STATE_SCRIPT)
            .await
            .context("failed to evaluate pagination snapshot")?
            .into_value::<PageState>()
            .context("pagination snapshot did not deserialize")
    }

    async fn extract_links(&self) -> Result<Vec<String>> {
        self.page
            .evaluate(EXTRACT_LINKS_SCRIPT)
            .await
            .context("failed to evaluate link extraction")?
            .into_value::<Vec<String>>()
            .context("extracted links did not deserialize")
    }

    async fn go_to_page(&self, page: u32) -> Result<()> {
        let clicked = self
            .page
            .evaluate(click_script(page))
            .await
            .with_context(|| format!("failed to evaluate pagination click for page {page}"))?
            .value()
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        if clicked {
            Ok(())
        } else {
            anyhow::bail!("no pagination control for page {page}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_script_uses_zero_based_cursor_index() {
        assert!(click_script(1).contains("cursor[0]"));
        assert!(click_script(7).contains("cursor[6]"));
    }

    #[test]
    fn snapshot_script_reads_the_cursor_vocabulary() {
        assert!(PAGE_STATE_SCRIPT.contains("gsc-cursor-current-page"));
        assert!(PAGE_STATE_SCRIPT.contains("gsc-cursor-page"));
        assert!(PAGE_STATE_SCRIPT.contains("gsc-webResult"));
    }

    #[test]
    fn extraction_skips_the_outer_results_box() {
        assert!(EXTRACT_LINKS_SCRIPT.contains("var i = 1"));
    }
}
