//! Types shared by the element parsers.

use url::Url;

/// Per-document state handed to every builder while a tree is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    /// Location the document was retrieved from; base for relative hrefs.
    spec_url: Url,
}

impl ParseContext {
    #[must_use]
    pub fn new(spec_url: Url) -> Self {
        Self { spec_url }
    }

    #[must_use]
    pub fn spec_url(&self) -> &Url {
        &self.spec_url
    }
}
