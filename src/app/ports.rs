use regex::Regex;

use crate::app::pipeline_use_case::ProcessedDocument;

/// Read-only view of one element in a parsed document.
///
/// Implementations never fail: a selector that cannot be parsed or an
/// attribute that is missing simply yields nothing.
pub trait DocumentNode<'a>: Clone {
    fn tag_name(&self) -> &'a str;

    fn attr(&self, name: &str) -> Option<&'a str>;

    /// Visible descendant text, each fragment trimmed and joined by a single space
    fn text(&self) -> String;

    /// Every descendant text node verbatim, including script and style bodies
    fn raw_text(&self) -> String;

    /// Descendant elements matching a CSS selector, in document order
    fn select(&self, selector: &str) -> Vec<Self>;

    fn class_names(&self) -> Vec<&'a str> {
        self.attr("class")
            .map(|classes| classes.split_whitespace().collect())
            .unwrap_or_default()
    }

    fn has_class_matching(&self, pattern: &Regex) -> bool {
        self.class_names().iter().any(|class| pattern.is_match(class))
    }

    /// Descendants carrying at least one class token matching `pattern`
    fn find_by_class(&self, pattern: &Regex) -> Vec<Self> {
        self.select("[class]")
            .into_iter()
            .filter(|node| node.has_class_matching(pattern))
            .collect()
    }
}

/// Query capability over a parsed document tree.
pub trait DocumentTree {
    type Node<'a>: DocumentNode<'a>
    where
        Self: 'a;

    /// Elements matching a CSS selector, in document order
    fn select<'a>(&'a self, selector: &str) -> Vec<Self::Node<'a>>;

    /// Visible text of the whole page, fragments joined by a single space
    fn text(&self) -> String;

    fn find_by_tag<'a>(&'a self, tags: &[&str]) -> Vec<Self::Node<'a>> {
        self.select(&tags.join(", "))
    }

    fn find_by_class<'a>(&'a self, pattern: &Regex) -> Vec<Self::Node<'a>> {
        self.select("[class]")
            .into_iter()
            .filter(|node| node.has_class_matching(pattern))
            .collect()
    }
}

/// Destination for processed records (bronze and gold together)
pub trait ProcessedRecordOutputPort {
    fn write_processed(&self, record: &ProcessedDocument) -> anyhow::Result<()>;
}
