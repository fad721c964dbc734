use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::app::ports::{DocumentNode, DocumentTree};

/// Text inside these elements is not part of the visible page
const NON_VISIBLE_TAGS: &[&str] = &["script", "style", "template", "noscript"];

/// `scraper`-backed implementation of the document port
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(bytes))
    }
}

#[derive(Clone, Copy)]
pub struct HtmlNode<'a>(ElementRef<'a>);

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!("Ignoring invalid selector '{}': {:?}", selector, e);
            None
        }
    }
}

fn visible_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .map(|parent| NON_VISIBLE_TAGS.contains(&parent.name()))
                .unwrap_or(false);
            if hidden {
                None
            } else {
                Some(text.trim())
            }
        })
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl<'a> DocumentNode<'a> for HtmlNode<'a> {
    fn tag_name(&self) -> &'a str {
        self.0.value().name()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    fn text(&self) -> String {
        visible_text(self.0)
    }

    fn raw_text(&self) -> String {
        self.0
            .descendants()
            .filter_map(|node| match node.value() {
                Node::Text(text) => Some(&**text),
                _ => None,
            })
            .collect()
    }

    fn select(&self, selector: &str) -> Vec<Self> {
        parse_selector(selector)
            .map(|parsed| self.0.select(&parsed).map(HtmlNode).collect())
            .unwrap_or_default()
    }
}

impl DocumentTree for HtmlDocument {
    type Node<'a> = HtmlNode<'a>;

    fn select<'a>(&'a self, selector: &str) -> Vec<HtmlNode<'a>> {
        parse_selector(selector)
            .map(|parsed| self.html.select(&parsed).map(HtmlNode).collect())
            .unwrap_or_default()
    }

    fn text(&self) -> String {
        visible_text(self.html.root_element())
    }
}
