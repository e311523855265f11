//! Narrow document-query capability over `scraper`.
//!
//! Every page parser in the crate goes through [`Document`] and [`Node`]:
//! select by CSS, read an attribute or `data-*` attribute, read text. The
//! selectors passed in are compile-time constants; an invalid one is a
//! programming error, and `selectors_are_valid` tests in each parser module
//! cover them.

use scraper::{ElementRef, Html, Selector};

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid CSS selector {css:?}: {e:?}"))
}

/// Returns `true` if `css` parses. Used by tests to vet selector constants.
#[cfg(test)]
pub(crate) fn is_valid_selector(css: &str) -> bool {
    Selector::parse(css).is_ok()
}

pub(crate) struct Document {
    html: Html,
}

impl Document {
    pub(crate) fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    pub(crate) fn select(&self, css: &'static str) -> Vec<Node<'_>> {
        let sel = selector(css);
        self.html.select(&sel).map(Node).collect()
    }

    pub(crate) fn first(&self, css: &'static str) -> Option<Node<'_>> {
        let sel = selector(css);
        self.html.select(&sel).next().map(Node)
    }

    /// Concatenated text of every match.
    pub(crate) fn text(&self, css: &'static str) -> String {
        self.select(css).iter().map(Node::text).collect()
    }

    /// Attribute of the first match.
    pub(crate) fn attr(&self, css: &'static str, name: &str) -> Option<String> {
        self.first(css).and_then(|n| n.attr(name))
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    pub(crate) fn select(&self, css: &'static str) -> Vec<Node<'a>> {
        let sel = selector(css);
        self.0.select(&sel).map(Node).collect()
    }

    pub(crate) fn first(&self, css: &'static str) -> Option<Node<'a>> {
        let sel = selector(css);
        self.0.select(&sel).next().map(Node)
    }

    pub(crate) fn text(&self) -> String {
        self.0.text().collect()
    }

    pub(crate) fn attr(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(str::to_owned)
    }

    /// `data-{name}` attribute.
    pub(crate) fn data(&self, name: &str) -> Option<String> {
        self.attr(&format!("data-{name}"))
    }

    /// Concatenated text of every descendant matching `css`.
    pub(crate) fn text_of(&self, css: &'static str) -> String {
        self.select(css).iter().map(Node::text).collect()
    }

    /// Attribute of the first descendant matching `css`.
    pub(crate) fn attr_of(&self, css: &'static str, name: &str) -> Option<String> {
        self.first(css).and_then(|n| n.attr(name))
    }
}

/// Text content of an HTML fragment, with character references decoded.
pub(crate) fn fragment_text(markup: &str) -> String {
    Html::parse_fragment(markup).root_element().text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="hero" data-employer-id="432">
            <a href="/one">First</a><a href="/two">Second</a>
          </div>
          <ul><li class="x">a</li><li class="x">b</li></ul>
        </body></html>
    "#;

    #[test]
    fn text_concatenates_all_matches() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.text("li.x"), "ab");
    }

    #[test]
    fn attr_reads_first_match() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.attr("#hero a", "href").as_deref(), Some("/one"));
        assert_eq!(doc.attr("#missing a", "href"), None);
    }

    #[test]
    fn data_reads_data_attribute() {
        let doc = Document::parse(PAGE);
        let hero = doc.first("#hero").unwrap();
        assert_eq!(hero.data("employer-id").as_deref(), Some("432"));
        assert_eq!(hero.data("absent"), None);
    }

    #[test]
    fn node_queries_are_scoped_to_the_node() {
        let doc = Document::parse(PAGE);
        let hero = doc.first("#hero").unwrap();
        assert_eq!(hero.select("a").len(), 2);
        assert!(hero.select("li").is_empty());
        assert_eq!(hero.text_of("a"), "FirstSecond");
        assert_eq!(hero.attr_of("a", "href").as_deref(), Some("/one"));
    }

    #[test]
    fn fragment_text_decodes_entities_and_drops_tags() {
        assert_eq!(fragment_text("&lt;b&gt;Hi&lt;/b&gt; &amp; bye"), "<b>Hi</b> & bye");
        assert_eq!(fragment_text("<p>Hi <i>there</i></p>"), "Hi there");
    }
}
