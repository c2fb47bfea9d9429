//! Streaming RSS/Atom parser.
//!
//! Walks the document with `quick_xml`'s event reader and collects the direct
//! children of every `<item>` (RSS 2.0 / RSS 1.0) or `<entry>` (Atom). Element
//! names are matched on their local part, so `dc:date` is seen as `date` and
//! `content:encoded` as `encoded`.

use super::FeedError;
use crate::pipeline::dates::EntryDates;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

/// One feed entry, with raw (still HTML-bearing) text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// `description` / `summary`, or the full `content` when neither is present.
    pub summary: Option<String>,
    pub dates: EntryDates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
    Content,
    Published,
    Updated,
    Created,
}

impl Field {
    fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Field::Title),
            "link" => Some(Field::Link),
            "description" | "summary" => Some(Field::Summary),
            "content" | "encoded" => Some(Field::Content),
            "pubDate" | "published" | "issued" | "date" => Some(Field::Published),
            "updated" | "modified" => Some(Field::Updated),
            "created" => Some(Field::Created),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct EntryBuilder {
    /// Element depth of the `<item>`/`<entry>` start tag.
    depth: usize,
    open: Option<Field>,
    buf: String,
    entry: FeedEntry,
    content: Option<String>,
}

impl EntryBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    fn open_field(&mut self, e: &BytesStart<'_>) {
        let name = local_name(e);
        if name == "link" {
            self.take_href(e);
        }
        self.open = Field::from_local_name(&name);
        self.buf.clear();
    }

    /// Self-closing children only matter for Atom `<link href=".."/>`.
    fn empty_field(&mut self, e: &BytesStart<'_>) {
        if local_name(e) == "link" {
            self.take_href(e);
        }
    }

    fn take_href(&mut self, e: &BytesStart<'_>) {
        if self.entry.link.is_some() {
            return;
        }
        let rel = attribute(e, b"rel");
        if rel.as_deref().is_some_and(|r| r != "alternate") {
            return;
        }
        if let Some(href) = attribute(e, b"href").filter(|h| !h.trim().is_empty()) {
            self.entry.link = Some(href.trim().to_string());
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.open.is_some() {
            self.buf.push_str(text);
        }
    }

    fn close_field(&mut self) {
        let Some(field) = self.open.take() else {
            return;
        };
        let value = self.buf.trim().to_string();
        self.buf.clear();
        if value.is_empty() {
            return;
        }

        let slot = match field {
            Field::Title => &mut self.entry.title,
            Field::Link => &mut self.entry.link,
            Field::Summary => &mut self.entry.summary,
            Field::Content => &mut self.content,
            Field::Published => &mut self.entry.dates.published,
            Field::Updated => &mut self.entry.dates.updated,
            Field::Created => &mut self.entry.dates.created,
        };
        // first occurrence wins
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn finish(mut self) -> FeedEntry {
        if self.entry.summary.is_none() {
            self.entry.summary = self.content.take();
        }
        self.entry
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Unknown entities (`&nbsp;` is common in RSS) fail XML unescaping; keep the
/// raw text then and let the HTML stripper decode it later.
fn text_of(t: &BytesText<'_>) -> String {
    match t.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(t).into_owned(),
    }
}

fn is_entry(name: &str) -> bool {
    name == "item" || name == "entry"
}

fn is_feed_root(name: &str) -> bool {
    matches!(name, "rss" | "feed" | "RDF")
}

/// Parse an RSS or Atom document into entries, in document order.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] for malformed XML and [`FeedError::NotAFeed`]
/// when the root element is not `rss`, `feed` or `rdf:RDF`.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut root_seen = false;
    let mut depth = 0usize;
    let mut current: Option<EntryBuilder> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                let name = local_name(&e);
                if depth == 1 {
                    if !is_feed_root(&name) {
                        return Err(FeedError::NotAFeed);
                    }
                    root_seen = true;
                }
                match current.as_mut() {
                    None if is_entry(&name) => current = Some(EntryBuilder::new(depth)),
                    Some(b) if depth == b.depth + 1 => b.open_field(&e),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    return Err(FeedError::NotAFeed);
                }
                if let Some(b) = current.as_mut().filter(|b| depth == b.depth) {
                    b.empty_field(&e);
                }
            }
            Event::Text(t) => {
                if let Some(b) = current.as_mut().filter(|b| depth == b.depth + 1) {
                    b.push_text(&text_of(&t));
                }
            }
            Event::CData(c) => {
                if let Some(b) = current.as_mut().filter(|b| depth == b.depth + 1) {
                    b.push_text(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                match current.as_ref().map(|b| b.depth) {
                    Some(d) if depth == d + 1 => {
                        if let Some(b) = current.as_mut() {
                            b.close_field();
                        }
                    }
                    Some(d) if depth == d => {
                        if let Some(done) = current.take() {
                            entries.push(done.finish());
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(FeedError::NotAFeed);
    }
    Ok(entries)
}
