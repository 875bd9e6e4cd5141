// src/ingest/feed.rs
//! Syndication markup: RSS 2.0 (`<rss><channel><item>`) and Atom (`<feed><entry>`).
//! Both variants are flattened into `FeedEntry`, which the RSS and arXiv providers map
//! into `NewsItem`s.
//!
//! Entries are read with a namespace-aware event walk. A child element only counts when
//! it lives in the same namespace as the document root, so extension elements such as
//! `<media:title>`, `<dc:title>` or `<atom:link>` inside an RSS item never shadow the
//! real fields. The first non-empty value of each field wins.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Reader};
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime, UtcOffset,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Rss,
    Atom,
}

impl FeedKind {
    fn entry_tag(self) -> &'static [u8] {
        match self {
            FeedKind::Rss => b"item",
            FeedKind::Atom => b"entry",
        }
    }
}

/// One raw entry, before validation. Fields are trimmed; empty strings become `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
}

/// Root element decides the variant.
pub fn detect_kind(xml: &str) -> Option<FeedKind> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return match e.local_name().as_ref() {
                    b"rss" => Some(FeedKind::Rss),
                    b"feed" => Some(FeedKind::Atom),
                    _ => None,
                };
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Parse either variant into entries, in document order.
pub fn parse_entries(xml: &str) -> Result<Vec<FeedEntry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    match detect_kind(&xml_clean) {
        Some(kind) => read_entries(&xml_clean, kind)
            .with_context(|| format!("parsing {kind:?} xml").to_lowercase()),
        None => bail!("document is neither RSS nor Atom"),
    }
}

// Owned form of a resolved namespace, so it can outlive the reader borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Ns {
    Unbound,
    Uri(Vec<u8>),
    Undeclared,
}

impl From<&ResolveResult<'_>> for Ns {
    fn from(r: &ResolveResult<'_>) -> Self {
        match r {
            ResolveResult::Unbound => Ns::Unbound,
            ResolveResult::Bound(ns) => Ns::Uri(ns.0.to_vec()),
            ResolveResult::Unknown(_) => Ns::Undeclared,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Id,
    Title,
    Link,
    Published,
    Updated,
    Summary,
}

// Entry being read; `depth` is the nesting level of its own start tag.
#[derive(Debug, Default)]
struct Pending {
    depth: usize,
    field: Option<Field>,
    buf: String,
    id: Option<String>,
    title: Option<String>,
    link: Option<String>,
    alternate: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<String>,
}

impl Pending {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    fn open(&mut self, kind: FeedKind, e: &BytesStart<'_>) {
        self.buf.clear();
        self.field = match (kind, e.local_name().as_ref()) {
            (FeedKind::Rss, b"guid") | (FeedKind::Atom, b"id") => Some(Field::Id),
            (_, b"title") => Some(Field::Title),
            (FeedKind::Rss, b"link") => Some(Field::Link),
            (FeedKind::Rss, b"pubDate") | (FeedKind::Atom, b"published") => {
                Some(Field::Published)
            }
            (FeedKind::Atom, b"updated") => Some(Field::Updated),
            (FeedKind::Rss, b"description") | (FeedKind::Atom, b"summary") => {
                Some(Field::Summary)
            }
            (FeedKind::Atom, b"link") => {
                self.atom_link(e);
                None
            }
            _ => None,
        };
    }

    // Prefer rel="alternate" (or no rel, which means alternate), else the first href.
    fn atom_link(&mut self, e: &BytesStart<'_>) {
        let attr = |name: &str| {
            e.try_get_attribute(name)
                .ok()
                .flatten()
                .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
        };
        let Some(href) = non_empty(attr("href")) else {
            return;
        };
        if matches!(attr("rel").as_deref(), None | Some("alternate")) {
            self.alternate.get_or_insert_with(|| href.clone());
        }
        self.link.get_or_insert(href);
    }

    fn push_text(&mut self, text: &str) {
        if self.field.is_some() {
            self.buf.push_str(text);
        }
    }

    fn close(&mut self) {
        let Some(field) = self.field.take() else {
            return;
        };
        let slot = match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Summary => &mut self.summary,
        };
        if slot.is_none() {
            *slot = non_empty(Some(std::mem::take(&mut self.buf)));
        }
    }

    fn finish(self) -> FeedEntry {
        FeedEntry {
            id: self.id,
            title: self.title,
            link: self.alternate.or(self.link),
            published: self.published.or(self.updated),
            summary: self.summary,
        }
    }
}

fn read_entries(xml: &str, kind: FeedKind) -> Result<Vec<FeedEntry>> {
    let mut reader = NsReader::from_str(xml);
    let mut root_ns: Option<Ns> = None;
    let mut depth = 0usize;
    let mut current: Option<Pending> = None;
    let mut out = Vec::new();

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let ns = Ns::from(&resolved);
        match event {
            Event::Start(e) => {
                depth += 1;
                let own = ns == *root_ns.get_or_insert_with(|| ns.clone());
                match current.as_mut() {
                    None if own && e.local_name().as_ref() == kind.entry_tag() => {
                        current = Some(Pending::new(depth));
                    }
                    Some(p) if own && depth == p.depth + 1 => p.open(kind, &e),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let own = ns == *root_ns.get_or_insert_with(|| ns.clone());
                if let Some(p) = current.as_mut() {
                    if own && depth == p.depth {
                        p.open(kind, &e);
                        p.close();
                    }
                }
            }
            Event::Text(t) => {
                if let Some(p) = current.as_mut() {
                    // Leftover HTML entities stay raw; titles are entity-decoded later.
                    match t.unescape() {
                        Ok(s) => p.push_text(&s),
                        Err(_) => p.push_text(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Event::CData(c) => {
                if let Some(p) = current.as_mut() {
                    p.push_text(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                if let Some(p) = current.as_mut() {
                    if depth == p.depth {
                        if let Some(done) = current.take() {
                            out.push(done.finish());
                        }
                    } else if depth == p.depth + 1 {
                        p.close();
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Spellings the strict parsers reject but feeds still emit (full month names).
const LOOSE_DATE_FORMATS: &[&str] = &[
    "%a, %d %B %Y %H:%M:%S %z",
    "%d %B %Y %H:%M:%S %z",
    "%a, %d %B %Y %H:%M %z",
];

/// Publish date as a UTC calendar day. Accepts RFC 2822 (RSS), RFC 3339 (Atom),
/// RFC 2822 with full month names and a bare `YYYY-MM-DD` prefix.
pub fn parse_feed_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    let numeric = rfc2822_numeric_zone(t);
    let dt = OffsetDateTime::parse(&numeric, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(t, &Rfc3339))
        .ok();
    if let Some(dt) = dt {
        let utc = dt.to_offset(UtcOffset::UTC);
        return NaiveDate::from_ymd_opt(utc.year(), u8::from(utc.month()) as u32, utc.day() as u32);
    }
    if let Some(d) = LOOSE_DATE_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(&numeric, f).ok())
    {
        return Some(d.with_timezone(&Utc).date_naive());
    }
    t.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

// Named UTC zones are common in feeds; the parser is happiest with numeric offsets.
fn rfc2822_numeric_zone(s: &str) -> String {
    for zone in [" GMT", " UTC", " UT", " Z"] {
        if let Some(head) = s.strip_suffix(zone) {
            return format!("{head} +0000");
        }
    }
    s.to_string()
}

// Feeds routinely use HTML-only entities that XML rejects.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
