//! Scraping of HTML pages.
//!
//! This is not a general purpose HTML parser:
//! it only extracts the title, the `description` meta element, and the `<a href>` links of a page.
use lazy_static::lazy_static;
use quick_xml::escape::unescape_with;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").unwrap();
    static ref META: Regex = Regex::new(r"(?is)<meta\s([^>]*)>").unwrap();
    static ref ANCHOR: Regex = Regex::new(r"(?is)<a\s([^>]*)>(.*?)</a\s*>").unwrap();
    static ref ATTRIBUTE: Regex =
        Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
            .unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
}

/// The information scraped from a web page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// The URL of the page, without fragment.
    pub url: Url,
    pub title: Option<String>,
    pub description: Option<String>,
    /// The links of the page, in document order, without duplicates.
    pub links: Vec<Link>,
}

/// A link found in a [`Page`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// The absolute URL of the link target, without fragment.
    pub url: Url,
    /// The text of the link, with tags removed and whitespace collapsed.
    pub text: String,
}

impl Page {
    /// Scrape `html`, resolving links against `base`.
    ///
    /// Only links to `http`, `https` and `file` URLs are kept;
    /// links differing only by their fragment are considered the same.
    pub fn parse(base: &Url, html: &str) -> Self {
        let mut url = base.clone();
        url.set_fragment(None);

        let title = TITLE
            .captures(html)
            .map(|c| clean_text(&c[1]))
            .filter(|t| !t.is_empty());

        let description = META
            .captures_iter(html)
            .map(|c| attributes(c.get(1).map_or("", |m| m.as_str())))
            .find(|attrs| {
                attrs
                    .iter()
                    .any(|(k, v)| k == "name" && v.eq_ignore_ascii_case("description"))
            })
            .and_then(|attrs| attrs.into_iter().find(|(k, _)| k == "content"))
            .map(|(_, v)| clean_text(&v))
            .filter(|d| !d.is_empty());

        let mut links: Vec<Link> = Vec::new();
        for c in ANCHOR.captures_iter(html) {
            let Some(href) = attributes(&c[1])
                .into_iter()
                .find(|(k, _)| k == "href")
                .map(|(_, v)| v)
            else {
                continue;
            };
            let Ok(mut target) = base.join(href.trim()) else {
                log::debug!("ignoring invalid link {href:?}");
                continue;
            };
            if !matches!(target.scheme(), "http" | "https" | "file") {
                continue;
            }
            target.set_fragment(None);
            let text = clean_text(&c[2]);
            match links.iter_mut().find(|l| l.url == target) {
                Some(known) => {
                    if known.text.is_empty() {
                        known.text = text;
                    }
                }
                None => links.push(Link { url: target, text }),
            }
        }
        log::debug!("found {} links in {url}", links.len());

        Page {
            url,
            title,
            description,
            links,
        }
    }

    /// Keep only the links whose URL matches `pattern`.
    pub fn retain_links(&mut self, pattern: &Regex) {
        self.links.retain(|l| pattern.is_match(l.url.as_str()));
    }
}

/// Parse the attributes of a tag; names are lower-cased and values unescaped.
fn attributes(txt: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(txt)
        .map(|c| {
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map_or("", |m| m.as_str());
            (c[1].to_ascii_lowercase(), unescape(value))
        })
        .collect()
}

fn clean_text(html: &str) -> String {
    let txt = TAG.replace_all(html, " ");
    let txt = SPACES.replace_all(&txt, " ");
    unescape(txt.trim())
}

/// Decode character references, keeping `txt` as is if it holds a stray `&`.
fn unescape(txt: &str) -> String {
    match unescape_with(txt, html_entity) {
        Ok(txt) => txt.into_owned(),
        Err(err) => {
            log::debug!("keeping {txt:?} undecoded: {err}");
            txt.to_string()
        }
    }
}

/// The XML entities, and the HTML ones usual in titles and link texts.
fn html_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        _ => return None,
    })
}
