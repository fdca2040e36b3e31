//! Newznab indexer emulation
//!
//! Answers the `/api` calls an indexer manager makes when a decoy indexer is
//! registered: a capabilities document and RSS search feeds whose items link
//! back to the NZB route. Nothing is looked up anywhere; every result is a
//! decoy derived from the query itself.

use crate::artifact::is_forbidden_char;
use crate::config::NewznabConfig;
use crate::nzb::NZB_CONTENT_TYPE;
use crate::synthesis::SynthesisError;
use crate::xml::XmlWriter;

/// MIME type of capabilities and feed documents.
pub const NEWZNAB_CONTENT_TYPE: &str = "application/xml";

const NEWZNAB_ATTR_NAMESPACE: &str = "http://www.newznab.com/DTD/2010/feeds/attributes/";
const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

const PUB_DATE: &str = "Tue, 25 Mar 2025 12:00:00 GMT";
const USENET_DATE: &str = "2025-03-25 12:00:00";
const ITEM_POSTER: &str = "user@example.com";
const ITEM_GROUP: &str = "alt.binaries.example";
const DEFAULT_ITEM_SIZE: u64 = 104_857_600;
const TV_SHOW_TITLE: &str = "Fake TV Show";

/// Top-level categories advertised in capabilities, with their subcategories.
const CATEGORIES: &[(&str, &str, &[(&str, &str)])] = &[
    ("2000", "Movies", &[]),
    ("3000", "Audio", &[("3030", "Audiobook"), ("3010", "MP3")]),
    ("5000", "TV", &[]),
];

/// Errors raised for requests the emulated API does not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewznabError {
    #[error("Invalid request: unsupported function {function:?}")]
    InvalidRequest { function: Option<String> },
}

/// The `t=` function of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewznabFunction {
    Caps,
    /// `search`, `movie` and `tvsearch` share one feed
    Search,
}

impl NewznabFunction {
    /// Parses the value of the `t` query parameter.
    ///
    /// # Errors
    /// - `NewznabError::InvalidRequest` - Missing or unknown function
    pub fn parse(function: Option<&str>) -> Result<Self, NewznabError> {
        match function {
            Some("caps") => Ok(Self::Caps),
            Some("search" | "movie" | "tvsearch") => Ok(Self::Search),
            other => Err(NewznabError::InvalidRequest {
                function: other.map(str::to_string),
            }),
        }
    }
}

/// Search parameters the feed reacts to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub imdbid: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
}

impl SearchQuery {
    fn is_empty(&self) -> bool {
        self.q.is_none() && self.imdbid.is_none() && self.season.is_none() && self.episode.is_none()
    }
}

/// A decoy result listed in a search feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoyRelease {
    pub title: String,
    pub size: u64,
    pub quality: String,
}

impl DecoyRelease {
    fn new(title: &str, size: u64) -> Self {
        Self {
            title: title.to_string(),
            size,
            quality: title.to_string(),
        }
    }
}

/// Renders the documents of the emulated indexer.
pub struct NewznabIndexer {
    config: NewznabConfig,
}

impl NewznabIndexer {
    pub fn new(config: NewznabConfig) -> Self {
        Self { config }
    }

    /// Answers an API call.
    ///
    /// # Errors
    /// - `SynthesisError::Encoding` - The XML writer failed
    pub fn respond(
        &self,
        function: NewznabFunction,
        query: &SearchQuery,
    ) -> Result<Vec<u8>, SynthesisError> {
        match function {
            NewznabFunction::Caps => self.capabilities(),
            NewznabFunction::Search => self.search(query),
        }
    }

    /// Builds the `t=caps` document.
    ///
    /// # Errors
    /// - `SynthesisError::Encoding` - The XML writer failed
    pub fn capabilities(&self) -> Result<Vec<u8>, SynthesisError> {
        let strapline = format!("{} Indexer", self.config.title);

        let mut xml = XmlWriter::new(None)?;
        xml.open("caps", &[])?;
        xml.empty(
            "server",
            &[
                ("appversion", env!("CARGO_PKG_VERSION")),
                ("version", "0.1"),
                ("title", self.config.title.as_str()),
                ("strapline", strapline.as_str()),
                ("url", self.config.base_url.as_str()),
            ],
        )?;
        xml.empty("limits", &[("max", "100"), ("default", "50")])?;
        xml.empty("registration", &[("available", "yes"), ("open", "no")])?;

        xml.open("searching", &[])?;
        xml.empty("search", &[("available", "yes"), ("supportedParams", "q")])?;
        xml.empty(
            "tv-search",
            &[
                ("available", "yes"),
                (
                    "supportedParams",
                    "q, imdbid, season, ep, tvdbid, traktid, rid, tvmazeid",
                ),
            ],
        )?;
        xml.empty(
            "movie-search",
            &[("available", "yes"), ("supportedParams", "q, imdbid")],
        )?;
        xml.empty(
            "audio-search",
            &[("available", "no"), ("supportedParams", "")],
        )?;
        xml.close("searching")?;

        xml.open("categories", &[])?;
        for &(id, name, subcats) in CATEGORIES {
            if subcats.is_empty() {
                xml.empty("category", &[("id", id), ("name", name)])?;
                continue;
            }
            xml.open("category", &[("id", id), ("name", name)])?;
            for &(id, name) in subcats {
                xml.empty("subcat", &[("id", id), ("name", name)])?;
            }
            xml.close("category")?;
        }
        xml.close("categories")?;

        xml.close("caps")?;
        Ok(xml.finish())
    }

    /// Decoy results for `query`.
    ///
    /// An empty query is the connection test indexer managers run and gets
    /// two sample items. A free-text query gets one item named after it,
    /// with control characters dropped so the title stays routable.
    /// Identifier-only lookups find nothing.
    pub fn releases(&self, query: &SearchQuery) -> Vec<DecoyRelease> {
        if query.is_empty() {
            return vec![
                DecoyRelease::new(TV_SHOW_TITLE, 500_000_000),
                DecoyRelease::new("Fake Movie", 1_500_000_000),
            ];
        }
        let q: Option<String> = query
            .q
            .as_deref()
            .map(|q| q.chars().filter(|&c| !is_forbidden_char(c)).collect());
        match q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => vec![DecoyRelease {
                title: q.to_string(),
                size: DEFAULT_ITEM_SIZE,
                quality: "Unknown Quality".to_string(),
            }],
            _ => Vec::new(),
        }
    }

    /// Link to the NZB served for `title`.
    pub fn nzb_url(&self, title: &str) -> String {
        format!(
            "{}/fake_nzb/{}.nzb",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(title)
        )
    }

    /// Builds the RSS feed for a search call.
    ///
    /// # Errors
    /// - `SynthesisError::Encoding` - The XML writer failed
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<u8>, SynthesisError> {
        let releases = self.releases(query);
        tracing::info!("Newznab search {:?}: {} results", query, releases.len());

        let channel_title = format!("{} Results", self.config.title);

        let mut xml = XmlWriter::new(None)?;
        xml.open(
            "rss",
            &[
                ("version", "2.0"),
                ("xmlns:atom", ATOM_NAMESPACE),
                ("xmlns:newznab", NEWZNAB_ATTR_NAMESPACE),
            ],
        )?;
        xml.open("channel", &[])?;
        xml.text_element("title", &[], &channel_title)?;
        xml.text_element("description", &[], "Decoy indexer feed")?;
        xml.text_element("link", &[], &self.config.base_url)?;
        xml.text_element("language", &[], "en-us")?;

        for release in &releases {
            let url = self.nzb_url(&release.title);
            let size = release.size.to_string();
            let (category, category_id) = if release.title == TV_SHOW_TITLE || query.season.is_some() {
                ("TV", "5000")
            } else {
                ("Movies", "2000")
            };

            xml.open("item", &[])?;
            xml.text_element("title", &[], &release.title)?;
            xml.text_element("description", &[], &release.title)?;
            xml.text_element("link", &[], &url)?;
            xml.text_element("guid", &[("isPermaLink", "true")], &url)?;
            xml.text_element("pubDate", &[], PUB_DATE)?;
            xml.text_element("category", &[], category)?;
            xml.empty(
                "enclosure",
                &[
                    ("url", url.as_str()),
                    ("length", size.as_str()),
                    ("type", NZB_CONTENT_TYPE),
                ],
            )?;

            let attributes = [
                ("category", category_id),
                ("size", size.as_str()),
                ("grabs", "0"),
                ("usenetdate", USENET_DATE),
                ("poster", ITEM_POSTER),
                ("group", ITEM_GROUP),
                ("quality", release.quality.as_str()),
            ];
            for (name, value) in attributes {
                xml.empty("newznab:attr", &[("name", name), ("value", value)])?;
            }
            xml.close("item")?;
        }

        xml.close("channel")?;
        xml.close("rss")?;
        Ok(xml.finish())
    }
}
