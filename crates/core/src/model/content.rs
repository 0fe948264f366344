use thiserror::Error;
use url::Url;

use crate::model::ids::DayNumber;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content URL cannot be empty")]
    EmptyUrl,

    #[error("content URL is not a valid URL")]
    InvalidUrl,

    #[error("uploaded file name cannot be empty")]
    EmptyFileName,

    #[error("uploaded file has no data")]
    EmptyFileData,
}

//
// ─── CONTENT ITEMS ─────────────────────────────────────────────────────────────
//

/// Kind discriminant for persisted content items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentItemKind {
    VideoLink,
    DocumentLink,
    DocumentUpload,
    AudioUpload,
}

impl ContentItemKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentItemKind::VideoLink => "video_link",
            ContentItemKind::DocumentLink => "document_link",
            ContentItemKind::DocumentUpload => "document_upload",
            ContentItemKind::AudioUpload => "audio_upload",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "video_link" => Some(ContentItemKind::VideoLink),
            "document_link" => Some(ContentItemKind::DocumentLink),
            "document_upload" => Some(ContentItemKind::DocumentUpload),
            "audio_upload" => Some(ContentItemKind::AudioUpload),
            _ => None,
        }
    }
}

/// One media item attached to a day: an external link, or an uploaded file
/// embedded whole so the stored day stays self-contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    VideoLink { url: Url },
    DocumentLink { url: Url },
    DocumentUpload { name: String, data: Vec<u8> },
    AudioUpload { name: String, data: Vec<u8> },
}

impl ContentItem {
    #[must_use]
    pub fn kind(&self) -> ContentItemKind {
        match self {
            ContentItem::VideoLink { .. } => ContentItemKind::VideoLink,
            ContentItem::DocumentLink { .. } => ContentItemKind::DocumentLink,
            ContentItem::DocumentUpload { .. } => ContentItemKind::DocumentUpload,
            ContentItem::AudioUpload { .. } => ContentItemKind::AudioUpload,
        }
    }

    /// Display label: the link target or the uploaded file name.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            ContentItem::VideoLink { url } | ContentItem::DocumentLink { url } => url.as_str(),
            ContentItem::DocumentUpload { name, .. } | ContentItem::AudioUpload { name, .. } => {
                name
            }
        }
    }

    /// Embeddable player URL for known video hosts (`youtu.be` short links
    /// and `youtube.com` watch links). `None` for other links and for
    /// non-video items.
    #[must_use]
    pub fn embed_url(&self) -> Option<Url> {
        match self {
            ContentItem::VideoLink { url } => video_embed_url(url),
            _ => None,
        }
    }
}

fn video_embed_url(url: &Url) -> Option<Url> {
    let host = url.host_str()?;
    if host == "youtu.be" {
        let id = url.path().trim_start_matches('/');
        if id.is_empty() {
            return None;
        }
        return Url::parse(&format!("https://www.youtube.com/embed/{id}")).ok();
    }
    if host == "youtube.com" || host == "www.youtube.com" {
        let id = url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?;
        return Url::parse(&format!("https://www.youtube.com/embed/{id}")).ok();
    }
    None
}

//
// ─── DRAFT (unvalidated admin input) ───────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItemDraft {
    VideoLink { url: String },
    DocumentLink { url: String },
    DocumentUpload { name: String, data: Vec<u8> },
    AudioUpload { name: String, data: Vec<u8> },
}

impl ContentItemDraft {
    /// Validate the draft into a persisted content item.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if a link is empty or unparsable, or if an
    /// upload has an empty name or no data.
    pub fn validate(self) -> Result<ContentItem, ContentError> {
        match self {
            ContentItemDraft::VideoLink { url } => Ok(ContentItem::VideoLink {
                url: parse_link(&url)?,
            }),
            ContentItemDraft::DocumentLink { url } => Ok(ContentItem::DocumentLink {
                url: parse_link(&url)?,
            }),
            ContentItemDraft::DocumentUpload { name, data } => {
                let (name, data) = validate_upload(name, data)?;
                Ok(ContentItem::DocumentUpload { name, data })
            }
            ContentItemDraft::AudioUpload { name, data } => {
                let (name, data) = validate_upload(name, data)?;
                Ok(ContentItem::AudioUpload { name, data })
            }
        }
    }
}

fn parse_link(raw: &str) -> Result<Url, ContentError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ContentError::EmptyUrl);
    }
    Url::parse(raw).map_err(|_| ContentError::InvalidUrl)
}

fn validate_upload(name: String, data: Vec<u8>) -> Result<(String, Vec<u8>), ContentError> {
    let name = name.trim().to_owned();
    if name.is_empty() {
        return Err(ContentError::EmptyFileName);
    }
    if data.is_empty() {
        return Err(ContentError::EmptyFileData);
    }
    Ok((name, data))
}

//
// ─── DAY CONTENT ───────────────────────────────────────────────────────────────
//

/// Learning content for one numbered day of the program.
///
/// A day may be saved with an empty item list; viewers show a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayContent {
    day: DayNumber,
    date_label: Option<String>,
    items: Vec<ContentItem>,
}

impl DayContent {
    #[must_use]
    pub fn new(day: DayNumber, date_label: Option<String>, items: Vec<ContentItem>) -> Self {
        let date_label = date_label
            .map(|label| label.trim().to_owned())
            .filter(|label| !label.is_empty());
        Self {
            day,
            date_label,
            items,
        }
    }

    #[must_use]
    pub fn day(&self) -> DayNumber {
        self.day
    }

    /// Free-form subtitle for the day card ("Aug 21").
    #[must_use]
    pub fn date_label(&self) -> Option<&str> {
        self.date_label.as_deref()
    }

    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
