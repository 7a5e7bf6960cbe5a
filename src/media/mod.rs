//! Media objects as listed by a camera's ContentDirectory, and the logical
//! items (one shot or one clip) the sync engine works on.

mod grouping;
#[cfg(test)]
mod tests;

pub use grouping::group_page;

use std::fmt;

/// File extensions produced by camera RAW formats
const RAW_EXTENSIONS: &[&str] = &[
    "rw2", "arw", "cr2", "cr3", "nef", "orf", "raf", "dng", "pef", "srw",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaClass {
    Image,
    Video,
}

impl MediaClass {
    /// Map a `upnp:class` value; returns `None` for anything we do not fetch
    pub fn from_upnp_class(class: &str) -> Option<Self> {
        let class = class.trim();
        if class.starts_with("object.item.imageItem") {
            Some(MediaClass::Image)
        } else if class.starts_with("object.item.videoItem") {
            Some(MediaClass::Video)
        } else {
            None
        }
    }
}

/// One `<res>` element of a DIDL-Lite item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub uri: String,
    pub size: Option<u64>,
    pub protocol_info: Option<String>,
}

impl Resource {
    pub fn new<S: Into<String>>(uri: S) -> Self {
        Self {
            uri: uri.into(),
            size: None,
            protocol_info: None,
        }
    }

    /// MIME type from the third field of `protocolInfo`
    pub fn mime_type(&self) -> Option<&str> {
        self.protocol_info
            .as_deref()
            .and_then(|info| info.split(':').nth(2))
            .filter(|mime| !mime.is_empty() && *mime != "*")
    }

    /// Last path segment of the URI, without query string
    pub fn file_name(&self) -> &str {
        file_name_from_url(&self.uri)
    }

    pub fn is_raw(&self) -> bool {
        let by_extension = extension(self.file_name())
            .map(|ext| RAW_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        let by_mime = self
            .mime_type()
            .map(|mime| {
                let mime = mime.to_ascii_lowercase();
                mime.contains("raw") || mime.contains("rw2")
            })
            .unwrap_or(false);
        by_extension || by_mime
    }

    fn is_thumbnail(&self) -> bool {
        self.protocol_info
            .as_deref()
            .map(|info| info.contains("_TN") || info.contains("JPEG_SM"))
            .unwrap_or(false)
    }
}

/// One entry returned by a Browse call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub id: String,
    pub title: String,
    pub class: MediaClass,
    pub resources: Vec<Resource>,
}

impl RemoteObject {
    /// The resource worth downloading: the largest full-size rendition,
    /// preferring `video/*` for clips. Ties keep device order.
    pub fn primary_resource(&self) -> Option<&Resource> {
        let candidates: Vec<&Resource> = match self.class {
            MediaClass::Video => {
                let videos: Vec<&Resource> = self
                    .resources
                    .iter()
                    .filter(|res| res.mime_type().map_or(false, |m| m.starts_with("video/")))
                    .collect();
                if videos.is_empty() {
                    self.resources.iter().collect()
                } else {
                    videos
                }
            }
            MediaClass::Image => {
                let full: Vec<&Resource> =
                    self.resources.iter().filter(|res| !res.is_thumbnail()).collect();
                if full.is_empty() {
                    self.resources.iter().collect()
                } else {
                    full
                }
            }
        };

        let mut best: Option<&Resource> = None;
        for candidate in candidates {
            best = match best {
                Some(current) if candidate.size.unwrap_or(0) <= current.size.unwrap_or(0) => {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }
        best
    }

    pub fn is_raw(&self) -> bool {
        self.class == MediaClass::Image && self.primary_resource().map_or(false, Resource::is_raw)
    }

    /// Grouping key shared by the JPEG and RAW renditions of one shot
    pub fn base_key(&self) -> String {
        let source = if self.title.trim().is_empty() {
            self.primary_resource().map(Resource::file_name).unwrap_or(&self.id)
        } else {
            self.title.trim()
        };
        strip_extension(source).to_ascii_uppercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

/// The unit the engine fetches and deletes: a photo (JPEG and/or RAW) or a
/// video. Counted once toward "files fetched" whatever its constituents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalMediaItem {
    key: String,
    kind: MediaKind,
    constituents: Vec<RemoteObject>,
}

impl LogicalMediaItem {
    pub fn single(object: RemoteObject) -> Self {
        let kind = match object.class {
            MediaClass::Image => MediaKind::Photo,
            MediaClass::Video => MediaKind::Video,
        };
        Self {
            key: object.base_key(),
            kind,
            constituents: vec![object],
        }
    }

    /// A JPEG+RAW pair; callers guarantee both are images of the same shot
    pub fn pair(first: RemoteObject, second: RemoteObject) -> Self {
        Self {
            key: first.base_key(),
            kind: MediaKind::Photo,
            constituents: vec![first, second],
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn constituents(&self) -> &[RemoteObject] {
        &self.constituents
    }

    pub fn object_ids(&self) -> impl Iterator<Item = &str> {
        self.constituents.iter().map(|object| object.id.as_str())
    }

    pub fn has_raw(&self) -> bool {
        self.constituents.iter().any(RemoteObject::is_raw)
    }

    /// The non-RAW image of a photo, used to probe for unlisted RAW siblings
    pub fn jpeg(&self) -> Option<&RemoteObject> {
        match self.kind {
            MediaKind::Photo => self.constituents.iter().find(|object| !object.is_raw()),
            MediaKind::Video => None,
        }
    }
}

impl fmt::Display for LogicalMediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MediaKind::Photo if self.constituents.len() > 1 => "Photo+RAW",
            MediaKind::Photo => "Photo",
            MediaKind::Video => "Video",
        };
        write!(f, "<{}: {}>", kind, self.key)
    }
}

pub fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

pub fn extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Replace the extension of the file name in `url`
pub fn replace_url_extension(url: &str, new_extension: &str) -> Option<String> {
    let name = file_name_from_url(url);
    let ext = extension(name)?;
    let path_end = url.find(['?', '#']).unwrap_or(url.len());
    let name_start = path_end - name.len();
    let ext_start = name_start + name.len() - ext.len();
    let mut replaced = String::with_capacity(url.len());
    replaced.push_str(&url[..ext_start]);
    replaced.push_str(new_extension);
    replaced.push_str(&url[name_start + name.len()..]);
    Some(replaced)
}
