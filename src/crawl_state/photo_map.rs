//! Insertion-ordered, grow-only map of fetched photos.
//!
//! Serialises as a plain JSON object `{ "<fbid>": { "url", "imageUrl", "caption" } }`
//! whose key order is discovery order. The export step and the resume logic
//! both rely on "last entry = current frontier", so the order must survive a
//! round trip through a RecoveryLog file.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// One successfully extracted photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// Stable photo identifier; the map key, so it is not repeated in the value.
    #[serde(skip)]
    pub id: String,
    /// Viewer URL the photo was extracted from.
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(alias = "imgUrl")]
    pub image_url: String,
    #[serde(alias = "complementary", default)]
    pub caption: String,
}

impl PhotoRecord {
    pub fn new(
        id: impl Into<String>,
        source_url: impl Into<String>,
        image_url: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            image_url: image_url.into(),
            caption: caption.into(),
        }
    }
}

/// Photo id -> record, iterated in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoMap {
    records: Vec<PhotoRecord>,
    index: HashMap<String, usize>,
}

impl PhotoMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record unless its id is already present.
    ///
    /// Returns `false` (and leaves the map untouched) for a known id or an
    /// empty image URL; the map never holds a photo that was not fully
    /// extracted.
    pub fn insert(&mut self, record: PhotoRecord) -> bool {
        if record.image_url.is_empty() || self.index.contains_key(&record.id) {
            return false;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PhotoRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Most recently discovered record (the crawl frontier).
    #[must_use]
    pub fn last(&self) -> Option<&PhotoRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }
}

impl Serialize for PhotoMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.id, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PhotoMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PhotoMapVisitor;

        impl<'de> Visitor<'de> for PhotoMapVisitor {
            type Value = PhotoMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping photo ids to photo records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PhotoMap, A::Error> {
                let mut photos = PhotoMap::new();
                while let Some((id, mut record)) = access.next_entry::<String, PhotoRecord>()? {
                    record.id = id;
                    // Records without an image were never valid entries; drop them
                    // rather than poison the resume logic.
                    photos.insert(record);
                }
                Ok(photos)
            }
        }

        deserializer.deserialize_map(PhotoMapVisitor)
    }
}
