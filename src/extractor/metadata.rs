//! Product metadata documents
//!
//! The product JSON document has changed shape across site revisions. Older
//! documents list only image captions and leave the URLs to the rendered page;
//! current documents embed `original` and `resized` URLs for every image. Which
//! shape a document has is decided once, here, and recorded as an [`ImageLayout`].

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Field always dropped from product documents
const TAG_BANNERS: &str = "tag_banners";

/// One image of a product, in whichever shape the document provided
#[derive(Debug, Clone, PartialEq)]
pub enum ImageEntry {
    /// Caption from the JSON document, URL scraped from the rendered page
    Scraped {
        /// Image caption, if the seller set one
        caption: Option<String>,
        /// Image URL
        url: String,
    },
    /// Image with URLs embedded in the JSON document
    Embedded {
        /// Image caption, if the seller set one
        caption: Option<String>,
        /// URL of the stored upload, usually a `_base_resized` variant
        original: String,
        /// URL of the thumbnail-sized variant
        resized: Option<String>,
        /// The entry exactly as the document had it
        raw: Value,
    },
}

impl ImageEntry {
    /// Caption of the image, whichever shape it came in
    pub fn caption(&self) -> Option<&str> {
        match self {
            ImageEntry::Scraped { caption, .. } | ImageEntry::Embedded { caption, .. } => {
                caption.as_deref()
            }
        }
    }
}

/// Normalized metadata of one product.
///
/// Holds every site-defined field of the document except `tag_banners` and
/// `images`, with `tags` flattened to a list of names.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMetadata {
    product_id: String,
    fields: Map<String, Value>,
    images: Vec<ImageEntry>,
}

impl ProductMetadata {
    /// Assemble metadata from cleaned fields and resolved images
    pub fn new(
        product_id: impl Into<String>,
        fields: Map<String, Value>,
        images: Vec<ImageEntry>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            fields,
            images,
        }
    }

    /// Id the product was requested under
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Site-defined fields, without `images`
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a single site-defined field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Tag names in document order
    pub fn tags(&self) -> Vec<&str> {
        self.fields
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Images in document order
    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }
}

impl Serialize for ProductMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// How a document delivers its images
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ImageLayout {
    /// Every entry carries its own URLs
    Embedded(Vec<ImageEntry>),
    /// Only captions; URLs must be scraped from the rendered page
    Captions(Vec<Option<String>>),
}

/// A product document after field clean-up, before image URLs are resolved
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProductDocument {
    pub(crate) fields: Map<String, Value>,
    pub(crate) layout: ImageLayout,
}

#[derive(Debug, Deserialize)]
struct EmbeddedImage {
    original: String,
    #[serde(default)]
    resized: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

impl ProductDocument {
    /// Clean up a raw product document and classify its images.
    pub(crate) fn parse(mut fields: Map<String, Value>) -> Result<Self> {
        fields.remove(TAG_BANNERS);

        let tags = flatten_tags(fields.get("tags"))?;
        fields.insert("tags".to_string(), tags);

        let images = match fields.remove("images") {
            Some(Value::Array(images)) => images,
            Some(_) => {
                return Err(Error::MalformedMetadata(
                    "`images` is not a list".to_string(),
                ));
            }
            None => {
                return Err(Error::MalformedMetadata(
                    "missing `images` field".to_string(),
                ));
            }
        };

        Ok(Self {
            fields,
            layout: classify_images(images)?,
        })
    }
}

fn flatten_tags(tags: Option<&Value>) -> Result<Value> {
    let tags = tags.ok_or_else(|| Error::MalformedMetadata("missing `tags` field".to_string()))?;
    let tags: Vec<Tag> = serde_json::from_value(tags.clone()).map_err(|e| {
        Error::MalformedMetadata(format!("`tags` is not a list of named tags: {e}"))
    })?;

    Ok(Value::Array(
        tags.into_iter().map(|tag| Value::String(tag.name)).collect(),
    ))
}

fn classify_images(images: Vec<Value>) -> Result<ImageLayout> {
    let embedded = images
        .iter()
        .filter(|image| image.get("original").is_some_and(Value::is_string))
        .count();

    if embedded == images.len() {
        images
            .into_iter()
            .map(embedded_entry)
            .collect::<Result<Vec<_>>>()
            .map(ImageLayout::Embedded)
    } else if embedded == 0 {
        images
            .iter()
            .map(caption)
            .collect::<Result<Vec<_>>>()
            .map(ImageLayout::Captions)
    } else {
        Err(Error::MalformedMetadata(format!(
            "{embedded} of {} images carry URLs, expected all or none",
            images.len()
        )))
    }
}

fn embedded_entry(raw: Value) -> Result<ImageEntry> {
    let caption = caption(&raw)?;
    let image: EmbeddedImage = serde_json::from_value(raw.clone())
        .map_err(|e| Error::MalformedMetadata(format!("invalid image entry: {e}")))?;

    Ok(ImageEntry::Embedded {
        caption,
        original: image.original,
        resized: image.resized,
        raw,
    })
}

/// The `caption` of an image entry. The key must be present; `null` means no caption.
fn caption(image: &Value) -> Result<Option<String>> {
    let entry = image.as_object().ok_or_else(|| {
        Error::MalformedMetadata(format!("image entry is not an object: {image}"))
    })?;

    match entry.get("caption") {
        Some(Value::String(caption)) => Ok(Some(caption.clone())),
        Some(Value::Null) => Ok(None),
        Some(other) => Err(Error::MalformedMetadata(format!(
            "image caption is not a string: {other}"
        ))),
        None => Err(Error::MalformedMetadata(format!(
            "image entry has no `caption`: {image}"
        ))),
    }
}
