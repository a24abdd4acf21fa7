use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::FileType;

/// Parsed glTF scene descriptor
///
/// Only the parts the bundler rewrites are typed. Every top-level key is kept in `fields` in
/// source order, so serializing refreshes `buffers` and `images` in place and leaves the rest of
/// the document as it was.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Descriptor {
  pub buffers: Vec<BufferEntry>,

  /// A `null` entry keeps its index but has no image
  pub images: Vec<Option<ImageEntry>>,

  fields: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct BufferEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub uri: Option<String>,

  #[serde(flatten)]
  pub rest: Map<String, Value>,
}

impl BufferEntry {
  /// Uri of a buffer stored as a separate `.bin` file next to the descriptor
  pub fn external_uri(&self) -> Option<&str> {
    self
      .uri
      .as_deref()
      .filter(|uri| !is_data_uri(uri) && FileType::from_path(uri) == FileType::Bin)
  }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ImageEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub uri: Option<String>,

  #[serde(flatten)]
  pub rest: Map<String, Value>,
}

impl ImageEntry {
  /// Uri of an image stored as a file on disk
  pub fn external_uri(&self) -> Option<&str> {
    self.uri.as_deref().filter(|uri| !is_data_uri(uri))
  }
}

fn is_data_uri(uri: &str) -> bool {
  uri.starts_with("data:")
}

impl Descriptor {
  pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
    let fields: Map<String, Value> = serde_json::from_slice(bytes)?;

    let buffers = match fields.get("buffers") {
      Some(buffers) => Vec::<BufferEntry>::deserialize(buffers)?,
      None => Vec::new(),
    };
    let images = match fields.get("images") {
      Some(images) => Vec::<Option<ImageEntry>>::deserialize(images)?,
      None => Vec::new(),
    };

    Ok(Self {
      buffers,
      images,
      fields,
    })
  }

  /// Top-level value as parsed from the source
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.fields.get(key)
  }

  /// Two-space indented JSON, as written next to the bundle
  pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&self.to_value()?)
  }

  /// Single-line JSON, as embedded into a module
  pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(&self.to_value()?)
  }

  fn to_value(&self) -> Result<Value, serde_json::Error> {
    let mut fields = self.fields.clone();

    // An absent `buffers` key stays absent, while `images` always ends up as an array
    if fields.contains_key("buffers") || !self.buffers.is_empty() {
      fields.insert(String::from("buffers"), serde_json::to_value(&self.buffers)?);
    }
    fields.insert(String::from("images"), serde_json::to_value(&self.images)?);

    Ok(Value::Object(fields))
  }
}
