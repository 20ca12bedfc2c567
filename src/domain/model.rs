//! Blockscape map model
//!
//! A [`Model`] is an ordered list of [`Category`] nodes, each holding
//! [`Item`] leaves. Field order on these structs is the serialized key order.
//!
//! Canonical JSON uses 2-space indentation and escapes every non-ASCII
//! character as `\uXXXX` (surrogate pairs above the BMP), so outputs are
//! byte-stable regardless of the source document's encoding.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};

/// Smallest number of items a category may hold
pub const MIN_ITEMS: usize = 2;

/// Largest number of items a category may hold
pub const MAX_ITEMS: usize = 6;

/// Lowest stage value (novel, experimental)
pub const MIN_STAGE: u8 = 1;

/// Highest stage value (commodity)
pub const MAX_STAGE: u8 = 4;

/// Full map for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub categories: Vec<Category>,
}

/// A named group of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub items: Vec<Item>,
}

/// A leaf concept within a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<u8>,
    #[serde(default)]
    pub deps: Vec<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stage: None,
            deps: Vec::new(),
        }
    }
}

impl Category {
    /// Ids of the first `n` items, in order
    pub fn leading_ids(&self, n: usize) -> Vec<String> {
        self.items.iter().take(n).map(|item| item.id.clone()).collect()
    }
}

impl Model {
    /// Iterates over every item in category order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    /// Serializes to canonical JSON
    pub fn to_canonical_json(&self) -> String {
        to_canonical_json(self)
    }
}

/// Result of one generation run: a single map or a Current/Target series
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutput {
    Single(Model),
    Series([Model; 2]),
}

impl MapOutput {
    /// The generated models in output order
    pub fn models(&self) -> &[Model] {
        match self {
            MapOutput::Single(model) => std::slice::from_ref(model),
            MapOutput::Series(models) => models.as_slice(),
        }
    }

    /// Serializes to canonical JSON (an object, or a two-element array)
    pub fn to_canonical_json(&self) -> String {
        match self {
            MapOutput::Single(model) => to_canonical_json(model),
            MapOutput::Series(models) => to_canonical_json(models),
        }
    }
}

/// Pretty printer that escapes non-ASCII characters
struct AsciiPrettyFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl<'a> AsciiPrettyFormatter<'a> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"  "),
        }
    }
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (idx, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..idx].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serializes any value to canonical JSON
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiPrettyFormatter::new());
    // Writing into a Vec cannot fail and the model types only contain strings,
    // integers and sequences.
    if value.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
