//! XML attribute helpers and an indenting writer
//!
//! Reading goes through `roxmltree` so that every diagnostic can name the
//! offending line. Writing goes through `quick-xml`.

use crate::key::{key_name, parse_key};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use roxmltree::Node;
use std::fmt::Display;
use std::str::FromStr;

/// Problem with a single attribute
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeError {
    #[error("line #{line}: <{element}> is missing the '{name}' attribute")]
    Missing {
        line: u32,
        element: String,
        name: &'static str,
    },

    #[error("line #{line}: <{element}> has a bad '{name}' value '{value}'")]
    Invalid {
        line: u32,
        element: String,
        name: &'static str,
        value: String,
    },
}

/// Attribute access with line-numbered errors
pub trait ElementExt {
    /// 1-based source line of the element
    fn line(&self) -> u32;

    /// Child elements, skipping text and comments
    fn elements(&self) -> impl Iterator<Item = Self>;

    /// Parse an attribute, `Ok(None)` when it is absent
    fn optional<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, AttributeError>;

    /// Parse an attribute that must be present
    fn required<T: FromStr>(&self, name: &'static str) -> Result<T, AttributeError>;

    /// Parse an attribute, falling back to `default` when absent
    fn or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, AttributeError> {
        Ok(self.optional(name)?.unwrap_or(default))
    }

    /// Parse a MIDI key given as a number or note name
    fn key(&self, name: &'static str) -> Result<Option<u8>, AttributeError>;

    fn invalid(&self, name: &'static str, value: &str) -> AttributeError;
}

impl<'a, 'input> ElementExt for Node<'a, 'input> {
    fn line(&self) -> u32 {
        self.document().text_pos_at(self.range().start).row
    }

    fn elements(&self) -> impl Iterator<Item = Self> {
        self.children().filter(|n| n.is_element())
    }

    fn optional<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, AttributeError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(name, value)),
        }
    }

    fn required<T: FromStr>(&self, name: &'static str) -> Result<T, AttributeError> {
        self.optional(name)?.ok_or_else(|| AttributeError::Missing {
            line: self.line(),
            element: self.tag_name().name().to_string(),
            name,
        })
    }

    fn key(&self, name: &'static str) -> Result<Option<u8>, AttributeError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(value) => parse_key(value)
                .map(Some)
                .ok_or_else(|| self.invalid(name, value)),
        }
    }

    fn invalid(&self, name: &'static str, value: &str) -> AttributeError {
        AttributeError::Invalid {
            line: self.line(),
            element: self.tag_name().name().to_string(),
            name,
            value: value.to_string(),
        }
    }
}

/// Failure while emitting XML
#[derive(Debug, thiserror::Error)]
#[error("failed to write XML: {0}")]
pub struct XmlWriteError(String);

impl XmlWriteError {
    fn from_display(err: impl Display) -> Self {
        Self(err.to_string())
    }
}

/// Ordered attribute list with default elision
#[derive(Debug, Default)]
pub struct Attributes {
    pairs: Vec<(&'static str, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Display) -> Self {
        self.pairs.push((name, value.to_string()));
        self
    }

    /// Add `value` unless it equals `default`
    pub fn with_unless<T: Display + PartialEq>(self, name: &'static str, value: T, default: T) -> Self {
        if value == default {
            self
        } else {
            self.with(name, value)
        }
    }

    pub fn with_key(self, name: &'static str, key: u8) -> Self {
        self.with(name, key_name(key))
    }
}

/// Indenting XML document writer
pub struct XmlWriter {
    writer: quick_xml::Writer<Vec<u8>>,
    open: Vec<&'static str>,
}

impl XmlWriter {
    /// Start a document with an XML declaration
    pub fn new() -> Result<Self, XmlWriteError> {
        let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(XmlWriteError::from_display)?;
        Ok(Self {
            writer,
            open: Vec::new(),
        })
    }

    fn element(name: &'static str, attributes: Attributes) -> BytesStart<'static> {
        let mut element = BytesStart::new(name);
        for (key, value) in &attributes.pairs {
            element.push_attribute((*key, value.as_str()));
        }
        element
    }

    /// Open an element that will contain children
    pub fn open(&mut self, name: &'static str, attributes: Attributes) -> Result<(), XmlWriteError> {
        self.writer
            .write_event(Event::Start(Self::element(name, attributes)))
            .map_err(XmlWriteError::from_display)?;
        self.open.push(name);
        Ok(())
    }

    /// Write a self-closing element
    pub fn empty(&mut self, name: &'static str, attributes: Attributes) -> Result<(), XmlWriteError> {
        self.writer
            .write_event(Event::Empty(Self::element(name, attributes)))
            .map_err(XmlWriteError::from_display)
    }

    /// Close the innermost open element
    pub fn close(&mut self) -> Result<(), XmlWriteError> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| XmlWriteError("no open element to close".to_string()))?;
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(XmlWriteError::from_display)
    }

    /// Close any open elements and return the document text
    pub fn finish(mut self) -> Result<String, XmlWriteError> {
        while !self.open.is_empty() {
            self.close()?;
        }
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(XmlWriteError::from_display)
    }
}
