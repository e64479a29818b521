//! Preprocessing of received bytes and parsing of management requests.
//!
//! A request is an XML document whose root element (of any name) carries an
//! `Action` and an `ID` attribute.  `QUERY` requests name a function block
//! with an `FB` element somewhere below the root:
//!
//! ```xml
//! <Request Action="QUERY" ID="7"><FB Name="*" Type="*"/></Request>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{Error, Result};

/// Turn a received chunk into request text.
///
/// The bytes are decoded as UTF-8 (invalid sequences are replaced), NUL
/// characters are removed and trailing whitespace is stripped.
pub fn clean_text(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data).replace('\0', "");
    text.trim_end().into()
}

/// Strip whatever precedes the XML document.
///
/// Real clients may put a preamble in front of the document.  This returns
/// the longest suffix of `text` starting at the first `<`.  If there is no
/// `<` at all, `text` is returned unchanged and parsing it will fail.
pub fn xml_fragment(text: &str) -> &str {
    match text.find('<') {
        Some(start) => &text[start..],
        None => text,
    }
}

/// A function block reference from a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FbRef {
    pub name: Option<String>,
    pub fb_type: Option<String>,
}

impl FbRef {
    /// Both name and type are the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.name.as_deref() == Some("*") && self.fb_type.as_deref() == Some("*")
    }
}

/// The parts of a request document the stub looks at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    /// Name of the root element.
    pub root: String,
    pub action: Option<String>,
    pub id: Option<String>,
    /// The first `FB` element below the root, in document order.
    pub fb: Option<FbRef>,
}

impl Request {
    /// Parse exactly one XML document.
    ///
    /// Fails on malformed XML, on text or elements outside of the root
    /// element, and on documents without a root element.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut request: Option<Request> = None;
        let mut depth = 0usize;
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    Self::element(&mut request, &e, depth)?;
                    depth += 1;
                }
                Event::Empty(e) => Self::element(&mut request, &e, depth)?,
                Event::End(_) => {
                    depth = depth.checked_sub(1)
                                 .ok_or(Error::Document("unmatched end tag"))?;
                }
                Event::Text(_) | Event::CData(_) if depth == 0 => {
                    return Err(Error::Document("text outside of the root element"));
                }
                // Content is never used, but undefined entities and a bare
                // `&` still make the document malformed.
                Event::Text(e) => {
                    e.unescape()?;
                }
                Event::Eof => break,
                _ => (),
            }
        }
        if depth != 0 {
            return Err(Error::Document("unclosed element at end of input"));
        }
        request.ok_or(Error::Document("no element found"))
    }

    fn element(request: &mut Option<Request>, e: &BytesStart<'_>, depth: usize) -> Result<()> {
        match request {
            None if depth == 0 => {
                let [action, id] = attributes(e, ["Action", "ID"])?;
                *request = Some(Request {
                    root: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    action,
                    id,
                    fb: None,
                });
            }
            Some(_) if depth == 0 => {
                return Err(Error::Document("junk after document element"));
            }
            Some(req) => {
                // Attributes of every element are checked, not only the FB's.
                let [name, fb_type] = attributes(e, ["Name", "Type"])?;
                if req.fb.is_none() && e.name().as_ref() == b"FB" {
                    req.fb = Some(FbRef { name, fb_type });
                }
            }
            // nested element without a root cannot happen: depth > 0 implies
            // a root start tag was seen
            None => return Err(Error::Document("no element found")),
        }
        Ok(())
    }
}

/// Look up two attributes by name, unescaping their values.
fn attributes(e: &BytesStart<'_>, keys: [&str; 2]) -> Result<[Option<String>; 2]> {
    let mut found = [None, None];
    for attr in e.attributes() {
        let attr = attr?;
        if attr.value.contains(&b'<') {
            return Err(Error::Document("'<' not allowed in attribute value"));
        }
        let value = attr.unescape_value()?;
        for (slot, key) in found.iter_mut().zip(keys.iter()) {
            if attr.key.as_ref() == key.as_bytes() {
                *slot = Some(value.clone().into_owned());
            }
        }
    }
    Ok(found)
}
