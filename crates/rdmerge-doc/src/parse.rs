//! Parsing documents with `quick-xml`.
//!
//! The reader runs without namespace resolution: names are kept as written
//! and `xmlns` attributes stay ordinary attributes on their element.

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::{DocError, DocResult};
use crate::tree::{DocumentTree, Element, Node};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a document from raw bytes.
///
/// Input is UTF-8 unless a byte-order mark says otherwise; UTF-16 files
/// with a BOM are decoded first.
pub fn parse(bytes: &[u8]) -> DocResult<DocumentTree> {
    match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) if encoding != UTF_8 => {
            let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            if had_errors {
                return Err(DocError::Undecodable {
                    encoding: encoding.name(),
                });
            }
            trace!(encoding = encoding.name(), "decoded document");
            parse_str(&text)
        }
        _ => {
            let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            parse_str(std::str::from_utf8(bytes)?)
        }
    }
}

/// Parse a document from a string.
///
/// Prolog comments, the XML declaration, and any doctype are dropped;
/// everything inside the root element is kept.
pub fn parse_str(text: &str) -> DocResult<DocumentTree> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    // Whether whitespace is significant in each open element.
    let mut preserve: Vec<bool> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| DocError::Malformed {
            position,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                let element = element_from_start(&start, position)?;
                let inherited = preserve.last().copied().unwrap_or(false);
                preserve.push(element.preserves_space(inherited));
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start, position)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(end) => {
                let found = std::str::from_utf8(end.name().as_ref())?.to_string();
                let mut element = stack.pop().ok_or_else(|| DocError::MismatchedTag {
                    expected: String::new(),
                    found: found.clone(),
                })?;
                if element.name() != found {
                    return Err(DocError::MismatchedTag {
                        expected: element.name().to_string(),
                        found,
                    });
                }
                if !preserve.pop().unwrap_or(false) {
                    element.drop_formatting_whitespace();
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = std::str::from_utf8(&text)?;
                match stack.last_mut() {
                    Some(parent) => parent.append_text(text),
                    None if text.trim().is_empty() => {}
                    None => return Err(DocError::ContentOutsideRoot),
                }
            }
            Event::GeneralRef(reference) => {
                let name = std::str::from_utf8(&reference)?;
                let parent = stack.last_mut().ok_or(DocError::ContentOutsideRoot)?;
                parent.append_text(&format!("&{name};"));
            }
            Event::CData(data) => {
                let data = std::str::from_utf8(&data)?.to_string();
                let parent = stack.last_mut().ok_or(DocError::ContentOutsideRoot)?;
                parent.push(Node::CData(data));
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push(Node::Comment(std::str::from_utf8(&comment)?.to_string()));
                }
            }
            Event::PI(pi) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push(Node::ProcessingInstruction(std::str::from_utf8(&pi)?.to_string()));
                }
            }
            Event::Eof => break,
            // Declaration and doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DocError::Unclosed(open.name().to_string()));
    }
    let root = root.ok_or(DocError::MissingRoot)?;
    trace!(root = root.name(), "parsed document");
    Ok(DocumentTree::new(root))
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> DocResult<Element> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref())?;
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocError::Malformed {
            position,
            message: e.to_string(),
        })?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;
        element.set_attribute(key, value);
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> DocResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_element(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DocError::ContentOutsideRoot),
    }
    Ok(())
}
