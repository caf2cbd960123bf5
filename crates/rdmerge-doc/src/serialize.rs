//! Serializing documents with `quick-xml`.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::attributes::Attribute as XmlAttribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

use crate::error::{DocError, DocResult};
use crate::tree::{DocumentTree, Element, Node};

/// Serializer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level; `0` writes everything on one line.
    pub indent: usize,
    /// Emit `<?xml version="1.0" encoding="utf-8"?>` first.
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            declaration: true,
        }
    }
}

/// Serialize a document to UTF-8 bytes, ending with a newline.
///
/// The same tree always produces the same bytes. Elements holding character
/// data, and everything under `xml:space="preserve"`, are written without
/// added whitespace.
pub fn serialize(doc: &DocumentTree, options: &WriteOptions) -> DocResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    if options.declaration {
        write_event(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        write_event(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;
    }
    write_element(&mut writer, doc.root(), 0, options.indent, false)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
    depth: usize,
    indent: usize,
    inherited_preserve: bool,
) -> DocResult<()> {
    let mut start = BytesStart::new(element.name());
    for attr in element.attributes() {
        // Values are stored escaped and written inside double quotes, so only
        // a bare `"` from a single-quoted source needs escaping.
        let value = if attr.value.contains('"') {
            Cow::Owned(attr.value.replace('"', "&quot;").into_bytes())
        } else {
            Cow::Borrowed(attr.value.as_bytes())
        };
        start.push_attribute(XmlAttribute {
            key: QName(attr.name.as_bytes()),
            value,
        });
    }

    if element.children().is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    let preserve = element.preserves_space(inherited_preserve);
    let pretty = indent > 0
        && !preserve
        && !element
            .children()
            .iter()
            .any(|child| matches!(child, Node::Text(_) | Node::CData(_)));

    write_event(writer, Event::Start(start))?;
    for child in element.children() {
        if pretty {
            write_line_break(writer, (depth + 1) * indent)?;
        }
        match child {
            Node::Element(el) => write_element(writer, el, depth + 1, indent, preserve)?,
            Node::Text(text) => write_event(writer, Event::Text(BytesText::from_escaped(text.as_str())))?,
            Node::CData(data) => write_event(writer, Event::CData(BytesCData::new(data.as_str())))?,
            Node::Comment(comment) => {
                write_event(writer, Event::Comment(BytesText::from_escaped(comment.as_str())))?
            }
            Node::ProcessingInstruction(pi) => write_event(writer, Event::PI(BytesPI::new(pi.as_str())))?,
        }
    }
    if pretty {
        write_line_break(writer, depth * indent)?;
    }
    write_event(writer, Event::End(BytesEnd::new(element.name())))
}

fn write_line_break<W: Write>(writer: &mut Writer<W>, width: usize) -> DocResult<()> {
    let line = format!("\n{:width$}", "");
    write_event(writer, Event::Text(BytesText::from_escaped(line)))
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> DocResult<()> {
    writer
        .write_event(event)
        .map_err(|e| DocError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::unescape_value;
    use crate::parse::parse_str;

    #[test]
    fn writes_declaration_and_indents() {
        let doc = parse_str(
            r#"<ResourceDictionary xmlns:x="urn:x"><Brush x:Key="A"/><x:String x:Key="T">Hi</x:String></ResourceDictionary>"#,
        )
        .unwrap();
        let out = String::from_utf8(serialize(&doc, &WriteOptions::default()).unwrap()).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <ResourceDictionary xmlns:x=\"urn:x\">\n    \
             <Brush x:Key=\"A\"/>\n    \
             <x:String x:Key=\"T\">Hi</x:String>\n\
             </ResourceDictionary>\n"
        );
    }

    #[test]
    fn escaped_content_is_written_verbatim() {
        let doc = parse_str(r#"<a v="x &amp; &quot;y&quot;"><b>1 &lt; 2</b><c><![CDATA[<raw>]]></c></a>"#).unwrap();
        let options = WriteOptions {
            indent: 0,
            declaration: false,
        };
        let out = String::from_utf8(serialize(&doc, &options).unwrap()).unwrap();
        assert_eq!(
            out,
            "<a v=\"x &amp; &quot;y&quot;\"><b>1 &lt; 2</b><c><![CDATA[<raw>]]></c></a>\n"
        );
    }

    #[test]
    fn single_quoted_values_with_double_quotes_stay_well_formed() {
        let doc = parse_str(r#"<ResourceDictionary><Style Tag='say "hi"'/></ResourceDictionary>"#).unwrap();
        let bytes = serialize(&doc, &WriteOptions::default()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains(r#"<Style Tag="say &quot;hi&quot;"/>"#), "{text}");

        let again = crate::parse::parse(&bytes).unwrap();
        let style = again.root().child_elements().next().unwrap();
        assert_eq!(style.attribute("Tag"), Some("say &quot;hi&quot;"));
        assert_eq!(unescape_value(style.attribute("Tag").unwrap()), r#"say "hi""#);
    }

    #[test]
    fn preserved_space_is_written_untouched() {
        let inner = r#"<!--c-->a<x:Null/> <x:Null/>b"#;
        let doc = parse_str(&format!(
            r#"<ResourceDictionary xmlns:x="urn:x"><x:String xml:space="preserve">{inner}</x:String><Style><Setter xml:space="preserve"> <V/> </Setter></Style></ResourceDictionary>"#
        ))
        .unwrap();
        let out = String::from_utf8(serialize(&doc, &WriteOptions::default()).unwrap()).unwrap();
        assert_eq!(
            out,
            format!(
                "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
                 <ResourceDictionary xmlns:x=\"urn:x\">\n    \
                 <x:String xml:space=\"preserve\">{inner}</x:String>\n    \
                 <Style>\n        \
                 <Setter xml:space=\"preserve\"> <V/> </Setter>\n    \
                 </Style>\n\
                 </ResourceDictionary>\n"
            )
        );
        assert_eq!(crate::parse::parse(out.as_bytes()).unwrap(), doc);
    }

    #[test]
    fn reparsing_output_yields_same_tree() {
        let source = r#"<ResourceDictionary xmlns="urn:d" xmlns:x="urn:x">
            <!-- note -->
            <Style x:Key="S"><Setter Property="Margin" Value="2"/></Style>
        </ResourceDictionary>"#;
        let doc = parse_str(source).unwrap();
        let bytes = serialize(&doc, &WriteOptions::default()).unwrap();
        let again = crate::parse::parse(&bytes).unwrap();
        assert_eq!(doc, again);
        assert_eq!(bytes, serialize(&again, &WriteOptions::default()).unwrap());
    }
}
