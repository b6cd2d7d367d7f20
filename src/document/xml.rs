use quick_xml::escape::escape;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::Element;
use crate::DocumentError;

/// Parse a single-rooted XML document.
///
/// Text, comments, declarations and processing instructions are skipped: the
/// configuration tree is carried entirely by tags and attributes.
pub(super) fn parse(bytes: &[u8]) -> Result<Element, DocumentError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(DocumentError::MultipleRoots);
                }
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(end) => {
                let found = utf8(end.name().as_ref(), "end tag name")?.to_string();
                let element = match stack.pop() {
                    Some(element) => element,
                    None => {
                        return Err(DocumentError::MismatchedEnd {
                            expected: String::new(),
                            found,
                        })
                    }
                };
                if element.name != found {
                    return Err(DocumentError::MismatchedEnd {
                        expected: element.name,
                        found,
                    });
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(DocumentError::UnexpectedEnd { tag: open.name });
    }
    root.ok_or(DocumentError::Empty)
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, DocumentError> {
    let mut element = Element::new(utf8(start.name().as_ref(), "tag name")?);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Attribute(e.to_string()))?;
        let key = utf8(attr.key.as_ref(), "attribute name")?.to_string();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

fn utf8<'a>(
    bytes: &'a [u8],
    what: &'static str,
) -> Result<&'a str, DocumentError> {
    std::str::from_utf8(bytes).map_err(|source| DocumentError::InvalidUtf8 { what, source })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(DocumentError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}

/// Serialize `element`; `indent` is the number of spaces per nesting level,
/// `None` writes everything on one line.
pub(super) fn write(
    element: &Element,
    indent: Option<usize>,
) -> String {
    let mut out = String::new();
    write_element(element, 0, indent, &mut out);
    out
}

fn write_element(
    element: &Element,
    depth: usize,
    indent: Option<usize>,
    out: &mut String,
) {
    if let Some(step) = indent {
        out.push_str(&" ".repeat(depth * step));
    }
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        if indent.is_some() {
            out.push('\n');
        }
        write_element(child, depth + 1, indent, out);
    }
    if let Some(step) = indent {
        out.push('\n');
        out.push_str(&" ".repeat(depth * step));
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
