//! tier::listing
//!
//! Directory listing documents.
//!
//! A listing enumerates the children of one node:
//!
//! ```text
//! <directory count="2">
//!   <entry name="apache"/>
//!   <entry name="zlib"/>
//! </directory>
//! ```
//!
//! Only `entry` elements directly below the document element count. Their
//! order is preserved exactly as the tier sent it. Names come back as sent;
//! callers decide per entry whether a name is usable as a path segment.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::traits::TierError;

/// Extract the `name` of every top-level `entry`, in document order.
///
/// # Errors
///
/// Returns `TierError::Malformed` if the document is not well-formed XML,
/// is not UTF-8, or an entry has no `name` attribute.
pub fn parse_listing(document: impl AsRef<[u8]>) -> Result<Vec<String>, TierError> {
    let mut reader = Reader::from_reader(document.as_ref());
    reader.config_mut().trim_text(true);

    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            TierError::Malformed(format!(
                "listing parse error at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref element) | Event::Empty(ref element) => {
                saw_root = true;
                if depth == 1 && element.name().as_ref() == b"entry" {
                    names.push(entry_name(element)?);
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(TierError::Malformed("listing has no document element".into()));
    }
    if depth != 0 {
        return Err(TierError::Malformed("listing ends inside an element".into()));
    }

    Ok(names)
}

fn entry_name(element: &quick_xml::events::BytesStart<'_>) -> Result<String, TierError> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| TierError::Malformed(e.to_string()))?;
        if attribute.key.as_ref() == b"name" {
            let name = attribute
                .unescape_value()
                .map_err(|e| TierError::Malformed(e.to_string()))?
                .into_owned();
            return Ok(name);
        }
    }
    Err(TierError::Malformed("entry without a name attribute".into()))
}

/// Render a listing document for `names`, in the given order.
pub fn render_listing<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = format!("<directory count=\"{}\">\n", names.len());
    for name in names {
        out.push_str(&format!("  <entry name=\"{}\"/>\n", escape(name.as_ref())));
    }
    out.push_str("</directory>\n");
    out
}
