//! XML to record tree parsing
//!
//! Reads an XML document with the quick-xml event reader and builds a
//! [`TreeNode`]: attributes become `@`-prefixed keys, mixed text goes under
//! `#text`, and repeated sibling elements collapse into sequences.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{TreeNode, TreeValue, ATTRIBUTE_PREFIX, TEXT_KEY};
use crate::error::{ProquestError, Result};

/// One open element while the reader walks the document.
struct Frame {
    name: String,
    node: TreeNode,
    text: String,
}

impl Frame {
    fn new(name: String, node: TreeNode) -> Self {
        Frame {
            name,
            node,
            text: String::new(),
        }
    }

    /// Convert a closed element into its tree value.
    ///
    /// An element with no attributes and no children is a scalar, even when
    /// its text is empty; anything else is a node, with accumulated text
    /// stored under `#text`.
    fn into_value(self) -> TreeValue {
        if self.node.is_empty() {
            TreeValue::Scalar(self.text)
        } else {
            let mut node = self.node;
            if !self.text.is_empty() {
                node.insert(TEXT_KEY, TreeValue::Scalar(self.text));
            }
            TreeValue::Node(node)
        }
    }
}

/// Parse an XML document into its root record tree.
///
/// The returned node maps the document's root element name (for ProQuest
/// exports, `RECORD`) to its parsed value.
pub fn parse_tree(xml: &str) -> Result<TreeNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    // Synthetic root frame collects the document element.
    let mut stack: Vec<Frame> = vec![Frame::new(String::new(), TreeNode::new())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let frame = open_frame(e)?;
                stack.push(frame);
            }
            Ok(Event::Empty(ref e)) => {
                let frame = open_frame(e)?;
                attach(&mut stack, frame)?;
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ProquestError::parse("unbalanced closing tag"))?;
                attach(&mut stack, frame)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default();
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declarations, comments, processing instructions
            Err(e) => {
                return Err(ProquestError::parse(format!("XML parse error: {}", e)));
            }
        }
    }

    if stack.len() != 1 {
        return Err(ProquestError::parse("unexpected end of XML input"));
    }
    let root = stack.pop().expect("root frame").node;
    if root.is_empty() {
        return Err(ProquestError::parse("no root element found"));
    }
    tracing::debug!(keys = root.len(), "parsed XML record tree");
    Ok(root)
}

/// Start a frame for an opening tag, capturing its attributes.
fn open_frame(e: &BytesStart) -> Result<Frame> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut node = TreeNode::new();
    for attr in e.attributes() {
        let attr =
            attr.map_err(|err| ProquestError::parse(format!("bad attribute: {}", err)))?;
        let key = format!(
            "{}{}",
            ATTRIBUTE_PREFIX,
            String::from_utf8_lossy(attr.key.as_ref())
        );
        let value = attr
            .unescape_value()
            .map_err(|err| ProquestError::parse(format!("bad attribute value: {}", err)))?;
        node.insert(key, TreeValue::Scalar(value.into_owned()));
    }
    Ok(Frame::new(name, node))
}

/// Attach a finished frame to its parent on the stack.
fn attach(stack: &mut Vec<Frame>, frame: Frame) -> Result<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| ProquestError::parse("element closed outside root"))?;
    let name = frame.name.clone();
    parent.node.push_child(name, frame.into_value());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_element() {
        let tree = parse_tree("<RECORD><GOID>12345</GOID></RECORD>").unwrap();
        let record = tree.get("RECORD").and_then(TreeValue::as_node).unwrap();
        assert_eq!(
            record.get("GOID").and_then(TreeValue::as_scalar),
            Some("12345")
        );
    }

    #[test]
    fn test_parse_attributes_and_text() {
        let tree =
            parse_tree(r#"<RECORD><Text HTMLContent="true">Hello</Text></RECORD>"#).unwrap();
        let record = tree.get("RECORD").and_then(TreeValue::as_node).unwrap();
        let text = record.get("Text").and_then(TreeValue::as_node).unwrap();
        assert_eq!(
            text.get("@HTMLContent").and_then(TreeValue::as_scalar),
            Some("true")
        );
        assert_eq!(
            text.get("#text").and_then(TreeValue::as_scalar),
            Some("Hello")
        );
    }

    #[test]
    fn test_repeated_elements_collapse_to_sequence() {
        let xml = r#"<RECORD>
            <Terms>
                <GenSubjTerm><GenSubjValue>Economics</GenSubjValue></GenSubjTerm>
                <GenSubjTerm><GenSubjValue>Trade</GenSubjValue></GenSubjTerm>
            </Terms>
        </RECORD>"#;
        let tree = parse_tree(xml).unwrap();
        let record = tree.get("RECORD").and_then(TreeValue::as_node).unwrap();
        let terms = record.get("Terms").and_then(TreeValue::as_node).unwrap();
        let seq = terms
            .get("GenSubjTerm")
            .and_then(TreeValue::as_sequence)
            .unwrap();
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_single_element_stays_node() {
        let xml = r#"<RECORD>
            <Terms><GenSubjTerm><GenSubjValue>Economics</GenSubjValue></GenSubjTerm></Terms>
        </RECORD>"#;
        let tree = parse_tree(xml).unwrap();
        let record = tree.get("RECORD").and_then(TreeValue::as_node).unwrap();
        let terms = record.get("Terms").and_then(TreeValue::as_node).unwrap();
        assert!(matches!(
            terms.get("GenSubjTerm"),
            Some(TreeValue::Node(_))
        ));
    }

    #[test]
    fn test_empty_element_is_scalar() {
        let tree = parse_tree("<RECORD><Empty/></RECORD>").unwrap();
        let record = tree.get("RECORD").and_then(TreeValue::as_node).unwrap();
        assert_eq!(
            record.get("Empty").and_then(TreeValue::as_scalar),
            Some("")
        );
    }

    #[test]
    fn test_entities_unescaped() {
        let tree = parse_tree("<RECORD><Title>AT&amp;T &lt;report&gt;</Title></RECORD>").unwrap();
        let record = tree.get("RECORD").and_then(TreeValue::as_node).unwrap();
        assert_eq!(
            record.get("Title").and_then(TreeValue::as_scalar),
            Some("AT&T <report>")
        );
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = parse_tree("<RECORD><Open></RECORD>").unwrap_err();
        assert!(matches!(err, ProquestError::Parse { .. }));
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(parse_tree("").is_err());
    }
}
