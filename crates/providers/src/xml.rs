//! Owned, namespace-resolved element tree for SOAP responses.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::ProviderError;

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// One XML element, keyed by namespace URI and local name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub namespace: Option<String>,
    pub name: String,
    pub text: Option<String>,
    /// `xsi:nil="true"` was set on the element
    pub nil: bool,
    pub children: Vec<Element>,
}

impl Element {
    /// Parse a complete document and return its root element
    pub fn parse(document: &str) -> Result<Element, ProviderError> {
        let mut reader = NsReader::from_str(document);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader.read_resolved_event().map_err(parse_error)?;
            let namespace = resolve_namespace(resolved)?;
            match event {
                Event::Start(start) => {
                    stack.push(open_element(&reader, &start, namespace)?);
                }
                Event::Empty(start) => {
                    let element = open_element(&reader, &start, namespace)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ProviderError::Parse("unexpected closing tag".into()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(parse_error)?;
                    append_text(&mut stack, &text);
                }
                Event::CData(data) => {
                    let text = std::str::from_utf8(&data)
                        .map_err(|e| ProviderError::Parse(e.to_string()))?
                        .to_string();
                    append_text(&mut stack, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ProviderError::Parse(format!(
                "document ended inside <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }
        root.ok_or_else(|| ProviderError::Parse("document has no root element".into()))
    }

    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// First direct child with the given namespace and local name
    pub fn child(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(namespace, name))
    }

    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, name))
    }

    /// Follow a path of (namespace, name) steps, taking the first match at each step
    pub fn find(&self, path: &[(&str, &str)]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, (namespace, name)| element.child(namespace, name))
    }

    /// Text content with present-but-empty elements reported as `""`
    pub fn text_or_empty(&self) -> String {
        self.text.clone().unwrap_or_default()
    }

    /// Text of a direct child, `None` when the child is absent or nil
    pub fn child_text(&self, namespace: &str, name: &str) -> Option<String> {
        self.child(namespace, name)
            .filter(|c| !c.nil)
            .map(Element::text_or_empty)
    }
}

fn parse_error(err: impl std::fmt::Display) -> ProviderError {
    ProviderError::Parse(err.to_string())
}

fn resolve_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>, ProviderError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(ProviderError::Parse(format!(
            "unbound namespace prefix {}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<Element, ProviderError> {
    let name = std::str::from_utf8(start.local_name().as_ref())
        .map_err(parse_error)?
        .to_string();

    let mut nil = false;
    for attr in start.attributes() {
        let attr = attr.map_err(parse_error)?;
        let (_, local) = reader.resolve_attribute(attr.key);
        if local.as_ref() == b"nil" {
            nil = attr.unescape_value().map_err(parse_error)?.trim() == "true";
        }
    }

    Ok(Element {
        namespace,
        name,
        text: None,
        nil,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ProviderError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ProviderError::Parse("multiple root elements".into())),
    }
}

fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.get_or_insert_with(String::new).push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
      <s:Body>
        <Reply xmlns="urn:test" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
          <Name>AT&amp;T</Name>
          <Empty/>
          <Missing i:nil="true"/>
          <Item>1</Item>
          <Item>2</Item>
        </Reply>
      </s:Body>
    </s:Envelope>"#;

    #[test]
    fn test_namespaces_and_paths() {
        let root = Element::parse(DOC).unwrap();
        assert!(root.is(SOAP_ENVELOPE_NS, "Envelope"));

        let reply = root
            .find(&[(SOAP_ENVELOPE_NS, "Body"), ("urn:test", "Reply")])
            .unwrap();
        assert_eq!(reply.child_text("urn:test", "Name").as_deref(), Some("AT&T"));
        assert_eq!(reply.children_named("urn:test", "Item").count(), 2);
        // default namespace does not leak to the envelope namespace
        assert!(reply.child(SOAP_ENVELOPE_NS, "Name").is_none());
    }

    #[test]
    fn test_empty_nil_and_absent_are_distinct() {
        let root = Element::parse(DOC).unwrap();
        let reply = root
            .find(&[(SOAP_ENVELOPE_NS, "Body"), ("urn:test", "Reply")])
            .unwrap();
        assert_eq!(reply.child_text("urn:test", "Empty").as_deref(), Some(""));
        assert!(reply.child("urn:test", "Missing").unwrap().nil);
        assert_eq!(reply.child_text("urn:test", "Missing"), None);
        assert_eq!(reply.child_text("urn:test", "Nowhere"), None);
    }

    #[test]
    fn test_leaf_text_is_kept_verbatim() {
        let root = Element::parse(r#"<r xmlns="urn:test"><FirstName> Bob </FirstName></r>"#).unwrap();
        assert_eq!(root.child_text("urn:test", "FirstName").as_deref(), Some(" Bob "));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(Element::parse(""), Err(ProviderError::Parse(_))));
        assert!(matches!(Element::parse("<a><b></a>"), Err(ProviderError::Parse(_))));
        assert!(matches!(Element::parse("<a><b>"), Err(ProviderError::Parse(_))));
        assert!(matches!(Element::parse("<x:a/>"), Err(ProviderError::Parse(_))));
        assert!(matches!(Element::parse("not xml at all"), Err(ProviderError::Parse(_))));
    }
}
