//! Tree-level view of a synthesized document
//!
//! Parses the output with html5ever so structural properties (doctype,
//! where each injected block ended up, in which order) can be checked
//! against what a browser would actually build.

use super::markers::MARKER_PREFIX;
use crate::utils::Result;
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    Head,
    Body,
}

/// Outline of a parsed document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutline {
    pub has_doctype: bool,
    /// Injected block ids inside `<head>`, in document order
    pub head_markers: Vec<String>,
    /// Injected block ids inside `<body>`, in document order
    pub body_markers: Vec<String>,
    /// `tag` or `tag#id` of the first element inside `<head>`
    pub first_head_element: Option<String>,
    pub style_elements: usize,
    pub script_elements: usize,
}

impl DocumentOutline {
    /// Parse a document and build its outline
    pub fn parse(html: &str) -> Result<Self> {
        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut outline = Self::default();
        outline.walk(&dom.document, Section::Outside);
        Ok(outline)
    }

    fn walk(&mut self, handle: &Handle, section: Section) {
        let mut child_section = section;

        match &handle.data {
            NodeData::Doctype { .. } => self.has_doctype = true,
            NodeData::Element { name, attrs, .. } => {
                let tag: &str = &name.local;
                let id = attrs
                    .borrow()
                    .iter()
                    .find(|attr| &*attr.name.local == "id")
                    .map(|attr| String::from(&*attr.value));

                match tag {
                    "head" => child_section = Section::Head,
                    "body" => child_section = Section::Body,
                    "style" => self.style_elements += 1,
                    "script" => self.script_elements += 1,
                    _ => {}
                }

                if section == Section::Head && self.first_head_element.is_none() {
                    self.first_head_element = Some(match &id {
                        Some(id) => format!("{}#{}", tag, id),
                        None => tag.to_string(),
                    });
                }

                if let Some(id) = id.filter(|id| id.starts_with(MARKER_PREFIX)) {
                    match section {
                        Section::Head => self.head_markers.push(id),
                        Section::Body => self.body_markers.push(id),
                        Section::Outside => {}
                    }
                }
            }
            _ => {}
        }

        for child in handle.children.borrow().iter() {
            self.walk(child, child_section);
        }
    }

    /// All injected block ids, head first
    pub fn markers(&self) -> Vec<&str> {
        self.head_markers
            .iter()
            .chain(self.body_markers.iter())
            .map(String::as_str)
            .collect()
    }

    /// Document-order position of an injected block
    pub fn position(&self, id: &str) -> Option<usize> {
        self.markers().iter().position(|m| *m == id)
    }

    /// Check that no injected block id appears twice
    pub fn markers_unique(&self) -> bool {
        let markers = self.markers();
        markers
            .iter()
            .enumerate()
            .all(|(i, m)| !markers[..i].contains(m))
    }
}
