use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::epoch::Epoch;
use super::error::ParseError;
use super::series::EphemerisSeries;
use super::types::{DocumentMetadata, Fields, FormatInfo, StateVector, Vector3};

const COMMENT: &str = "COMMENT";

/// Parse an OEM XML document into its state vector series and metadata.
pub fn parse(document: &str) -> Result<(EphemerisSeries, DocumentMetadata), ParseError> {
    let root = read_tree(document)?;
    let oem = if root.name == "oem" {
        &root
    } else {
        root.child("oem").ok_or(ParseError::MissingElement("oem"))?
    };

    let mut metadata = DocumentMetadata {
        format: Some(FormatInfo {
            id: oem.attribute("id").map(String::from),
            version: oem.attribute("version").map(String::from),
        }),
        ..Default::default()
    };

    if let Some(header) = oem.child("header") {
        metadata.header = collect_fields(header, &mut metadata.comments);
    }

    let body = oem.child("body").ok_or(ParseError::MissingElement("body"))?;
    let segments: Vec<&Element> = body.children_named("segment").collect();
    if segments.is_empty() {
        return Err(ParseError::MissingElement("segment"));
    }
    if segments.len() > 1 {
        log::warn!(
            "document has {} segments, concatenating their state vectors",
            segments.len()
        );
    }

    let mut vectors = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        if let Some(meta) = segment.child("metadata") {
            let fields = collect_fields(meta, &mut metadata.comments);
            if i == 0 {
                metadata.segment_metadata = fields;
            }
        }

        let data = segment
            .child("data")
            .ok_or(ParseError::MissingElement("data"))?;
        for element in &data.children {
            match element.name.as_str() {
                COMMENT => metadata.comments.push(element.text.clone()),
                "stateVector" => vectors.push(parse_state_vector(vectors.len(), element)?),
                _ => {}
            }
        }
    }

    let series = EphemerisSeries::new(vectors)?;
    Ok((series, metadata))
}

fn parse_state_vector(index: usize, element: &Element) -> Result<StateVector, ParseError> {
    let field = |name: &'static str| {
        element
            .child(name)
            .map(|c| c.text.as_str())
            .ok_or(ParseError::MissingField { index, field: name })
    };
    let number = |name: &'static str| -> Result<f64, ParseError> {
        let text = field(name)?;
        let value: f64 = text.trim().parse().map_err(|_| ParseError::InvalidNumber {
            index,
            field: name,
            value: text.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ParseError::NonFinite { index, field: name });
        }
        Ok(value)
    };

    let epoch =
        Epoch::parse(field("EPOCH")?).map_err(|source| ParseError::InvalidEpoch { index, source })?;

    Ok(StateVector {
        epoch,
        position: Vector3::new(number("X")?, number("Y")?, number("Z")?),
        velocity: Vector3::new(number("X_DOT")?, number("Y_DOT")?, number("Z_DOT")?),
    })
}

fn collect_fields(element: &Element, comments: &mut Vec<String>) -> Fields {
    let mut fields = Fields::new();
    for child in &element.children {
        if child.name == COMMENT {
            comments.push(child.text.clone());
        } else {
            fields.insert(child.name.clone(), child.text.clone());
        }
    }
    fields
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn read_tree(document: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::MissingElement("closing tag"));
    }
    root.ok_or(ParseError::MissingElement("oem"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
