//! Session description bodies carried by `DESCRIBE` responses.
//!
//! The parser is line oriented: a line is `<type>=<value>` with a
//! single-letter type. Lines after the first `m=` belong to that media
//! section until the next `m=`.
//!
//! Control replies also carry bodies that are not session descriptions
//! (`text/parameters` keep-alive replies, plain-text error explanations).
//! Such bodies still decode: lines the grammar does not cover are kept in
//! [`SessionDescription::unparsed`] and `version` stays `None`. Only a body
//! that is not UTF-8 fails.

use serde::Serialize;

use crate::error::Result;

/// A decoded session description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionDescription {
    /// The `v=` line. `None` when the body has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,
    pub attributes: Vec<Attribute>,
    pub media: Vec<MediaDescription>,
    /// Session-level lines of any type not decoded above, kept verbatim.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<(char, String)>,
    /// Lines that are not `<type>=<value>`, or known fields of the wrong
    /// shape, in body order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unparsed: Vec<String>,
}

/// The `o=` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub username: String,
    pub session_id: String,
    pub session_version: String,
    pub net_type: String,
    pub addr_type: String,
    pub address: String,
}

/// An `a=` line, either a flag (`a=recvonly`) or a property (`a=control:*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One `m=` section and the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaDescription {
    pub media: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_count: Option<u16>,
    pub protocol: String,
    pub formats: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<(char, String)>,
}

impl SessionDescription {
    /// First session-level attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, name)
    }

    /// Session-level `a=control:` URL, if any.
    pub fn control(&self) -> Option<&str> {
        self.attribute("control").and_then(|a| a.value.as_deref())
    }
}

impl MediaDescription {
    /// First media-level attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, name)
    }

    /// Media-level `a=control:` URL, if any.
    pub fn control(&self) -> Option<&str> {
        self.attribute("control").and_then(|a| a.value.as_deref())
    }

    /// The `a=rtpmap:` value, e.g. `96 H264/90000`.
    pub fn rtpmap(&self) -> Option<&str> {
        self.attribute("rtpmap").and_then(|a| a.value.as_deref())
    }
}

fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attributes.iter().find(|a| a.name == name)
}

/// Parse a session description body.
pub fn parse_session_description(body: &[u8]) -> Result<SessionDescription> {
    let text = std::str::from_utf8(body)?;
    let mut description = SessionDescription::default();

    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }

        let decoded =
            split_line(line).is_some_and(|(kind, value)| description.apply(kind, value));
        if !decoded {
            description.unparsed.push(line.to_string());
        }
    }

    if !description.unparsed.is_empty() {
        tracing::debug!(
            unparsed = description.unparsed.len(),
            has_version = description.version.is_some(),
            "body kept lines outside the session description grammar"
        );
    }
    tracing::trace!(
        media = description.media.len(),
        attributes = description.attributes.len(),
        "parsed session description"
    );
    Ok(description)
}

impl SessionDescription {
    /// Record one line. Returns false when a known field has the wrong shape.
    fn apply(&mut self, kind: char, value: &str) -> bool {
        match kind {
            'v' => {
                let Ok(version) = value.trim().parse() else {
                    return false;
                };
                self.version = Some(version);
                return true;
            }
            'm' => {
                let Some(media) = parse_media(value) else {
                    return false;
                };
                self.media.push(media);
                return true;
            }
            _ => {}
        }

        if let Some(media) = self.media.last_mut() {
            match kind {
                'i' => media.information = Some(value.to_string()),
                'c' => media.connection = Some(value.to_string()),
                'a' => media.attributes.push(parse_attribute(value)),
                _ => media.other.push((kind, value.to_string())),
            }
            return true;
        }

        match kind {
            'o' => {
                let Some(origin) = parse_origin(value) else {
                    return false;
                };
                self.origin = Some(origin);
            }
            's' => self.session_name = Some(value.to_string()),
            'i' => self.information = Some(value.to_string()),
            'u' => self.uri = Some(value.to_string()),
            'c' => self.connection = Some(value.to_string()),
            't' => self.timing = Some(value.to_string()),
            'a' => self.attributes.push(parse_attribute(value)),
            _ => self.other.push((kind, value.to_string())),
        }
        true
    }
}

fn split_line(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let kind = chars.next()?;
    if !kind.is_ascii_alphabetic() || chars.next() != Some('=') {
        return None;
    }
    Some((kind, &line[2..]))
}

fn parse_attribute(value: &str) -> Attribute {
    match value.split_once(':') {
        Some((name, value)) => Attribute {
            name: name.to_string(),
            value: Some(value.to_string()),
        },
        None => Attribute {
            name: value.to_string(),
            value: None,
        },
    }
}

fn parse_origin(value: &str) -> Option<Origin> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    let [username, session_id, session_version, net_type, addr_type, address] = fields[..] else {
        return None;
    };

    Some(Origin {
        username: username.to_string(),
        session_id: session_id.to_string(),
        session_version: session_version.to_string(),
        net_type: net_type.to_string(),
        addr_type: addr_type.to_string(),
        address: address.to_string(),
    })
}

fn parse_media(value: &str) -> Option<MediaDescription> {
    let mut fields = value.split_whitespace();
    let media = fields.next()?;
    let port_field = fields.next()?;
    let protocol = fields.next()?;

    let (port, port_count) = match port_field.split_once('/') {
        Some((port, count)) => (port.parse().ok()?, Some(count.parse().ok()?)),
        None => (port_field.parse().ok()?, None),
    };

    Some(MediaDescription {
        media: media.to_string(),
        port,
        port_count,
        protocol: protocol.to_string(),
        formats: fields.map(str::to_string).collect(),
        information: None,
        connection: None,
        attributes: Vec::new(),
        other: Vec::new(),
    })
}
