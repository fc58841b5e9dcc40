// src/services/apollo_feed.rs
// DOCUMENTATION: Apollo Kino payload normalization
// PURPOSE: Turn XML or JSON feed documents into predictable collections and fields
//
// The feed is served as XML by default and as JSON on some mirrors. XML is
// converted into the same tree a JSON response would have: repeated elements
// become arrays, single elements stay objects, text-only elements become
// strings. Attributes are kept under "$" and mixed text under "_".

use crate::services::date_range::parse_timestamp;
use chrono::{DateTime, Duration, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Minutes of trailers and ads added after the film when the feed has no end time
pub const SESSION_BUFFER_MINUTES: i64 = 15;

/// Hall name fields in the order schedule payloads expose them
const SHOW_HALL_FIELDS: [&str; 4] = [
    "TheatreAuditorium",
    "Auditorium",
    "AuditoriumName",
    "TheatreAuditoriumName",
];

/// Top-level collections served by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCollection {
    TheatreAreas,
    Events,
    NewsCategories,
    News,
}

impl FeedCollection {
    pub fn path(&self) -> &'static str {
        match self {
            FeedCollection::TheatreAreas => "/TheatreAreas",
            FeedCollection::Events => "/Events",
            FeedCollection::NewsCategories => "/NewsCategories",
            FeedCollection::News => "/News",
        }
    }

    pub fn container(&self) -> &'static str {
        match self {
            FeedCollection::TheatreAreas => "TheatreAreas",
            FeedCollection::Events => "Events",
            FeedCollection::NewsCategories => "NewsCategories",
            FeedCollection::News => "News",
        }
    }

    pub fn item(&self) -> &'static str {
        match self {
            FeedCollection::TheatreAreas => "TheatreArea",
            FeedCollection::Events => "Event",
            FeedCollection::NewsCategories => "NewsArticleCategory",
            FeedCollection::News => "NewsArticle",
        }
    }
}


struct Frame {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("Invalid attribute in <{}>: {}", name, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| format!("Invalid attribute value in <{}>: {}", name, e))?;
            attributes.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn into_value(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, Value::String(text));
        }

        let mut object = Map::new();
        if !self.attributes.is_empty() {
            object.insert("$".to_string(), Value::Object(self.attributes));
        }
        object.extend(self.children);
        if !text.is_empty() {
            object.insert("_".to_string(), Value::String(text));
        }
        (self.name, Value::Object(object))
    }
}

/// Repeated keys collect into an array
fn insert_child(children: &mut Map<String, Value>, key: String, value: Value) {
    match children.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(key, value);
        }
    }
}

/// Convert an XML document into a JSON tree rooted at the document element
pub fn xml_to_value(xml: &str) -> Result<Value, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Frame::open(&start)?),
            Ok(Event::Empty(start)) => {
                let (key, value) = Frame::open(&start)?.into_value();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, key, value),
                    None => root = Some((key, value)),
                }
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| format!("Invalid text at {}: {}", reader.buffer_position(), e))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| "Unbalanced closing tag".to_string())?;
                let (key, value) = frame.into_value();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, key, value),
                    None => root = Some((key, value)),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "XML parse error at {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }

    if !stack.is_empty() {
        return Err("Unexpected end of XML document".to_string());
    }

    let (name, value) = root.ok_or_else(|| "Empty XML document".to_string())?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

/// Parse a feed body: XML when it starts with '<', JSON otherwise
pub fn parse_document(body: &str) -> Result<Value, String> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('<') {
        xml_to_value(trimmed)
    } else if trimmed.is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(trimmed).map_err(|e| format!("JSON parse error: {}", e))
    }
}

/// Non-empty text of a string or number
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Text of the first key that has one
pub fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(value.get(*key)))
}

/// Follow a chain of object keys
pub fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |current, key| current.get(*key))
}

/// Leading integer of a number or numeric string, like parseInt
pub fn parse_int(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i32>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

/// Number or numeric string, like parseFloat
pub fn parse_float(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Trimmed apollo identifier; only strings and numbers qualify
pub fn normalize_apollo_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Arrays pass through, null disappears, anything else is wrapped
pub fn to_array(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Bool(b) => *b,
        _ => true,
    })
}

/// Pull a collection out of any of the shapes the feed uses:
/// `{C: {I: x}}`, `{C: [..]}`, `[..]` or `{I: x}`
pub fn extract_collection(payload: &Value, container: &str, item: &str) -> Vec<Value> {
    if let Some(items) = present(path(payload, &[container, item])) {
        return to_array(items);
    }
    if let Some(Value::Array(items)) = payload.get(container) {
        return items.clone();
    }
    if let Value::Array(items) = payload {
        return items.clone();
    }
    if let Some(items) = present(payload.get(item)) {
        return to_array(items);
    }
    Vec::new()
}

pub fn extract_feed_collection(payload: &Value, collection: FeedCollection) -> Vec<Value> {
    extract_collection(payload, collection.container(), collection.item())
}

/// Shows from `{Schedule:{Shows:{Show}}}`, `{Shows:{Show}}`, `{Shows:[..]}` or `[..]`
pub fn extract_shows(schedule: &Value) -> Vec<Value> {
    if let Some(shows) = present(path(schedule, &["Schedule", "Shows", "Show"])) {
        return to_array(shows);
    }
    if let Some(shows) = present(path(schedule, &["Shows", "Show"])) {
        return to_array(shows);
    }
    if let Some(Value::Array(shows)) = schedule.get("Shows") {
        return shows.clone();
    }
    if let Value::Array(shows) = schedule {
        return shows.clone();
    }
    Vec::new()
}


pub fn show_event_id(show: &Value) -> Option<String> {
    ["EventID", "EventId"]
        .iter()
        .find_map(|key| normalize_apollo_id(show.get(*key)))
        .or_else(|| normalize_apollo_id(path(show, &["Event", "ID"])))
        .or_else(|| normalize_apollo_id(path(show, &["Event", "EventID"])))
}

pub fn show_title(show: &Value) -> Option<String> {
    first_text(show, &["EventTitle", "Title", "OriginalTitle"]).or_else(|| {
        show.get("Event")
            .and_then(|event| first_text(event, &["Title", "OriginalTitle"]))
    })
}

pub fn show_description(show: &Value) -> Option<String> {
    first_text(show, &["Synopsis", "EventDescription"])
}

pub fn show_theatre_id(show: &Value) -> Option<String> {
    normalize_apollo_id(show.get("TheatreID"))
}

/// Auditorium name; object values carry it in Name/name
pub fn show_hall_name(show: &Value) -> Option<String> {
    SHOW_HALL_FIELDS.iter().find_map(|field| match show.get(*field)? {
        Value::Object(_) => first_text(&show[*field], &["Name", "name"]),
        other => text(Some(other)),
    })
}

/// Hall names compare trimmed and lowercased
pub fn normalize_hall_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Language given as a string or as an object with Name/NameInLanguage
pub fn language_name(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Object(_) => first_text(value?, &["Name", "NameInLanguage"]),
        other => text(Some(other)),
    }
}

/// Spoken languages joined with ", ", "Unknown" when none
pub fn session_language(show: &Value) -> String {
    let languages: Vec<String> = ["SpokenLanguage", "SpokenLanguage2"]
        .iter()
        .filter_map(|key| language_name(show.get(*key)))
        .collect();
    if languages.is_empty() {
        "Unknown".to_string()
    } else {
        languages.join(", ")
    }
}

/// Subtitle languages joined with ", ", empty when none
pub fn session_subtitles(show: &Value) -> String {
    ["SubtitleLanguage1", "SubtitleLanguage2"]
        .iter()
        .filter_map(|key| language_name(show.get(*key)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn show_time(show: &Value, local: &str, plain: &str, utc: &str) -> Option<DateTime<Utc>> {
    let order = if text(show.get(local)).is_some() {
        [local, plain, utc]
    } else {
        [plain, local, utc]
    };
    let raw = order.iter().find_map(|key| text(show.get(*key)))?;
    parse_timestamp(&raw)
}

/// Show start; the local timestamp wins when present
pub fn show_start(show: &Value) -> Option<DateTime<Utc>> {
    show_time(show, "dttmShowStartLocal", "dttmShowStart", "dttmShowStartUTC")
}

/// Show end, or start + duration + buffer when missing or unparseable
pub fn show_end(show: &Value, start: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
    show_time(show, "dttmShowEndLocal", "dttmShowEnd", "dttmShowEndUTC").unwrap_or_else(|| {
        start + Duration::minutes(i64::from(duration_minutes) + SESSION_BUFFER_MINUTES)
    })
}
