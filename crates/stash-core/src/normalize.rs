//! Normalization of stored values into export-safe text.
//!
//! Precedence is fixed by the variant order of [`PropertyValue`]:
//! resource → string → number → boolean → date descriptor → list/map →
//! anything else. Numeric-looking strings stay strings.

use std::collections::HashMap;

use chrono_tz::Tz;
use tracing::debug;

use crate::entities::{DateDescriptor, PropertyValue, ResourceRef};
use crate::php_date;

/// Public URI lookup for resource references.
///
/// `None` means the resource no longer exists.
pub trait UriLookup {
    fn public_uri(&self, resource: &ResourceRef) -> Option<String>;
}

/// Prefetched URIs keyed by resource identifier.
impl UriLookup for HashMap<String, String> {
    fn public_uri(&self, resource: &ResourceRef) -> Option<String> {
        self.get(&resource.identifier).cloned()
    }
}

/// Lookup for contexts without a resource store: every resource is missing.
pub struct NoResources;

impl UriLookup for NoResources {
    fn public_uri(&self, _resource: &ResourceRef) -> Option<String> {
        None
    }
}

/// Turns [`PropertyValue`]s into strings for listing and export.
pub struct Normalizer<'a> {
    uris: &'a dyn UriLookup,
    datetime_format: &'a str,
}

impl<'a> Normalizer<'a> {
    /// `datetime_format` is the PHP-style format used for date descriptors.
    #[must_use]
    pub fn new(uris: &'a dyn UriLookup, datetime_format: &'a str) -> Self {
        Self {
            uris,
            datetime_format,
        }
    }

    /// Stringify `value` at nesting level `indent`.
    ///
    /// Lists and maps become bullet lists joined by CRLF: the first item is
    /// prefixed with `"- "`, following items with `indent * 2` spaces and
    /// `"- "`. A nested list therefore starts on its parent's bullet line.
    #[must_use]
    pub fn stringify(&self, value: &PropertyValue, indent: usize) -> String {
        match value {
            PropertyValue::Resource(resource) => self.uris.public_uri(resource).unwrap_or_default(),
            PropertyValue::String(text) => text.clone(),
            PropertyValue::Number(number) => number.to_string(),
            PropertyValue::Bool(flag) => flag.to_string(),
            PropertyValue::Date(date) => self.format_date(date),
            PropertyValue::List(items) => self.bullet_list(items.iter(), indent),
            PropertyValue::Map(map) => self.bullet_list(map.values(), indent),
            PropertyValue::Null => String::new(),
        }
    }

    fn bullet_list<'v>(&self, items: impl Iterator<Item = &'v PropertyValue>, indent: usize) -> String {
        let rendered: Vec<String> = items.map(|item| self.stringify(item, indent + 1)).collect();
        if rendered.is_empty() {
            return String::new();
        }
        let separator = format!("\r\n{}- ", " ".repeat(indent * 2));
        format!("- {}", rendered.join(&separator))
    }

    fn format_date(&self, date: &DateDescriptor) -> String {
        let tz = match date.timezone.as_deref() {
            Some(name) => match name.parse::<Tz>() {
                Ok(tz) => tz,
                Err(error) => {
                    debug!(timezone = name, %error, "unknown timezone in date value");
                    return String::new();
                }
            },
            None => Tz::UTC,
        };

        php_date::parse_in(&date.date, &date.date_format, tz).map_or_else(
            || {
                debug!(
                    date = %date.date,
                    format = %date.date_format,
                    "date value does not match its format"
                );
                String::new()
            },
            |parsed| php_date::format(&parsed, self.datetime_format),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::entities::Properties;

    fn normalizer<'a>(uris: &'a dyn UriLookup, format: &'a str) -> Normalizer<'a> {
        Normalizer::new(uris, format)
    }

    #[test]
    fn scalars() {
        let n = normalizer(&NoResources, "Y-m-d");
        assert_eq!(n.stringify(&PropertyValue::from("42"), 0), "42");
        assert_eq!(n.stringify(&PropertyValue::from(42), 0), "42");
        assert_eq!(
            n.stringify(&PropertyValue::Number(serde_json::Number::from_f64(1.5).unwrap()), 0),
            "1.5"
        );
        assert_eq!(n.stringify(&PropertyValue::Bool(true), 0), "true");
        assert_eq!(n.stringify(&PropertyValue::Bool(false), 0), "false");
        assert_eq!(n.stringify(&PropertyValue::Null, 0), "");
    }

    #[test]
    fn date_descriptor_is_reformatted() {
        let n = normalizer(&NoResources, "d.m.Y");
        let value = PropertyValue::Date(DateDescriptor {
            date: "2024-01-15".into(),
            date_format: "Y-m-d".into(),
            timezone: Some("UTC".into()),
        });
        assert_eq!(n.stringify(&value, 0), "15.01.2024");
    }

    #[test]
    fn stored_date_with_picker_metadata_is_reformatted() {
        let n = normalizer(&NoResources, "d.m.Y");
        let value: PropertyValue = serde_json::from_str(
            r#"{"date":"2024-01-15","dateFormat":"Y-m-d","timezone":"UTC","timezone_type":3}"#,
        )
        .unwrap();
        assert_eq!(n.stringify(&value, 0), "15.01.2024");
    }

    #[test]
    fn broken_date_descriptor_is_empty() {
        let n = normalizer(&NoResources, "d.m.Y");
        let bad_zone = PropertyValue::Date(DateDescriptor {
            date: "2024-01-15".into(),
            date_format: "Y-m-d".into(),
            timezone: Some("Mars/Olympus".into()),
        });
        let bad_value = PropertyValue::Date(DateDescriptor {
            date: "yesterday".into(),
            date_format: "Y-m-d".into(),
            timezone: None,
        });
        assert_eq!(n.stringify(&bad_zone, 0), "");
        assert_eq!(n.stringify(&bad_value, 0), "");
    }

    #[test]
    fn nested_list_bullets_grow_with_depth() {
        let n = normalizer(&NoResources, "Y-m-d");
        let value = PropertyValue::List(vec![
            PropertyValue::from("a"),
            PropertyValue::List(vec![PropertyValue::from("b"), PropertyValue::from("c")]),
        ]);
        assert_eq!(n.stringify(&value, 0), "- a\r\n- - b\r\n  - c");
    }

    #[test]
    fn map_values_are_listed_in_order() {
        let n = normalizer(&NoResources, "Y-m-d");
        let map: Properties = [("first", PropertyValue::from("x")), ("second", PropertyValue::from(2))]
            .into_iter()
            .collect();
        assert_eq!(n.stringify(&PropertyValue::Map(map), 0), "- x\r\n- 2");
    }

    #[test]
    fn empty_list_is_empty() {
        let n = normalizer(&NoResources, "Y-m-d");
        assert_eq!(n.stringify(&PropertyValue::List(Vec::new()), 0), "");
    }

    #[test]
    fn resources_resolve_to_public_uri_or_empty() {
        let mut uris = HashMap::new();
        uris.insert("res-1".to_string(), "/_Resources/Persistent/res-1/cv.pdf".to_string());
        let n = normalizer(&uris, "Y-m-d");

        let known = PropertyValue::Resource(ResourceRef::new("res-1"));
        let gone = PropertyValue::Resource(ResourceRef::new("res-2"));
        assert_eq!(n.stringify(&known, 0), "/_Resources/Persistent/res-1/cv.pdf");
        assert_eq!(n.stringify(&gone, 0), "");
    }
}
