//! Building trees from `serde_json::Value`.
//!
//! A node is either a `[tag, attrs, content]` triple or an object with
//! `tag`, `attrs` and `content` keys. `null` attrs means none, `null` content
//! means a void element. Every shape is checked before the element exists, so
//! a malformed document fails without producing any markup.

use crate::element::{AttrValue, Attributes, Child, Content, Element, Rulesets};
use crate::error::{MarkupError, Result};
use crate::style::{Declarations, StyleValue, hyphenate};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub fn make_node(tag: &Value, attrs: &Value, content: &Value) -> Result<Element> {
    let tag = tag
        .as_str()
        .ok_or_else(|| MarkupError::invalid(format!("tag name must be a string, got {tag}")))?;
    let attrs = attrs_from_value(attrs)?;
    let content = if tag.eq_ignore_ascii_case("style") {
        style_content_from_value(content)?
    } else {
        content_from_value(content)?
    };
    Element::new(tag, attrs, content)
}

pub fn node_from_value(value: &Value) -> Result<Element> {
    match value {
        Value::Array(parts) if parts.len() == 3 => make_node(&parts[0], &parts[1], &parts[2]),
        Value::Object(obj) if obj.contains_key("tag") => make_node(
            &obj["tag"],
            obj.get("attrs").unwrap_or(&Value::Null),
            obj.get("content").unwrap_or(&Value::Null),
        ),
        other => Err(MarkupError::invalid(format!("not a node: {other}"))),
    }
}

/// Object of declarations or a raw string; anything else is a style error.
pub fn style_from_value(value: &Value) -> Result<StyleValue> {
    match value {
        Value::String(raw) => Ok(StyleValue::Raw(raw.clone())),
        Value::Object(obj) => declarations_from_map(obj).map(StyleValue::Declarations),
        other => Err(MarkupError::Style(other.to_string())),
    }
}

fn attrs_from_value(value: &Value) -> Result<Attributes> {
    match value {
        Value::Null => Ok(Attributes::new()),
        Value::Object(obj) => obj
            .iter()
            .map(|(name, v)| attr_value(name, v).map(|value| (name.clone(), value)))
            .collect(),
        other => Err(MarkupError::invalid(format!(
            "attributes must be an object or null, got {other}"
        ))),
    }
}

fn attr_value(name: &str, value: &Value) -> Result<AttrValue> {
    match value {
        Value::Null => Ok(AttrValue::Bare),
        Value::String(s) => Ok(AttrValue::Text(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    MarkupError::invalid(format!("attribute '{name}' list item {item} is not a string"))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(AttrValue::List),
        Value::Object(obj) if hyphenate(name) == "style" => {
            declarations_from_map(obj).map(|d| AttrValue::Style(StyleValue::Declarations(d)))
        }
        other => Err(MarkupError::invalid(format!(
            "don't know what to do with attribute {name}={other}"
        ))),
    }
}

fn content_from_value(value: &Value) -> Result<Content> {
    match value {
        Value::Null => Ok(Content::Void),
        Value::String(s) => Ok(Content::Text(s.clone())),
        Value::Number(n) => Ok(Content::Number(n.clone())),
        Value::Array(items) => items
            .iter()
            .map(child_from_value)
            .collect::<Result<Vec<_>>>()
            .map(Content::Children),
        other => Err(MarkupError::invalid(format!("invalid content {other}"))),
    }
}

fn style_content_from_value(value: &Value) -> Result<Content> {
    match value {
        Value::Null => Ok(Content::Void),
        Value::String(s) => Ok(Content::Text(s.clone())),
        Value::Object(obj) => {
            let mut rules = Rulesets::new();
            for (selector, decls) in obj {
                let decls = decls.as_object().ok_or_else(|| {
                    MarkupError::invalid(format!("ruleset for '{selector}' must be an object, got {decls}"))
                })?;
                rules.insert(selector.clone(), declarations_from_map(decls)?);
            }
            Ok(Content::Rules(rules))
        }
        other => Err(MarkupError::invalid(format!(
            "<style> content must be a string or an object, got {other}"
        ))),
    }
}

fn child_from_value(value: &Value) -> Result<Child> {
    match value {
        Value::String(s) => Ok(Child::Text(s.clone())),
        Value::Number(n) => Ok(Child::Number(n.clone())),
        Value::Array(_) | Value::Object(_) => node_from_value(value).map(Child::Element),
        other => Err(MarkupError::invalid(format!(
            "don't know what to do with content item {other}"
        ))),
    }
}

fn declarations_from_map(obj: &Map<String, Value>) -> Result<Declarations> {
    obj.iter()
        .map(|(prop, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(MarkupError::Style(format!("{prop}: {other}")));
                }
            };
            Ok((prop.clone(), value))
        })
        .collect()
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        node_from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Render;
    use serde_json::json;

    #[test]
    fn test_make_node_renders_like_typed_api() {
        let body = make_node(
            &json!("body"),
            &json!({"style": {"background-color": "black"}}),
            &json!([["h1", null, "Title"]]),
        )
        .unwrap();
        assert_eq!(
            body.render(None).unwrap(),
            "<body style=\"background-color:black;\"><h1>Title</h1></body>"
        );
    }

    #[test]
    fn test_object_node_form() {
        let node = node_from_value(&json!({
            "tag": "div",
            "attrs": {"class": ["readout", "big"], "data_key": "item3"},
            "content": "waiting ..."
        }))
        .unwrap();
        assert_eq!(
            node.render(None).unwrap(),
            "<div class=\"readout big\" data-key=\"item3\">waiting ...</div>"
        );
    }

    #[test]
    fn test_bare_attribute_from_null() {
        let node = make_node(&json!("input"), &json!({"disabled": null}), &Value::Null).unwrap();
        assert_eq!(node.render(None).unwrap(), "<input disabled/>");
    }

    #[test]
    fn test_tag_must_be_string() {
        let err = make_node(&json!(3), &Value::Null, &json!([])).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_attrs_must_be_object() {
        let err = make_node(&json!("p"), &json!(["id", "x"]), &json!("x")).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_bad_attribute_values() {
        for bad in [json!({"id": 1}), json!({"id": true}), json!({"class": ["a", 2]}), json!({"id": {"a": "b"}})] {
            let err = make_node(&json!("p"), &bad, &json!("x")).unwrap_err();
            assert!(err.is_invalid_argument(), "expected invalid argument for {bad}");
        }
    }

    #[test]
    fn test_bad_content_item_produces_no_output() {
        for bad in [json!(["ok", true]), json!(["ok", null]), json!(["ok", ["p", null]])] {
            let err = make_node(&json!("div"), &Value::Null, &bad).unwrap_err();
            assert!(err.is_invalid_argument(), "expected invalid argument for {bad}");
        }
        assert!(make_node(&json!("div"), &Value::Null, &json!(true)).is_err());
    }

    #[test]
    fn test_numbers_in_content() {
        let node = make_node(&json!("p"), &Value::Null, &json!(["v=", 4.5, " n=", 10])).unwrap();
        assert_eq!(node.render(None).unwrap(), "<p>v=4.5 n=10</p>");
        let single = make_node(&json!("td"), &Value::Null, &json!(7)).unwrap();
        assert_eq!(single.render(None).unwrap(), "<td>7</td>");
    }

    #[test]
    fn test_style_node_from_object() {
        let node = make_node(
            &json!("style"),
            &Value::Null,
            &json!({"p.myclass": {"margin": "4px", "font-color": "blue"}}),
        )
        .unwrap();
        assert_eq!(
            node.render(None).unwrap(),
            "<style>p.myclass { margin:4px; font-color:blue; }</style>"
        );
    }

    #[test]
    fn test_style_node_shape_errors() {
        let err = make_node(&json!("style"), &Value::Null, &json!({"p": "color:red"})).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = make_node(&json!("style"), &Value::Null, &json!(["p"])).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_style_from_value() {
        assert_eq!(
            style_from_value(&json!({"font_size": 32, "color": "red"})).unwrap(),
            StyleValue::from_pairs([("font_size", "32"), ("color", "red")])
        );
        assert_eq!(
            style_from_value(&json!("color:red;")).unwrap(),
            StyleValue::Raw("color:red;".to_string())
        );
        assert!(matches!(style_from_value(&json!(12)), Err(MarkupError::Style(_))));
        assert!(matches!(style_from_value(&json!(["a"])), Err(MarkupError::Style(_))));
    }

    #[test]
    fn test_comment_node_from_json() {
        let node = node_from_value(&json!(["!--", null, "This is out!"])).unwrap();
        assert_eq!(node.render(None).unwrap(), "<!-- This is out! -->");
        assert!(node_from_value(&json!(["!--", {"id": "x"}, "no"])).is_err());
    }

    #[test]
    fn test_deserialize_element() {
        let node: Element =
            serde_json::from_str(r#"["ul", null, [["li", null, "one"], ["li", null, "two"]]]"#).unwrap();
        assert_eq!(node.render(None).unwrap(), "<ul><li>one</li><li>two</li></ul>");
        assert!(serde_json::from_str::<Element>(r#"["ul", 5, []]"#).is_err());
    }
}
