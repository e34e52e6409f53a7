use crate::error::{MarkupError, Result};
use crate::render::{Render, deeper, indented};
use crate::style::{Declarations, StyleValue, format_float, hyphenate, render_inline_style, render_ruleset};
use indexmap::IndexMap;
use serde_json::Number;
use std::fs;
use std::path::{Path, PathBuf};

/// Tag name of a comment node. Renders as `<!-- ... -->`.
pub const COMMENT_TAG: &str = "!--";

/// Attribute name to value, rendered in insertion order.
pub type Attributes = IndexMap<String, AttrValue>;

/// Selector to declaration block, the content of a `<style>` element.
pub type Rulesets = IndexMap<String, Declarations>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    /// Space-joined. An empty list still renders `name=""`.
    List(Vec<String>),
    /// Only legal under the `style` attribute.
    Style(StyleValue),
    /// Rendered as the bare name, e.g. `disabled`.
    Bare,
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<StyleValue> for AttrValue {
    fn from(style: StyleValue) -> Self {
        Self::Style(style)
    }
}

impl From<Declarations> for AttrValue {
    fn from(decls: Declarations) -> Self {
        Self::Style(StyleValue::Declarations(decls))
    }
}

impl From<()> for AttrValue {
    fn from(_: ()) -> Self {
        Self::Bare
    }
}

/// One entry of a content sequence.
#[derive(Debug)]
pub enum Child {
    Text(String),
    Number(Number),
    Element(Element),
    Custom(Box<dyn Render>),
}

impl Render for Child {
    fn render(&self, indent: Option<usize>) -> Result<String> {
        match self {
            Child::Text(text) => Ok(indented(text, indent)),
            Child::Number(n) => Ok(indented(&n.to_string(), indent)),
            Child::Element(el) => el.render(indent),
            Child::Custom(node) => node.render(indent),
        }
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Element> for Child {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<Box<dyn Render>> for Child {
    fn from(node: Box<dyn Render>) -> Self {
        Self::Custom(node)
    }
}

impl From<Number> for Child {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Child {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for Child {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Child {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Child {
    fn from(n: f64) -> Self {
        // NaN and infinities have no JSON number form.
        Number::from_f64(n)
            .map(Self::Number)
            .unwrap_or_else(|| Self::Text(format_float(n)))
    }
}

#[derive(Debug)]
pub enum Content {
    /// Self-closing element, no closing tag.
    Void,
    Text(String),
    Number(Number),
    Children(Vec<Child>),
    /// Only legal for `<style>`.
    Rules(Rulesets),
}

impl Content {
    fn kind(&self) -> &'static str {
        match self {
            Content::Void => "void",
            Content::Text(_) => "text",
            Content::Number(_) => "number",
            Content::Children(_) => "sequence",
            Content::Rules(_) => "ruleset map",
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Number> for Content {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Content {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<Vec<Child>> for Content {
    fn from(children: Vec<Child>) -> Self {
        Self::Children(children)
    }
}

impl From<Element> for Content {
    fn from(el: Element) -> Self {
        Self::Children(vec![Child::Element(el)])
    }
}

impl From<Rulesets> for Content {
    fn from(rules: Rulesets) -> Self {
        Self::Rules(rules)
    }
}

/// A markup element: tag, attributes and content.
///
/// Shape is checked when the element is built and again when it is
/// rendered, since attributes and content stay mutable in between.
#[derive(Debug)]
pub struct Element {
    tag: String,
    attrs: Attributes,
    content: Content,
}

impl Element {
    pub fn new(tag: impl Into<String>, attrs: Attributes, content: impl Into<Content>) -> Result<Self> {
        let tag = normalize_tag(tag.into())?;
        let content = content.into();
        check_attrs(&tag, &attrs)?;
        check_content(&tag, &content)?;
        Ok(Self {
            tag,
            attrs,
            content,
        })
    }

    pub fn comment(content: impl Into<Content>) -> Result<Self> {
        Self::new(COMMENT_TAG, Attributes::new(), content)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn is_comment(&self) -> bool {
        self.tag == COMMENT_TAG
    }

    pub fn set_content(&mut self, content: impl Into<Content>) -> Result<()> {
        let content = content.into();
        check_content(&self.tag, &content)?;
        self.content = content;
        Ok(())
    }

    /// Append to a sequence content. Fails for any other content shape.
    pub fn push(&mut self, child: impl Into<Child>) -> Result<()> {
        match &mut self.content {
            Content::Children(children) => {
                children.push(child.into());
                Ok(())
            }
            other => Err(MarkupError::invalid(format!(
                "cannot append to {} content of <{}>",
                other.kind(),
                self.tag
            ))),
        }
    }

    pub fn extend<I, C>(&mut self, children: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        for child in children {
            self.push(child)?;
        }
        Ok(())
    }

    /// Render and write to `path` followed by a newline, creating parent
    /// directories. Returns the absolute path of the written file.
    pub fn render_to_file(&self, path: impl AsRef<Path>, indent: Option<usize>) -> Result<PathBuf> {
        let written = write_markup(path, &self.render(indent)?)?;
        log::debug!("wrote <{}> tree to {}", self.tag, written.display());
        Ok(written)
    }
}

/// Write already rendered markup (or any generated text) to `path` with a
/// trailing newline, creating parent directories. Returns the absolute path.
pub fn write_markup(path: impl AsRef<Path>, markup: &str) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| MarkupError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, format!("{markup}\n")).map_err(|source| MarkupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    fs::canonicalize(path).map_err(|source| MarkupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl Render for Element {
    fn render(&self, indent: Option<usize>) -> Result<String> {
        let comment = self.is_comment();
        let mut out = indented(&format!("<{}", self.tag), indent);

        if comment && !self.attrs.is_empty() {
            return Err(MarkupError::invalid("comment nodes cannot carry attributes"));
        }
        for (name, value) in &self.attrs {
            render_attr(name, value, &mut out)?;
        }

        if matches!(self.content, Content::Void) && !comment {
            out.push_str("/>");
            return Ok(out);
        }
        out.push(if comment { ' ' } else { '>' });

        let inner = deeper(indent);
        match &self.content {
            Content::Void => {}
            Content::Text(text) => out.push_str(&indented(text, inner)),
            Content::Number(n) => out.push_str(&indented(&n.to_string(), inner)),
            Content::Rules(rules) => {
                if self.tag != "style" {
                    return Err(MarkupError::invalid(format!(
                        "ruleset content is only valid for <style>, not <{}>",
                        self.tag
                    )));
                }
                for (selector, decls) in rules {
                    out.push_str(&indented(&render_ruleset(selector, decls), inner));
                }
            }
            Content::Children(children) => {
                for child in children {
                    out.push_str(&child.render(inner)?);
                }
            }
        }

        let closing = if comment {
            " -->".to_string()
        } else {
            format!("</{}>", self.tag)
        };
        out.push_str(&indented(&closing, indent));
        Ok(out)
    }
}

fn render_attr(name: &str, value: &AttrValue, out: &mut String) -> Result<()> {
    let name = hyphenate(name);
    match value {
        AttrValue::Text(text) => out.push_str(&format!(" {}=\"{}\"", name, text)),
        AttrValue::List(items) => out.push_str(&format!(" {}=\"{}\"", name, items.join(" "))),
        AttrValue::Style(style) if name == "style" => {
            out.push_str(&format!(" {}=\"{}\"", name, render_inline_style(style)))
        }
        AttrValue::Style(_) => {
            return Err(MarkupError::invalid(format!(
                "style map given for attribute '{name}'"
            )));
        }
        AttrValue::Bare => out.push_str(&format!(" {name}")),
    }
    Ok(())
}

fn normalize_tag(tag: String) -> Result<String> {
    if tag.is_empty() {
        return Err(MarkupError::invalid("tag name must not be empty"));
    }
    if tag == COMMENT_TAG {
        return Ok(tag);
    }
    if tag
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '='))
    {
        return Err(MarkupError::invalid(format!("invalid tag name '{tag}'")));
    }
    Ok(tag.to_lowercase())
}

fn check_attrs(tag: &str, attrs: &Attributes) -> Result<()> {
    if tag == COMMENT_TAG && !attrs.is_empty() {
        return Err(MarkupError::invalid("comment nodes cannot carry attributes"));
    }
    for (name, value) in attrs {
        if matches!(value, AttrValue::Style(_)) && hyphenate(name) != "style" {
            return Err(MarkupError::invalid(format!(
                "style map given for attribute '{name}'"
            )));
        }
    }
    Ok(())
}

fn check_content(tag: &str, content: &Content) -> Result<()> {
    let ok = if tag == "style" {
        matches!(content, Content::Void | Content::Text(_) | Content::Rules(_))
    } else {
        !matches!(content, Content::Rules(_))
    };
    if ok {
        Ok(())
    } else {
        Err(MarkupError::invalid(format!(
            "{} content is not valid for <{}>",
            content.kind(),
            tag
        )))
    }
}
