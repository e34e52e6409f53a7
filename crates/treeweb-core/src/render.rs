use crate::error::Result;
use std::fmt;

/// Anything that can appear as a node inside a content sequence.
///
/// `indent` is `None` for dense output, or the nesting depth of this node.
pub trait Render: fmt::Debug {
    fn render(&self, indent: Option<usize>) -> Result<String>;
}

/// Prefix `content` with a newline and two spaces per level, or return it
/// unchanged in dense mode.
pub fn indented(content: &str, indent: Option<usize>) -> String {
    match indent {
        Some(depth) => format!("\n{}{}", "  ".repeat(depth), content),
        None => content.to_string(),
    }
}

pub(crate) fn deeper(indent: Option<usize>) -> Option<usize> {
    indent.map(|depth| depth + 1)
}
