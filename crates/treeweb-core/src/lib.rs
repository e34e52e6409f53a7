//! treeweb core crate.
//!
//! A small markup tree renderer. Callers build a tree of [`Element`]s
//! top-down, render it once into a string, and throw the tree away:
//!
//! - `element`: the node type, its attribute and content shapes, and the
//!   recursive renderer.
//! - `style`: inline style and CSS ruleset serialization.
//! - `render`: the [`Render`] trait and the [`indented`] line helper shared by
//!   every node kind.
//! - `tags`: one constructor per common tag plus the `attrs!`, `declarations!`,
//!   `rulesets!` and `children!` macros.
//! - `json`: construction from loosely typed `serde_json::Value` input with
//!   eager shape checks.
//!
//! Two rendering modes exist. Dense mode (`indent = None`) emits everything on
//! a single line. Indented mode (`indent = Some(depth)`) starts every tag and
//! text run on a new line prefixed with two spaces per nesting level. The exact
//! whitespace is part of the contract.

pub mod element;
pub mod error;
pub mod json;
pub mod render;
pub mod style;
pub mod tags;

pub use element::{AttrValue, Attributes, COMMENT_TAG, Child, Content, Element, Rulesets, write_markup};
pub use error::{MarkupError, Result};
pub use json::{make_node, node_from_value, style_from_value};
pub use render::{Render, indented};
pub use style::{
    DeclarationValue, Declarations, StyleValue, format_float, hyphenate, render_inline_style, render_ruleset,
};
