//! Tag constructors and literal macros.
//!
//! ```
//! use treeweb_core::tags::{div, h1, input};
//! use treeweb_core::{Render, attrs, children, declarations};
//!
//! let header = div(
//!     attrs! { "style" => declarations! { "text_align" => "center" } },
//!     children![
//!         h1(attrs! {}, "Readouts").unwrap(),
//!         input(attrs! { "id" => "stepinput", "type" => "text" }).unwrap(),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(
//!     header.render(None).unwrap(),
//!     "<div style=\"text-align:center;\"><h1>Readouts</h1><input id=\"stepinput\" type=\"text\"/></div>"
//! );
//! ```

use crate::element::{Attributes, COMMENT_TAG, Content, Element};
use crate::error::Result;

macro_rules! container_tags {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name(attrs: Attributes, content: impl Into<Content>) -> Result<Element> {
                Element::new(stringify!($name), attrs, content)
            }
        )*
    };
}

macro_rules! void_tags {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name(attrs: Attributes) -> Result<Element> {
                Element::new(stringify!($name), attrs, Content::Void)
            }
        )*
    };
}

container_tags!(
    html, head, body, title, script, style, div, span, p, a, h1, h2, h3, label, form, button,
    ul, li,
);

void_tags!(meta, link, input, br, hr, img);

pub fn comment(content: impl Into<Content>) -> Result<Element> {
    Element::new(COMMENT_TAG, Attributes::new(), content)
}

/// Build an [`Attributes`](crate::Attributes) map: `attrs! { "id" => "x", "disabled" => () }`.
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::Attributes::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut attrs = $crate::Attributes::new();
        $(
            attrs.insert(::std::string::String::from($name), $crate::AttrValue::from($value));
        )+
        attrs
    }};
}

/// Build a [`Declarations`](crate::Declarations) map from any [`DeclarationValue`](crate::DeclarationValue).
#[macro_export]
macro_rules! declarations {
    () => {
        $crate::Declarations::new()
    };
    ($($prop:expr => $value:expr),+ $(,)?) => {{
        let mut decls = $crate::Declarations::new();
        $(
            decls.insert(
                ::std::string::String::from($prop),
                $crate::DeclarationValue::to_declaration(&$value),
            );
        )+
        decls
    }};
}

/// Build `<style>` content from `selector => declarations` pairs.
#[macro_export]
macro_rules! rulesets {
    ($($selector:expr => $decls:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut rules = $crate::Rulesets::new();
        $(
            rules.insert(::std::string::String::from($selector), $decls);
        )*
        $crate::Content::Rules(rules)
    }};
}

/// Build sequence content from anything convertible into a [`Child`](crate::Child).
#[macro_export]
macro_rules! children {
    ($($child:expr),* $(,)?) => {
        $crate::Content::Children(::std::vec![$($crate::Child::from($child)),*])
    };
}
