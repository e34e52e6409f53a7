use indexmap::IndexMap;

/// CSS property to value, in insertion order.
pub type Declarations = IndexMap<String, String>;

/// The value of a `style` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleValue {
    /// Passed through unchanged.
    Raw(String),
    Declarations(Declarations),
}

impl StyleValue {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: DeclarationValue,
    {
        Self::Declarations(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_declaration()))
                .collect(),
        )
    }
}

/// A scalar usable as a CSS declaration value.
///
/// Floats keep their fractional part (`3.0` stays `3.0`), the same text a
/// number child renders as.
pub trait DeclarationValue {
    fn to_declaration(&self) -> String;
}

impl DeclarationValue for str {
    fn to_declaration(&self) -> String {
        self.to_string()
    }
}

impl DeclarationValue for String {
    fn to_declaration(&self) -> String {
        self.clone()
    }
}

impl DeclarationValue for bool {
    fn to_declaration(&self) -> String {
        self.to_string()
    }
}

impl DeclarationValue for f64 {
    fn to_declaration(&self) -> String {
        format_float(*self)
    }
}

impl<T: DeclarationValue + ?Sized> DeclarationValue for &T {
    fn to_declaration(&self) -> String {
        (**self).to_declaration()
    }
}

macro_rules! integer_declarations {
    ($($ty:ty),*) => {
        $(
            impl DeclarationValue for $ty {
                fn to_declaration(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_declarations!(i32, i64, u32, u64, usize);

/// JSON number text for finite floats, `NaN`/`inf` otherwise.
pub fn format_float(n: f64) -> String {
    serde_json::Number::from_f64(n)
        .map(|num| num.to_string())
        .unwrap_or_else(|| n.to_string())
}

impl From<&str> for StyleValue {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<Declarations> for StyleValue {
    fn from(decls: Declarations) -> Self {
        Self::Declarations(decls)
    }
}

/// Underscores become hyphens so identifiers like `background_color` can be
/// used as property and attribute names.
pub fn hyphenate(name: &str) -> String {
    name.replace('_', "-")
}

pub fn render_inline_style(style: &StyleValue) -> String {
    match style {
        StyleValue::Raw(raw) => raw.clone(),
        StyleValue::Declarations(decls) => render_declarations(decls),
    }
}

/// `prop:value;` fragments joined by a single space.
pub fn render_declarations(decls: &Declarations) -> String {
    decls
        .iter()
        .map(|(prop, value)| format!("{}:{};", hyphenate(prop), value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `selector { prop:value; prop:value; }`
pub fn render_ruleset(selector: &str, decls: &Declarations) -> String {
    format!("{} {{ {} }}", selector, render_declarations(decls))
}
