use crate::foundation::error::{SceneError, SceneResult};

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A declarative wireframe: ordered sections of semantic components plus document-wide styling.
///
/// Documents arrive from an external generator and are read-only input to a render pass. Parsing
/// is lenient per section: a section that does not match the expected shape is kept as
/// [`SectionEntry::Malformed`] so the rest of the document still renders.
pub struct WireframeDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionEntry>,
    #[serde(default)]
    pub color_scheme: ColorScheme,
    #[serde(default)]
    pub typography: Typography,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_token: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// One slot of [`WireframeDocument::sections`].
pub enum SectionEntry {
    Valid(Section),
    /// Raw JSON of a section that failed to deserialize.
    Malformed(serde_json::Value),
}

impl SectionEntry {
    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Self::Valid(s) => Some(s),
            Self::Malformed(_) => None,
        }
    }

    /// Best-effort id, also for malformed entries.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Valid(s) => Some(s.id.as_str()),
            Self::Malformed(v) => v.get("id").and_then(serde_json::Value::as_str),
        }
    }

    /// Best-effort display name, also for malformed entries.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Valid(s) => Some(s.name.as_str()),
            Self::Malformed(v) => v.get("name").and_then(serde_json::Value::as_str),
        }
    }

    /// Why a malformed entry did not deserialize.
    pub fn malformed_reason(&self) -> Option<String> {
        match self {
            Self::Valid(_) => None,
            Self::Malformed(v) => Some(match serde_json::from_value::<Section>(v.clone()) {
                Ok(_) => "section shape is ambiguous".to_string(),
                Err(e) => e.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_section_type", alias = "type")]
    pub section_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Stable ordering field used when no explicit `position.y` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub layout_type: LayoutType,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub style: SectionStyle,
}

fn default_section_type() -> String {
    "content".to_string()
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(default)]
    pub id: String,
    /// Semantic kind tag; the only field the registry needs.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub props: serde_json::Value,
    #[serde(default)]
    pub style: ComponentStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
/// Flow direction for a section's components. Unrecognized values fall back to vertical.
pub enum LayoutType {
    #[default]
    Vertical,
    Horizontal,
    Grid,
}

impl From<String> for LayoutType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "row" | "flex" | "inline" => Self::Horizontal,
            "grid" | "columns" => Self::Grid,
            _ => Self::Vertical,
        }
    }
}

impl From<LayoutType> for String {
    fn from(value: LayoutType) -> Self {
        match value {
            LayoutType::Vertical => "vertical",
            LayoutType::Horizontal => "horizontal",
            LayoutType::Grid => "grid",
        }
        .to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStyle {
    #[serde(default, alias = "background", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, alias = "color", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(default, alias = "gridColumns", skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
}

/// Widest grid layout a section may ask for.
pub const MAX_COLUMNS: u32 = 24;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStyle {
    #[serde(default, alias = "background", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, alias = "color", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_font: Option<String>,
    /// Body font size in px.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_size: Option<f64>,
    /// Heading font size in px.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_size: Option<f64>,
}

impl WireframeDocument {
    pub fn from_json_str(s: &str) -> SceneResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| SceneError::malformed(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> SceneResult<Self> {
        if !value.is_object() {
            return Err(SceneError::malformed("document must be a JSON object"));
        }
        serde_json::from_value(value).map_err(|e| SceneError::malformed(e.to_string()))
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Problems that would turn sections into placeholders, as `(index, message)`.
    pub fn section_problems(&self) -> Vec<(usize, String)> {
        let mut out = Vec::new();
        for (idx, entry) in self.sections.iter().enumerate() {
            match entry {
                SectionEntry::Malformed(_) => out.push((
                    idx,
                    entry
                        .malformed_reason()
                        .unwrap_or_else(|| "malformed section".to_string()),
                )),
                SectionEntry::Valid(s) => {
                    if let Err(e) = s.validate() {
                        out.push((idx, e.to_string()));
                    }
                }
            }
        }
        out
    }
}

impl Section {
    /// Rejects geometry the layout cannot place.
    pub fn validate(&self) -> SceneResult<()> {
        if let Some(p) = self.position {
            check_position(p, &format!("section '{}'", self.id))?;
        }
        if let Some(d) = self.dimensions {
            check_dimensions(d, &format!("section '{}'", self.id))?;
        }
        for (name, v) in [("padding", self.style.padding), ("gap", self.style.gap)] {
            if let Some(v) = v
                && !(v.is_finite() && v >= 0.0)
            {
                return Err(SceneError::validation(format!(
                    "section '{}' has invalid {name} {v}",
                    self.id
                )));
            }
        }
        if let Some(cols) = self.style.columns
            && !(1..=MAX_COLUMNS).contains(&cols)
        {
            return Err(SceneError::validation(format!(
                "section '{}' asks for {cols} columns, expected 1..={MAX_COLUMNS}",
                self.id
            )));
        }
        for (idx, c) in self.components.iter().enumerate() {
            let label = format!("component #{idx} ('{}') of section '{}'", c.id, self.id);
            if c.kind.trim().is_empty() {
                return Err(SceneError::validation(format!("{label} has an empty type")));
            }
            if let Some(p) = c.position {
                check_position(p, &label)?;
            }
            if let Some(d) = c.dimensions {
                check_dimensions(d, &label)?;
            }
        }
        Ok(())
    }
}

fn check_position(p: Position, label: &str) -> SceneResult<()> {
    if !(p.x.is_finite() && p.y.is_finite()) {
        return Err(SceneError::validation(format!(
            "{label} has a non-finite position"
        )));
    }
    Ok(())
}

fn check_dimensions(d: Dimensions, label: &str) -> SceneResult<()> {
    for v in [d.width, d.height].into_iter().flatten() {
        if !(v.is_finite() && v >= 0.0) {
            return Err(SceneError::validation(format!(
                "{label} has invalid dimension {v}"
            )));
        }
    }
    Ok(())
}

impl Component {
    /// Display text carried by `content`: a string, an object's `text`/`label`/`title`, or an
    /// array joined with spaces.
    pub fn content_text(&self) -> String {
        value_text(&self.content)
    }

    /// Items for list-like components, taken from an array `content`, `props.items`, or
    /// newline-separated text.
    pub fn list_items(&self) -> Vec<String> {
        if let Some(items) = self.content.as_array() {
            return items.iter().map(value_text).collect();
        }
        if let Some(items) = self.props.get("items").and_then(serde_json::Value::as_array) {
            return items.iter().map(value_text).collect();
        }
        self.content_text()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(serde_json::Value::as_str)
    }

    pub fn prop_f64(&self, key: &str) -> Option<f64> {
        self.props
            .get(key)
            .and_then(serde_json::Value::as_f64)
            .filter(|v| v.is_finite())
    }
}

fn value_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        serde_json::Value::Object(map) => ["text", "label", "title", "heading", "value"]
            .iter()
            .find_map(|k| map.get(*k).map(value_text))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
