use crate::{
    document::model::{ColorScheme, Section, SectionStyle, Typography, WireframeDocument},
    foundation::core::Rgba8,
};

/// Broad section categories that get distinct default styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    Hero,
    Header,
    Footer,
    CallToAction,
    Other,
}

impl SectionKind {
    pub fn from_tag(tag: &str) -> Self {
        match crate::document::kind::normalize_tag(tag).as_str() {
            "hero" | "banner" | "jumbotron" => Self::Hero,
            "header" | "nav" | "navbar" | "navigation" => Self::Header,
            "footer" => Self::Footer,
            "cta" | "calltoaction" | "signup" | "newsletter" => Self::CallToAction,
            _ => Self::Other,
        }
    }

    /// Minimum auto-layout height in px.
    pub fn min_height(self) -> f64 {
        match self {
            Self::Hero => 320.0,
            Self::Header => 80.0,
            Self::Footer => 120.0,
            Self::CallToAction => 160.0,
            Self::Other => 140.0,
        }
    }
}

/// Resolved colours for one section (or the document base).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub background: Rgba8,
    pub border: Rgba8,
    pub text: Rgba8,
    pub muted: Rgba8,
    pub surface: Rgba8,
    pub primary: Rgba8,
    pub secondary: Rgba8,
    pub accent: Rgba8,
    pub dark: bool,
}

const LIGHT_BG: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
const LIGHT_BORDER: Rgba8 = Rgba8::rgb(0xe5, 0xe7, 0xeb);
const LIGHT_TEXT: Rgba8 = Rgba8::rgb(0x11, 0x18, 0x27);
const DARK_BG: Rgba8 = Rgba8::rgb(0x1f, 0x29, 0x37);
const DARK_BORDER: Rgba8 = Rgba8::rgb(0x37, 0x41, 0x51);
const DARK_TEXT: Rgba8 = Rgba8::rgb(0xf9, 0xfa, 0xfb);

pub const LIGHT_CANVAS: Rgba8 = Rgba8::rgb(0xf8, 0xfa, 0xfc);
pub const DARK_CANVAS: Rgba8 = Rgba8::rgb(0x11, 0x18, 0x27);

impl Palette {
    /// Dark/light defaults overlaid with the document colour scheme.
    pub fn base(scheme: &ColorScheme, dark: bool) -> Self {
        let (bg, border, text) = if dark {
            (DARK_BG, DARK_BORDER, DARK_TEXT)
        } else {
            (LIGHT_BG, LIGHT_BORDER, LIGHT_TEXT)
        };
        let mut p = Self {
            background: bg,
            border,
            text,
            muted: text,
            surface: bg,
            primary: parse_or(scheme.primary.as_deref(), Rgba8::rgb(0x3b, 0x82, 0xf6)),
            secondary: parse_or(scheme.secondary.as_deref(), Rgba8::rgb(0x64, 0x74, 0x8b)),
            accent: parse_or(scheme.accent.as_deref(), Rgba8::rgb(0xf5, 0x9e, 0x0b)),
            dark,
        };
        // Scheme background/text only apply in light mode; dark mode keeps its own base.
        if !dark {
            p.background = parse_or(scheme.background.as_deref(), p.background);
            p.text = parse_or(scheme.text.as_deref(), p.text);
        }
        p.derive();
        p
    }

    /// Section-type defaults, then the section's own style, on top of `self`.
    pub fn for_section(&self, section: &Section) -> Self {
        let mut p = *self;
        match SectionKind::from_tag(&section.section_type) {
            SectionKind::Hero => p.background = p.background.mix(p.primary, 0.12),
            SectionKind::CallToAction => p.background = p.background.mix(p.primary, 0.2),
            SectionKind::Header => p.background = p.background.mix(p.text, 0.04),
            SectionKind::Footer => {
                p.background = if p.dark {
                    Rgba8::rgb(0x11, 0x18, 0x27)
                } else {
                    Rgba8::rgb(0xf3, 0xf4, 0xf6)
                };
            }
            SectionKind::Other => {}
        }
        p.apply_style(&section.style);
        p.derive();
        p
    }

    /// Placeholder colours for a section that failed to build.
    pub fn error(&self) -> Self {
        let mut p = *self;
        if p.dark {
            p.background = Rgba8::rgb(0x45, 0x0a, 0x0a);
        } else {
            p.background = Rgba8::rgb(0xfe, 0xf2, 0xf2);
        }
        p.border = Rgba8::rgb(0xef, 0x44, 0x44);
        p.derive();
        p
    }

    fn apply_style(&mut self, style: &SectionStyle) {
        self.background = parse_or(style.background_color.as_deref(), self.background);
        self.border = parse_or(style.border_color.as_deref(), self.border);
        self.text = parse_or(style.text_color.as_deref(), self.text);
    }

    fn derive(&mut self) {
        self.muted = self.text.mix(self.background, 0.45);
        self.surface = self.background.mix(self.text, 0.05);
    }

    /// Readable label colour on top of `fill`.
    pub fn on(fill: Rgba8) -> Rgba8 {
        if fill.luminance() > 0.6 {
            LIGHT_TEXT
        } else {
            Rgba8::WHITE
        }
    }
}

/// Canvas background: the scheme background, else the mode default.
pub fn canvas_background(doc: &WireframeDocument, dark: bool) -> Rgba8 {
    let default = if dark { DARK_CANVAS } else { LIGHT_CANVAS };
    if dark {
        return default;
    }
    parse_or(doc.color_scheme.background.as_deref(), default)
}

/// Resolved font sizes in px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypeScale {
    pub heading: f64,
    pub body: f64,
    pub label: f64,
}

impl TypeScale {
    pub fn from_typography(t: &Typography) -> Self {
        let body = t
            .base_size
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(14.0);
        let heading = t
            .heading_size
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(body * 2.0);
        Self {
            heading,
            body,
            label: (body * 0.8).max(9.0),
        }
    }
}

impl Default for TypeScale {
    fn default() -> Self {
        Self::from_typography(&Typography::default())
    }
}

pub(crate) fn parse_or(s: Option<&str>, fallback: Rgba8) -> Rgba8 {
    match s {
        Some(s) => match Rgba8::parse(s) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(colour = s, error = %e, "ignoring unparsable colour");
                fallback
            }
        },
        None => fallback,
    }
}
