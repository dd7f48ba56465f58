use std::fmt;

/// Semantic component kind, resolved from a component's free-form `type` tag.
///
/// Tags are matched case-insensitively with `-`, `_` and spaces ignored. Anything unrecognized is
/// carried as [`ComponentKind::Unknown`] and rendered with the fallback builder.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Navbar,
    Heading,
    Text,
    Button,
    Link,
    Image,
    Video,
    Icon,
    Input,
    Textarea,
    Form,
    Checkbox,
    Card,
    List,
    Divider,
    Avatar,
    Badge,
    Unknown(String),
}

impl ComponentKind {
    /// Every built-in kind, in declaration order.
    pub const BUILTIN: [ComponentKind; 17] = [
        Self::Navbar,
        Self::Heading,
        Self::Text,
        Self::Button,
        Self::Link,
        Self::Image,
        Self::Video,
        Self::Icon,
        Self::Input,
        Self::Textarea,
        Self::Form,
        Self::Checkbox,
        Self::Card,
        Self::List,
        Self::Divider,
        Self::Avatar,
        Self::Badge,
    ];

    pub fn from_tag(tag: &str) -> Self {
        let norm = normalize_tag(tag);
        match norm.as_str() {
            "navbar" | "nav" | "navigation" | "header" | "menu" | "topbar" => Self::Navbar,
            "heading" | "title" | "h1" | "h2" | "h3" | "headline" | "subheading" => Self::Heading,
            "text" | "paragraph" | "body" | "description" | "copy" | "label" => Self::Text,
            "button" | "cta" | "btn" => Self::Button,
            "link" | "anchor" => Self::Link,
            "image" | "img" | "picture" | "heroimage" | "logo" | "illustration" => Self::Image,
            "video" | "media" => Self::Video,
            "icon" => Self::Icon,
            "input" | "textfield" | "search" | "searchbar" | "email" => Self::Input,
            "textarea" | "multiline" => Self::Textarea,
            "form" | "contactform" | "signup" => Self::Form,
            "checkbox" | "toggle" | "radio" => Self::Checkbox,
            "card" | "feature" | "featurecard" | "testimonial" | "pricing" | "pricingcard" => {
                Self::Card
            }
            "list" | "ul" | "ol" | "features" | "featurelist" => Self::List,
            "divider" | "separator" | "hr" => Self::Divider,
            "avatar" | "profile" => Self::Avatar,
            "badge" | "tag" | "chip" | "pill" => Self::Badge,
            _ => Self::Unknown(tag.trim().to_string()),
        }
    }

    /// Label used when a component carries no content of its own.
    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Navbar => "Brand",
            Self::Heading => "Heading",
            Self::Text => "Lorem ipsum dolor sit amet",
            Self::Button => "Button",
            Self::Link => "Link",
            Self::Input => "Enter text",
            Self::Textarea => "Your message",
            Self::Form => "Submit",
            Self::Checkbox => "Option",
            Self::Card => "Card title",
            Self::Badge => "Badge",
            _ => "",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Canonical tag of a built-in kind; the original tag for unknown kinds.
    pub fn tag(&self) -> &str {
        match self {
            Self::Navbar => "navbar",
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Button => "button",
            Self::Link => "link",
            Self::Image => "image",
            Self::Video => "video",
            Self::Icon => "icon",
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Form => "form",
            Self::Checkbox => "checkbox",
            Self::Card => "card",
            Self::List => "list",
            Self::Divider => "divider",
            Self::Avatar => "avatar",
            Self::Badge => "badge",
            Self::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
