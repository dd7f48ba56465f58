//! Component type registry: semantic component kind to drawable-subtree builder.

pub mod builders;

use std::collections::HashMap;

use crate::{
    document::kind::{ComponentKind, normalize_tag},
    document::model::Component,
    foundation::core::Geometry,
    scene::drawable::{Drawable, NodeRole, PrimitiveKind, Tags},
    scene::factory::NodeFactory,
    scene::style::{Palette, TypeScale},
};

/// Shared inputs every build function sees for one component.
#[derive(Clone, Copy, Debug)]
pub struct BuildContext<'a> {
    pub palette: &'a Palette,
    pub typescale: &'a TypeScale,
    /// Section-relative frame the component was laid out into.
    pub frame: Geometry,
    pub dark_mode: bool,
}

impl BuildContext<'_> {
    pub fn width(&self) -> f64 {
        self.frame.width
    }

    pub fn height(&self) -> f64 {
        self.frame.height
    }
}

/// Builds the subtree for one component in the component's local space.
pub type BuildFn = fn(&Component, &BuildContext<'_>, &mut NodeFactory<'_>) -> Drawable;

/// Maps component tags to build functions. Custom registrations take precedence over the
/// built-in kinds; anything unresolved gets the labeled-rectangle fallback.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    custom: HashMap<String, BuildFn>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&String> = self.custom.keys().collect();
        tags.sort();
        f.debug_struct("ComponentRegistry")
            .field("custom", &tags)
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` for `tag`, returning any previous custom builder for it.
    pub fn register_custom(&mut self, tag: &str, f: BuildFn) -> Option<BuildFn> {
        self.custom.insert(normalize_tag(tag), f)
    }

    pub fn is_custom(&self, tag: &str) -> bool {
        self.custom.contains_key(&normalize_tag(tag))
    }

    /// Build function for a raw component tag. Never fails.
    pub fn resolve(&self, tag: &str) -> BuildFn {
        match self.custom.get(&normalize_tag(tag)) {
            Some(f) => *f,
            None => Self::builtin(&ComponentKind::from_tag(tag)),
        }
    }

    pub fn builtin(kind: &ComponentKind) -> BuildFn {
        match kind {
            ComponentKind::Navbar => builders::navbar,
            ComponentKind::Heading => builders::heading,
            ComponentKind::Text => builders::text,
            ComponentKind::Button => builders::button,
            ComponentKind::Link => builders::link,
            ComponentKind::Image => builders::image,
            ComponentKind::Video => builders::video,
            ComponentKind::Icon => builders::icon,
            ComponentKind::Input => builders::input,
            ComponentKind::Textarea => builders::textarea,
            ComponentKind::Form => builders::form,
            ComponentKind::Checkbox => builders::checkbox,
            ComponentKind::Card => builders::card,
            ComponentKind::List => builders::list,
            ComponentKind::Divider => builders::divider,
            ComponentKind::Avatar => builders::avatar,
            ComponentKind::Badge => builders::badge,
            ComponentKind::Unknown(_) => builders::fallback,
        }
    }

    /// Builds `c` and normalizes the result into exactly one component-root group placed at
    /// `ctx.frame`.
    pub fn build(
        &self,
        c: &Component,
        ctx: &BuildContext<'_>,
        factory: &mut NodeFactory<'_>,
    ) -> Drawable {
        let built = (self.resolve(&c.kind))(c, ctx, factory);
        let mut root = if built.kind == PrimitiveKind::Group {
            built
        } else {
            factory.group(&c.id, NodeRole::ComponentRoot, ctx.frame, vec![built])
        };
        root.role = NodeRole::ComponentRoot;
        root.geometry = ctx.frame;
        root.tags = Tags::SELECTABLE;
        if let Some(o) = c.style.opacity.filter(|o| o.is_finite()) {
            root.style.opacity = o.clamp(0.0, 1.0);
        }
        root
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/builders.rs"]
mod tests;
