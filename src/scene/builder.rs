use std::collections::BTreeSet;

use crate::{
    document::kind::ComponentKind,
    document::model::{Section, SectionEntry, WireframeDocument},
    foundation::core::Geometry,
    grid::engine::GridEngine,
    layout::flow::{
        self, DEFAULT_PADDING, DeviceType, SECTION_GAP, SECTION_MARGIN, SectionFlow,
    },
    registry::{BuildContext, ComponentRegistry},
    scene::canvas::Canvas,
    scene::drawable::{Drawable, NodeRole, Style, Tags},
    scene::factory::NodeFactory,
    scene::style::{Palette, TypeScale, canvas_background},
};

const TITLE_TOP: f64 = 12.0;
const TITLE_SIZE: f64 = 16.0;
const TYPE_LABEL_TOP: f64 = 34.0;
const TYPE_LABEL_SIZE: f64 = 11.0;
const PLACEHOLDER_HEIGHT: f64 = 120.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub device_type: DeviceType,
    pub dark_mode: bool,
    pub render_grid: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionErrorKind {
    /// The section did not have the expected shape or carried unplaceable geometry.
    Malformed,
    /// The section parsed but building it produced an unusable subtree.
    RenderFailure,
}

/// A section that was replaced by a placeholder.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionError {
    /// Index into `document.sections`.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    pub kind: SectionErrorKind,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    /// Section-root groups added to the canvas, placeholders included.
    pub sections_rendered: usize,
    pub per_section_errors: Vec<SectionError>,
    /// Set when the document as a whole could not be read; the scene is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_error: Option<String>,
    /// Component tags that fell back to the labeled-rectangle builder, sorted.
    pub unknown_kinds: Vec<String>,
    pub drawables_created: usize,
    pub drawables_reused: usize,
    /// Drawables of the previous pass that were unregistered.
    pub retired: usize,
    pub grid_nodes: usize,
    pub scene_height: f64,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.per_section_errors.is_empty() && self.document_error.is_none()
    }
}

/// Turns wireframe documents into section-root groups on a [`Canvas`].
#[derive(Clone, Debug, Default)]
pub struct SceneBuilder {
    registry: ComponentRegistry,
}

impl SceneBuilder {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Unregisters and pools every content drawable. Returns how many were registered.
    pub fn clear(&self, canvas: &mut Canvas, factory: &mut NodeFactory<'_>) -> usize {
        canvas
            .take_content()
            .into_iter()
            .map(|root| factory.retire(root))
            .sum()
    }

    /// Replaces the canvas content with `doc`.
    ///
    /// Drawables are created and registered in section order, then component order. A section
    /// that cannot be built becomes a placeholder and is reported; it never aborts the pass.
    #[tracing::instrument(skip_all, fields(doc = %doc.id, sections = doc.sections.len()))]
    pub fn render(
        &self,
        canvas: &mut Canvas,
        doc: &WireframeDocument,
        opts: &RenderOptions,
        factory: &mut NodeFactory<'_>,
        grid: &GridEngine,
    ) -> RenderReport {
        let created0 = factory.created();
        let reused0 = factory.reused();
        let mut report = RenderReport {
            retired: self.clear(canvas, factory),
            ..RenderReport::default()
        };
        canvas.background = canvas_background(doc, opts.dark_mode);

        let base = Palette::base(&doc.color_scheme, opts.dark_mode);
        let ts = TypeScale::from_typography(&doc.typography);
        let mut flow = SectionFlow::new(canvas.width, opts.device_type);
        let mut unknown = BTreeSet::new();

        for idx in flow::section_order(&doc.sections) {
            let entry = &doc.sections[idx];
            let built = match entry {
                SectionEntry::Malformed(_) => Err(SectionError {
                    index: idx,
                    section_id: entry.id().map(str::to_string),
                    kind: SectionErrorKind::Malformed,
                    message: entry
                        .malformed_reason()
                        .unwrap_or_else(|| "malformed section".to_string()),
                }),
                SectionEntry::Valid(s) => match s.validate() {
                    Err(e) => Err(SectionError {
                        index: idx,
                        section_id: Some(s.id.clone()),
                        kind: SectionErrorKind::Malformed,
                        message: e.to_string(),
                    }),
                    Ok(()) => self.build_section(
                        s,
                        idx,
                        &base,
                        &ts,
                        opts,
                        &mut flow,
                        factory,
                        &mut unknown,
                    ),
                },
            };
            let root = match built {
                Ok(root) => root,
                Err(err) => {
                    tracing::warn!(
                        index = err.index,
                        section = err.section_id.as_deref().unwrap_or("?"),
                        kind = ?err.kind,
                        message = %err.message,
                        "section replaced by placeholder"
                    );
                    let root = self.placeholder(entry, idx, &base, &mut flow, factory);
                    report.per_section_errors.push(err);
                    root
                }
            };
            factory.memory().register_tree(&root);
            canvas.add_section(root);
            report.sections_rendered += 1;
        }

        let bottom = flow.cursor() - SECTION_GAP + SECTION_MARGIN;
        if bottom > canvas.height {
            canvas.height = bottom.ceil();
        }
        report.scene_height = canvas.height;

        report.grid_nodes = if opts.render_grid {
            grid.draw_grid(canvas, factory)
        } else {
            grid.clear_grid(canvas, factory);
            0
        };

        report.unknown_kinds = unknown.into_iter().collect();
        report.drawables_created = factory.created() - created0;
        report.drawables_reused = factory.reused() - reused0;
        tracing::debug!(
            sections = report.sections_rendered,
            errors = report.per_section_errors.len(),
            created = report.drawables_created,
            reused = report.drawables_reused,
            retired = report.retired,
            "render pass complete"
        );
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn build_section(
        &self,
        s: &Section,
        idx: usize,
        base: &Palette,
        ts: &TypeScale,
        opts: &RenderOptions,
        flow: &mut SectionFlow,
        factory: &mut NodeFactory<'_>,
        unknown: &mut BTreeSet<String>,
    ) -> Result<Drawable, SectionError> {
        let palette = base.for_section(s);
        let width = flow.section_width(Some(s));
        let kinds: Vec<ComponentKind> = s
            .components
            .iter()
            .map(|c| {
                let kind = ComponentKind::from_tag(&c.kind);
                if kind.is_unknown()
                    && !self.registry.is_custom(&c.kind)
                    && unknown.insert(c.kind.clone())
                {
                    tracing::warn!(
                        tag = %c.kind,
                        component = %c.id,
                        "unknown component type, using fallback"
                    );
                }
                kind
            })
            .collect();
        let frames = flow::layout_components(s, &kinds, width, ts);
        let height = flow::section_height(s, &frames);
        let pad = s.style.padding.unwrap_or(DEFAULT_PADDING);

        let mut children = Vec::with_capacity(3 + s.components.len());
        children.push(section_background(factory, &s.id, width, height, &palette));
        let title = if s.name.is_empty() { s.id.as_str() } else { s.name.as_str() };
        children.push(section_label(
            factory,
            &s.id,
            NodeRole::SectionTitle,
            title,
            Geometry::new(pad, TITLE_TOP, width - 2.0 * pad, TITLE_SIZE * 1.4),
            palette.text,
            TITLE_SIZE,
        ));
        children.push(section_label(
            factory,
            &s.id,
            NodeRole::SectionTypeLabel,
            &s.section_type.to_uppercase(),
            Geometry::new(pad, TYPE_LABEL_TOP, width - 2.0 * pad, TYPE_LABEL_SIZE * 1.4),
            palette.muted,
            TYPE_LABEL_SIZE,
        ));
        for (c, frame) in s.components.iter().zip(frames) {
            let ctx = BuildContext {
                palette: &palette,
                typescale: ts,
                frame,
                dark_mode: opts.dark_mode,
            };
            children.push(self.registry.build(c, &ctx, factory));
        }

        let geometry = flow.place(s.position, width, height);
        let mut root = factory.group(&s.id, NodeRole::SectionRoot, geometry, children);
        root.tags = Tags::SELECTABLE;

        let mut finite = true;
        root.visit(&mut |d| finite &= d.geometry.is_finite());
        if !finite {
            factory.retire(root);
            return Err(SectionError {
                index: idx,
                section_id: Some(s.id.clone()),
                kind: SectionErrorKind::RenderFailure,
                message: "section produced non-finite geometry".to_string(),
            });
        }
        Ok(root)
    }

    fn placeholder(
        &self,
        entry: &SectionEntry,
        idx: usize,
        base: &Palette,
        flow: &mut SectionFlow,
        factory: &mut NodeFactory<'_>,
    ) -> Drawable {
        let palette = base.error();
        let owner = entry
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| format!("section-{idx}"));
        let width = flow.section_width(None);
        let title = entry
            .name()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Section {}", idx + 1));

        let mut bg = section_background(factory, &owner, width, PLACEHOLDER_HEIGHT, &palette);
        bg.role = NodeRole::Placeholder;
        let children = vec![
            bg,
            section_label(
                factory,
                &owner,
                NodeRole::SectionTitle,
                &title,
                Geometry::new(
                    DEFAULT_PADDING,
                    TITLE_TOP,
                    width - 2.0 * DEFAULT_PADDING,
                    TITLE_SIZE * 1.4,
                ),
                palette.text,
                TITLE_SIZE,
            ),
            section_label(
                factory,
                &owner,
                NodeRole::SectionTypeLabel,
                "COULD NOT RENDER SECTION",
                Geometry::new(
                    DEFAULT_PADDING,
                    TYPE_LABEL_TOP,
                    width - 2.0 * DEFAULT_PADDING,
                    TYPE_LABEL_SIZE * 1.4,
                ),
                palette.border,
                TYPE_LABEL_SIZE,
            ),
        ];
        let geometry = flow.place(None, width, PLACEHOLDER_HEIGHT);
        let mut root = factory.group(&owner, NodeRole::SectionRoot, geometry, children);
        root.tags = Tags::SELECTABLE;
        root
    }
}

fn section_background(
    factory: &mut NodeFactory<'_>,
    owner: &str,
    width: f64,
    height: f64,
    palette: &Palette,
) -> Drawable {
    let mut bg = factory.rect(
        owner,
        Geometry::sized(width, height),
        Style::outlined(Some(palette.background), palette.border, 1.0).with_radius(4.0),
    );
    bg.role = NodeRole::SectionBackground;
    bg
}

fn section_label(
    factory: &mut NodeFactory<'_>,
    owner: &str,
    role: NodeRole,
    text: &str,
    geometry: Geometry,
    color: crate::foundation::core::Rgba8,
    size: f64,
) -> Drawable {
    let mut t = factory.text(owner, geometry, text, color, size);
    t.role = role;
    t
}

#[cfg(test)]
#[path = "../../tests/unit/scene/builder.rs"]
mod tests;
