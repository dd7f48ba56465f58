//! Built-in component builders. Every builder works in the component's local space: `(0, 0)` is
//! the top-left of `ctx.frame` and the subtree spans `ctx.width() x ctx.height()`.

use crate::{
    document::kind::ComponentKind,
    document::model::Component,
    foundation::core::{Geometry, Rgba8},
    layout::flow::form_fields,
    registry::BuildContext,
    scene::drawable::{Drawable, NodeRole, Style},
    scene::factory::NodeFactory,
    scene::style::{Palette, parse_or},
};

/// Average glyph advance as a fraction of font size; greeked text is sized with it.
const GLYPH_ADVANCE: f64 = 0.55;
const LINE_HEIGHT: f64 = 1.4;

#[derive(Clone, Copy, Debug)]
struct Paint {
    fill: Rgba8,
    border: Rgba8,
    text: Rgba8,
    font: f64,
    radius: f64,
}

fn paint(c: &Component, ctx: &BuildContext<'_>, fill: Rgba8, text: Rgba8, font: f64) -> Paint {
    let s = &c.style;
    Paint {
        fill: parse_or(s.background_color.as_deref(), fill),
        border: parse_or(s.border_color.as_deref(), ctx.palette.border),
        text: parse_or(s.text_color.as_deref(), text),
        font: s.font_size.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(font),
        radius: s.border_radius.filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0),
    }
}

fn label(c: &Component, kind: ComponentKind) -> String {
    let t = c.content_text();
    if t.is_empty() {
        kind.default_label().to_string()
    } else {
        t
    }
}

pub(crate) fn text_width(s: &str, font: f64) -> f64 {
    s.chars().count() as f64 * font * GLYPH_ADVANCE
}

fn root(
    f: &mut NodeFactory<'_>,
    c: &Component,
    ctx: &BuildContext<'_>,
    children: Vec<Drawable>,
) -> Drawable {
    f.group(&c.id, NodeRole::ComponentRoot, ctx.frame, children)
}

/// Single text line of natural width at `(x, y)`, clipped to `max_w`.
#[allow(clippy::too_many_arguments)]
fn text_at(
    f: &mut NodeFactory<'_>,
    owner: &str,
    s: &str,
    x: f64,
    y: f64,
    max_w: f64,
    color: Rgba8,
    font: f64,
) -> Drawable {
    let w = text_width(s, font).min(max_w.max(0.0));
    f.text(owner, Geometry::new(x, y, w, font * LINE_HEIGHT), s, color, font)
}

/// Text line centred inside a `w x h` box at the origin.
fn text_centered(
    f: &mut NodeFactory<'_>,
    owner: &str,
    s: &str,
    w: f64,
    h: f64,
    color: Rgba8,
    font: f64,
) -> Drawable {
    let tw = text_width(s, font).min(w);
    let th = font * LINE_HEIGHT;
    f.text(
        owner,
        Geometry::new((w - tw) / 2.0, (h - th) / 2.0, tw, th),
        s,
        color,
        font,
    )
}

pub fn navbar(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.surface, ctx.palette.text, ctx.typescale.body);
    let (w, h) = (ctx.width(), ctx.height());
    let brand = match c.content.as_str() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => c
            .prop_str("brand")
            .unwrap_or(ComponentKind::Navbar.default_label())
            .to_string(),
    };
    let mut items: Vec<String> = c
        .props
        .get("links")
        .or_else(|| c.props.get("items"))
        .and_then(serde_json::Value::as_array)
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    if items.is_empty() {
        items = ["Home", "About", "Contact"].map(str::to_string).to_vec();
    }

    let ty = (h - p.font * LINE_HEIGHT) / 2.0;
    let mut children = vec![
        f.rect(&c.id, Geometry::sized(w, h), Style::filled(p.fill)),
        f.line(&c.id, 0.0, h - 1.0, w, 0.0, 1.0, p.border),
        text_at(f, &c.id, &brand, 16.0, ty, w / 3.0, p.text, p.font * 1.2),
    ];
    let mut x = w - 16.0;
    for item in items.iter().rev() {
        let iw = text_width(item, p.font);
        x -= iw;
        if x < w / 3.0 {
            break;
        }
        children.push(text_at(f, &c.id, item, x, ty, iw, ctx.palette.muted, p.font));
        x -= 24.0;
    }
    root(f, c, ctx, children)
}

pub fn heading(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, Rgba8::TRANSPARENT, ctx.palette.text, ctx.typescale.heading);
    let s = label(c, ComponentKind::Heading);
    let t = text_at(f, &c.id, &s, 0.0, 0.0, ctx.width(), p.text, p.font);
    root(f, c, ctx, vec![t])
}

pub fn text(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, Rgba8::TRANSPARENT, ctx.palette.text, ctx.typescale.body);
    let s = label(c, ComponentKind::Text);
    let g = Geometry::sized(
        text_width(&s, p.font).min(ctx.width()),
        ctx.height().max(p.font * LINE_HEIGHT),
    );
    let t = f.text(&c.id, g, &s, p.text, p.font);
    root(f, c, ctx, vec![t])
}

pub fn button(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let variant = c.prop_str("variant").unwrap_or("primary");
    let base = match variant {
        "secondary" => ctx.palette.secondary,
        "accent" => ctx.palette.accent,
        _ => ctx.palette.primary,
    };
    let outline = variant == "outline";
    let p = paint(c, ctx, base, Palette::on(base), ctx.typescale.body);
    let (w, h) = (ctx.width(), ctx.height());
    let radius = if c.style.border_radius.is_some() { p.radius } else { 6.0 };
    let bg = if outline {
        Style::outlined(None, ctx.palette.primary, 1.5).with_radius(radius)
    } else {
        Style::filled(p.fill).with_radius(radius)
    };
    let text_color = if outline { ctx.palette.primary } else { p.text };
    let s = label(c, ComponentKind::Button);
    let children = vec![
        f.rect(&c.id, Geometry::sized(w, h), bg),
        text_centered(f, &c.id, &s, w, h, text_color, p.font),
    ];
    root(f, c, ctx, children)
}

pub fn link(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, Rgba8::TRANSPARENT, ctx.palette.primary, ctx.typescale.body);
    let s = label(c, ComponentKind::Link);
    let t = text_at(f, &c.id, &s, 0.0, 0.0, ctx.width(), p.text, p.font);
    let underline_y = t.geometry.height - 1.0;
    let underline = f.line(&c.id, 0.0, underline_y, t.geometry.width, 0.0, 1.0, p.text);
    root(f, c, ctx, vec![t, underline])
}

/// Crossed-box media placeholder shared by image and video.
fn media_frame(
    c: &Component,
    ctx: &BuildContext<'_>,
    f: &mut NodeFactory<'_>,
    p: Paint,
) -> Vec<Drawable> {
    let (w, h) = (ctx.width(), ctx.height());
    let diag = w.hypot(h);
    let angle = h.atan2(w).to_degrees();
    vec![
        f.rect(
            &c.id,
            Geometry::sized(w, h),
            Style::outlined(Some(p.fill), p.border, 1.0).with_radius(p.radius),
        ),
        f.line(&c.id, 0.0, 0.0, diag, angle, 1.0, p.border),
        f.line(&c.id, 0.0, h, diag, -angle, 1.0, p.border),
    ]
}

pub fn image(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.surface, ctx.palette.muted, ctx.typescale.label);
    let mut children = media_frame(c, ctx, f, p);
    let caption = c
        .prop_str("alt")
        .map(str::to_string)
        .unwrap_or_else(|| c.content_text());
    if !caption.is_empty() {
        let (w, h) = (ctx.width(), ctx.height());
        let tw = text_width(&caption, p.font).min(w - 16.0);
        children.push(f.text(
            &c.id,
            Geometry::new((w - tw) / 2.0, h - p.font * LINE_HEIGHT - 8.0, tw, p.font * LINE_HEIGHT),
            &caption,
            p.text,
            p.font,
        ));
    }
    root(f, c, ctx, children)
}

pub fn video(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let fill = ctx.palette.text.mix(ctx.palette.background, 0.75);
    let p = paint(c, ctx, fill, ctx.palette.muted, ctx.typescale.label);
    let mut children = media_frame(c, ctx, f, p);
    let d = (ctx.width().min(ctx.height()) * 0.25).clamp(16.0, 64.0);
    children.push(f.ellipse(
        &c.id,
        Geometry::new((ctx.width() - d) / 2.0, (ctx.height() - d) / 2.0, d, d),
        Style::filled(ctx.palette.background.with_alpha(220)),
    ));
    root(f, c, ctx, children)
}

pub fn icon(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.surface, ctx.palette.muted, ctx.typescale.label);
    let e = f.ellipse(
        &c.id,
        Geometry::sized(ctx.width(), ctx.height()),
        Style::outlined(Some(p.fill), p.border, 1.5),
    );
    root(f, c, ctx, vec![e])
}

fn field(
    f: &mut NodeFactory<'_>,
    owner: &str,
    g: Geometry,
    placeholder: &str,
    p: Paint,
    muted: Rgba8,
) -> Vec<Drawable> {
    vec![
        f.rect(
            owner,
            g,
            Style::outlined(Some(p.fill), p.border, 1.0).with_radius(p.radius.max(4.0)),
        ),
        text_at(f, owner, placeholder, g.left + 12.0, g.top + 10.0, g.width - 24.0, muted, p.font),
    ]
}

pub fn input(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.background, ctx.palette.text, ctx.typescale.body);
    let ph = c
        .prop_str("placeholder")
        .map(str::to_string)
        .unwrap_or_else(|| label(c, ComponentKind::Input));
    let frame = Geometry::sized(ctx.width(), ctx.height());
    let children = field(f, &c.id, frame, &ph, p, ctx.palette.muted);
    root(f, c, ctx, children)
}

pub fn textarea(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.background, ctx.palette.text, ctx.typescale.body);
    let ph = c
        .prop_str("placeholder")
        .map(str::to_string)
        .unwrap_or_else(|| label(c, ComponentKind::Textarea));
    let frame = Geometry::sized(ctx.width(), ctx.height());
    let children = field(f, &c.id, frame, &ph, p, ctx.palette.muted);
    root(f, c, ctx, children)
}

pub fn form(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.background, ctx.palette.text, ctx.typescale.body);
    let w = ctx.width();
    let mut children = Vec::new();
    let mut y = 0.0;
    for name in form_fields(c) {
        children.push(text_at(f, &c.id, &name, 0.0, y, w, p.text, ctx.typescale.label));
        children.extend(field(
            f,
            &c.id,
            Geometry::new(0.0, y + 20.0, w, 40.0),
            "",
            p,
            ctx.palette.muted,
        ));
        y += 64.0;
    }
    let submit = c
        .prop_str("submit")
        .unwrap_or(ComponentKind::Form.default_label());
    let bw = (text_width(submit, p.font) + 32.0).max(120.0).min(w);
    let mut btn = f.group(&c.id, NodeRole::Part, Geometry::new(0.0, y + 8.0, bw, 40.0), Vec::new());
    btn.children = vec![
        f.rect(
            &c.id,
            Geometry::sized(bw, 40.0),
            Style::filled(ctx.palette.primary).with_radius(6.0),
        ),
        text_centered(f, &c.id, submit, bw, 40.0, Palette::on(ctx.palette.primary), p.font),
    ];
    children.push(btn);
    root(f, c, ctx, children)
}

pub fn checkbox(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.background, ctx.palette.text, ctx.typescale.body);
    let checked = c.props.get("checked").and_then(serde_json::Value::as_bool) == Some(true);
    let fill = if checked { ctx.palette.primary } else { p.fill };
    let box_y = (ctx.height() - 16.0) / 2.0;
    let s = label(c, ComponentKind::Checkbox);
    let children = vec![
        f.rect(
            &c.id,
            Geometry::new(0.0, box_y, 16.0, 16.0),
            Style::outlined(Some(fill), p.border, 1.0).with_radius(3.0),
        ),
        text_at(
            f,
            &c.id,
            &s,
            24.0,
            (ctx.height() - p.font * LINE_HEIGHT) / 2.0,
            ctx.width() - 24.0,
            p.text,
            p.font,
        ),
    ];
    root(f, c, ctx, children)
}

pub fn card(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.surface, ctx.palette.text, ctx.typescale.body);
    let (w, h) = (ctx.width(), ctx.height());
    let radius = if c.style.border_radius.is_some() { p.radius } else { 8.0 };
    let title = c
        .content
        .get("title")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| label(c, ComponentKind::Card));
    let body = c
        .content
        .get("description")
        .or_else(|| c.content.get("body"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");
    let media_h = (h * 0.45).min(96.0);
    let mut children = vec![
        f.rect(
            &c.id,
            Geometry::sized(w, h),
            Style::outlined(Some(p.fill), p.border, 1.0).with_radius(radius),
        ),
        f.rect(
            &c.id,
            Geometry::new(12.0, 12.0, (w - 24.0).max(0.0), media_h),
            Style::filled(ctx.palette.border),
        ),
        text_at(f, &c.id, &title, 12.0, media_h + 20.0, w - 24.0, p.text, p.font * 1.15),
    ];
    if !body.is_empty() {
        children.push(text_at(
            f,
            &c.id,
            body,
            12.0,
            media_h + 20.0 + p.font * 1.15 * LINE_HEIGHT + 4.0,
            w - 24.0,
            ctx.palette.muted,
            ctx.typescale.label,
        ));
    }
    root(f, c, ctx, children)
}

pub fn list(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, Rgba8::TRANSPARENT, ctx.palette.text, ctx.typescale.body);
    let mut items = c.list_items();
    if items.is_empty() {
        items.push("List item".to_string());
    }
    let step = p.font * 1.6;
    let mut children = Vec::with_capacity(items.len() * 2);
    for (i, item) in items.iter().enumerate() {
        let y = 4.0 + i as f64 * step;
        children.push(f.ellipse(
            &c.id,
            Geometry::new(0.0, y + step / 2.0 - 3.0, 6.0, 6.0),
            Style::filled(ctx.palette.primary),
        ));
        children.push(text_at(f, &c.id, item, 14.0, y, ctx.width() - 14.0, p.text, p.font));
    }
    root(f, c, ctx, children)
}

pub fn divider(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, Rgba8::TRANSPARENT, ctx.palette.text, ctx.typescale.body);
    let l = f.line(&c.id, 0.0, ctx.height() / 2.0, ctx.width(), 0.0, 1.0, p.border);
    root(f, c, ctx, vec![l])
}

pub fn avatar(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let fill = ctx.palette.muted.mix(ctx.palette.background, 0.5);
    let p = paint(c, ctx, fill, Palette::on(fill), ctx.typescale.body);
    let initials: String = c
        .content_text()
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    let (w, h) = (ctx.width(), ctx.height());
    let mut children = vec![f.ellipse(&c.id, Geometry::sized(w, h), Style::filled(p.fill))];
    if !initials.is_empty() {
        children.push(text_centered(f, &c.id, &initials, w, h, p.text, p.font));
    }
    root(f, c, ctx, children)
}

pub fn badge(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.accent, Palette::on(ctx.palette.accent), ctx.typescale.label);
    let (w, h) = (ctx.width(), ctx.height());
    let s = label(c, ComponentKind::Badge);
    let children = vec![
        f.rect(&c.id, Geometry::sized(w, h), Style::filled(p.fill).with_radius(h / 2.0)),
        text_centered(f, &c.id, &s, w, h, p.text, p.font),
    ];
    root(f, c, ctx, children)
}

/// Labeled rectangle for kinds nothing else knows how to draw.
pub fn fallback(c: &Component, ctx: &BuildContext<'_>, f: &mut NodeFactory<'_>) -> Drawable {
    let p = paint(c, ctx, ctx.palette.surface, ctx.palette.muted, ctx.typescale.label);
    let (w, h) = (ctx.width(), ctx.height());
    let content = c.content_text();
    let mut children = vec![
        f.rect(
            &c.id,
            Geometry::sized(w, h),
            Style::outlined(Some(p.fill), p.border, 1.0).with_radius(p.radius),
        ),
        text_at(f, &c.id, c.kind.trim(), 8.0, 8.0, w - 16.0, p.text, p.font),
    ];
    if !content.is_empty() {
        children.push(text_at(
            f,
            &c.id,
            &content,
            8.0,
            8.0 + p.font * LINE_HEIGHT + 4.0,
            w - 16.0,
            ctx.palette.text,
            ctx.typescale.body,
        ));
    }
    root(f, c, ctx, children)
}
