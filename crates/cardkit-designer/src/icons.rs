//! Built-in icon shapes.
//!
//! Each icon is SVG path data on a 24x24 view box, filled with the even-odd
//! rule. Icon layers scale the outline to their box.

use tiny_skia::{Path, Transform};

use crate::path_data;

/// Side of the square view box the icon outlines are authored in.
pub const ICON_VIEWBOX: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconDef {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub tags: &'static [&'static str],
    pub path: &'static str,
}

const CIRCLE: &str = "M12 2C17.52 2 22 6.48 22 12S17.52 22 12 22 2 17.52 2 12 6.48 2 12 2z";

static ICONS: &[IconDef] = &[
    IconDef {
        id: "phone",
        name: "Phone",
        category: "contact",
        tags: &["call", "telephone", "mobile"],
        path: "M6.6 10.8c1.4 2.8 3.8 5.1 6.6 6.6l2.2-2.2c.3-.3.7-.4 1-.2 1.1.4 2.3.6 3.6.6.6 0 1 .4 1 1V20c0 .6-.4 1-1 1C10.6 21 3 13.4 3 4c0-.6.4-1 1-1h3.5c.6 0 1 .4 1 1 0 1.3.2 2.5.6 3.6.1.3 0 .7-.2 1l-2.3 2.2z",
    },
    IconDef {
        id: "mail",
        name: "Email",
        category: "contact",
        tags: &["email", "envelope", "message"],
        path: "M4 4h16c1.1 0 2 .9 2 2v12c0 1.1-.9 2-2 2H4c-1.1 0-2-.9-2-2V6c0-1.1.9-2 2-2zM20 8l-8 5-8-5v2l8 5 8-5z",
    },
    IconDef {
        id: "location",
        name: "Location",
        category: "contact",
        tags: &["address", "map", "pin"],
        path: "M12 2C8.1 2 5 5.1 5 9c0 5.2 7 13 7 13s7-7.8 7-13c0-3.9-3.1-7-7-7zm0 9.5c-1.4 0-2.5-1.1-2.5-2.5S10.6 6.5 12 6.5s2.5 1.1 2.5 2.5-1.1 2.5-2.5 2.5z",
    },
    IconDef {
        id: "globe",
        name: "Website",
        category: "contact",
        tags: &["web", "internet", "url"],
        path: "M12 2C17.52 2 22 6.48 22 12S17.52 22 12 22 2 17.52 2 12 6.48 2 12 2zM12 4C7.58 4 4 7.58 4 12s3.58 8 8 8 8-3.58 8-8-3.58-8-8-8zM11 4h2v16h-2zM4 11h16v2H4z",
    },
    IconDef {
        id: "user",
        name: "Person",
        category: "people",
        tags: &["profile", "account", "contact"],
        path: "M12 12c2.21 0 4-1.79 4-4s-1.79-4-4-4-4 1.79-4 4 1.79 4 4 4zm0 2c-2.67 0-8 1.34-8 4v2h16v-2c0-2.66-5.33-4-8-4z",
    },
    IconDef {
        id: "briefcase",
        name: "Briefcase",
        category: "business",
        tags: &["work", "job", "office"],
        path: "M10 2h4c1.1 0 2 .9 2 2v2h4c1.1 0 2 .9 2 2v11c0 1.1-.9 2-2 2H4c-1.1 0-2-.9-2-2V8c0-1.1.9-2 2-2h4V4c0-1.1.9-2 2-2zm0 2v2h4V4h-4z",
    },
    IconDef {
        id: "calendar",
        name: "Calendar",
        category: "business",
        tags: &["date", "schedule", "event"],
        path: "M3 4h18v18H3zM5 9h14v11H5zM7 2h2v4H7zM15 2h2v4h-2z",
    },
    IconDef {
        id: "star",
        name: "Star",
        category: "shapes",
        tags: &["favorite", "rating"],
        path: "M12 2l3.09 6.26L22 9.27l-5 4.87 1.18 6.88L12 17.77l-6.18 3.25L7 14.14 2 9.27l6.91-1.01L12 2z",
    },
    IconDef {
        id: "heart",
        name: "Heart",
        category: "shapes",
        tags: &["love", "like"],
        path: "M12 21.35l-1.45-1.32C5.4 15.36 2 12.28 2 8.5 2 5.42 4.42 3 7.5 3c1.74 0 3.41.81 4.5 2.09C13.09 3.81 14.76 3 16.5 3 19.58 3 22 5.42 22 8.5c0 3.78-3.4 6.86-8.55 11.54L12 21.35z",
    },
    IconDef {
        id: "check",
        name: "Check",
        category: "shapes",
        tags: &["done", "tick", "ok"],
        path: "M9 16.17L4.83 12l-1.42 1.41L9 19 21 7l-1.41-1.41z",
    },
    IconDef {
        id: "circle",
        name: "Circle",
        category: "shapes",
        tags: &["dot", "round"],
        path: CIRCLE,
    },
    IconDef {
        id: "square",
        name: "Square",
        category: "shapes",
        tags: &["box"],
        path: "M3 3h18v18H3z",
    },
];

/// All built-in icons, in catalog order.
pub fn builtin_icons() -> &'static [IconDef] {
    ICONS
}

pub fn find(id: &str) -> Option<&'static IconDef> {
    ICONS.iter().find(|icon| icon.id == id)
}

pub fn is_known(id: &str) -> bool {
    find(id).is_some()
}

/// Outline of `id` scaled to a `width` x `height` box at the origin.
pub fn icon_path(id: &str, width: f64, height: f64) -> Option<Path> {
    let def = find(id)?;
    let path = path_data::parse(def.path).ok()?;
    path.transform(Transform::from_scale(
        width as f32 / ICON_VIEWBOX,
        height as f32 / ICON_VIEWBOX,
    ))
}
