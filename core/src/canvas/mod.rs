//! Analysis-canvas engine.
//!
//! Server-hosted rendition of the dashboard's analysis canvas: a blank
//! coordinate surface the user annotates with freehand paths, lines,
//! trendlines, rectangles and shaded zones, plus ticker nodes dropped
//! from a built-in symbol table and "AI" overlays produced by canned,
//! keyword-matched replies.
//!
//! Hit-testing is a linear scan over padded axis-aligned bounding boxes,
//! topmost (most recently drawn) annotation first. Fine at demo scale;
//! there is no spatial index.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod session;

pub use session::{AskReply, CanvasSession, PointerEvent, PointerOutcome};

/// Margin added around an annotation's bounding box during hit-testing.
pub const HIT_PADDING: f64 = 6.0;

/// Stroke color for drawn annotations.
pub const INK_COLOR: &str = "#10b981";

/// Fill color for shaded zones (ink with alpha).
pub const ZONE_COLOR: &str = "#10b98150";

/// Canvas interaction errors
#[derive(Debug, Error, PartialEq)]
pub enum CanvasError {
    #[error("Draw a trendline first, then ask about support")]
    TrendlineRequired,

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// A point on the canvas surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle used for hit-testing and overlay bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Returns this rectangle grown by `margin` on every side.
    pub fn padded(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }
}

/// Active drawing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Select,
    Pencil,
    Line,
    Trendline,
    Rectangle,
    Zone,
    Eraser,
}

impl Tool {
    /// Annotation kind committed when drawing with this tool, if it is a
    /// drawing tool at all.
    pub fn annotation_kind(&self) -> Option<AnnotationKind> {
        match self {
            Tool::Pencil => Some(AnnotationKind::Freehand),
            Tool::Line => Some(AnnotationKind::Line),
            Tool::Trendline => Some(AnnotationKind::Trendline),
            Tool::Rectangle => Some(AnnotationKind::Rectangle),
            Tool::Zone => Some(AnnotationKind::Zone),
            Tool::Select | Tool::Eraser => None,
        }
    }
}

/// Shape of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Freehand,
    Line,
    Trendline,
    Rectangle,
    Zone,
}

/// A user-drawn annotation: a polyline or rectangle with one or more
/// points and a stroke color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub kind: AnnotationKind,
    pub points: Vec<Point>,
    pub color: String,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, points: Vec<Point>) -> Self {
        let color = if kind == AnnotationKind::Zone {
            ZONE_COLOR
        } else {
            INK_COLOR
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            points,
            color: color.to_string(),
        }
    }

    /// Axis-aligned bounding box of the annotation's points, or `None`
    /// for an empty point list.
    pub fn bounding_box(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Some(Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    /// Padded bounding-box hit test.
    pub fn hit(&self, p: Point) -> bool {
        self.bounding_box()
            .map(|bbox| bbox.padded(HIT_PADDING).contains(p))
            .unwrap_or(false)
    }

    /// Translates every point by the given delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Lines and trendlines are what the canned "support" reply anchors
    /// its zones to.
    pub fn is_line_like(&self) -> bool {
        matches!(self.kind, AnnotationKind::Line | AnnotationKind::Trendline)
    }
}

/// Kind of an AI-generated overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayKind {
    /// Shaded highlight rectangle with explicit dimensions
    Highlight { width: f64, height: f64 },
    /// Moving-average pill next to a ticker node
    #[serde(rename = "ma")]
    MovingAverage,
    /// RSI pill next to a ticker node
    Rsi,
    /// Free-floating explanatory note
    Note,
}

/// An AI-generated overlay placed on the canvas by a canned reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overlay {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: OverlayKind,
    pub x: f64,
    pub y: f64,
    pub text: Option<String>,
}

impl Overlay {
    pub fn new(kind: OverlayKind, x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            text: Some(text.into()),
        }
    }

    /// Drawn bounds of the overlay, used by the eraser. Pills occupy a
    /// fixed 50x16 box, notes grow with their text.
    pub fn bounds(&self) -> Rect {
        match self.kind {
            OverlayKind::Highlight { width, height } => Rect {
                x: self.x,
                y: self.y,
                width,
                height,
            },
            OverlayKind::MovingAverage | OverlayKind::Rsi => Rect {
                x: self.x - 5.0,
                y: self.y - 8.0,
                width: 50.0,
                height: 16.0,
            },
            OverlayKind::Note => {
                let len = self.text.as_deref().map(str::len).unwrap_or(0) as f64;
                Rect {
                    x: self.x - 6.0,
                    y: self.y - 14.0,
                    width: (len * 6.0).max(160.0),
                    height: 24.0,
                }
            }
        }
    }
}

/// A ticker card dropped on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerNode {
    pub id: Uuid,
    pub symbol: String,
    pub x: f64,
    pub y: f64,
    pub price: f64,
    pub change: f64,
}

/// One row of the built-in symbol table backing ticker search.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SymbolQuote {
    pub symbol: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub change: f64,
}

/// Hard-coded quotes available for dropping onto the canvas.
pub const SYMBOL_TABLE: [SymbolQuote; 9] = [
    SymbolQuote { symbol: "AAPL", name: "Apple Inc.", price: 171.62, change: -0.55 },
    SymbolQuote { symbol: "MSFT", name: "Microsoft Corp.", price: 417.30, change: 0.30 },
    SymbolQuote { symbol: "NVDA", name: "NVIDIA Corp.", price: 901.12, change: 1.15 },
    SymbolQuote { symbol: "TSLA", name: "Tesla Inc.", price: 248.50, change: -0.12 },
    SymbolQuote { symbol: "AMZN", name: "Amazon.com Inc.", price: 178.52, change: 1.19 },
    SymbolQuote { symbol: "GOOGL", name: "Alphabet Inc.", price: 139.17, change: -0.80 },
    SymbolQuote { symbol: "META", name: "Meta Platforms", price: 484.20, change: 2.15 },
    SymbolQuote { symbol: "SPY", name: "SPDR S&P 500", price: 485.30, change: 0.45 },
    SymbolQuote { symbol: "QQQ", name: "Invesco QQQ", price: 421.80, change: 0.85 },
];

/// Looks up a quote by exact symbol, case-insensitively.
pub fn lookup_symbol(symbol: &str) -> Option<&'static SymbolQuote> {
    SYMBOL_TABLE
        .iter()
        .find(|q| q.symbol.eq_ignore_ascii_case(symbol.trim()))
}

/// Returns quotes whose symbol or name contains the search term.
pub fn suggest_symbols(term: &str) -> Vec<&'static SymbolQuote> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }
    SYMBOL_TABLE
        .iter()
        .filter(|q| {
            q.symbol.to_lowercase().contains(&term) || q.name.to_lowercase().contains(&term)
        })
        .collect()
}
