//! Canvas session state machine.
//!
//! Holds one user's interaction state: the active tool, committed
//! annotations, AI overlays, ticker nodes, the in-progress drawing path
//! and the current selection/drag. Pointer events run to completion with
//! no suspension points; every mutation happens inside the call.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    lookup_symbol, Annotation, CanvasError, Overlay, OverlayKind, Point, TickerNode, Tool,
};

/// Canned generic-analysis replies picked at random when no keyword
/// matches.
const CANNED_ANALYSIS: [&str; 4] = [
    "This trendline shows strong support at current levels. Volume confirmation needed.",
    "RSI indicates oversold conditions. Consider entry points near support.",
    "Moving average convergence suggests bullish momentum building.",
    "Price action near resistance. Watch for breakout with volume.",
];

/// Padding of the support zone emitted by the "support" reply.
const SUPPORT_ZONE_PAD_X: f64 = 24.0;
const SUPPORT_ZONE_PAD_Y: f64 = 18.0;

/// A pointer event relayed from the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
}

/// What a pointer event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PointerOutcome {
    /// Nothing happened
    None,
    /// A drawing stroke is in progress
    Drawing,
    /// Pointer-up committed a new annotation
    AnnotationAdded { id: Uuid },
    /// Select tool hit an annotation
    Selected { id: Uuid },
    /// Select tool clicked empty space
    SelectionCleared,
    /// The selected annotation was dragged
    Moved { id: Uuid },
    /// The eraser removed an annotation
    AnnotationErased { id: Uuid },
    /// The eraser removed an AI overlay
    OverlayErased { id: Uuid },
}

/// Reply returned by [`CanvasSession::ask`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskReply {
    /// User-facing response text
    pub message: String,

    /// Number of overlays the reply placed on the canvas
    pub overlays_added: usize,
}

/// One user's analysis-canvas state.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasSession {
    pub active_tool: Tool,
    pub annotations: Vec<Annotation>,
    pub overlays: Vec<Overlay>,
    pub tickers: Vec<TickerNode>,
    pub selected: Option<Uuid>,

    /// In-progress drawing path, present between pointer-down and -up
    #[serde(skip)]
    drawing: Option<Vec<Point>>,

    /// Dragged annotation id and last pointer position
    #[serde(skip)]
    dragging: Option<(Uuid, Point)>,
}

impl Default for CanvasSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSession {
    pub fn new() -> Self {
        Self {
            active_tool: Tool::Select,
            annotations: Vec::new(),
            overlays: Vec::new(),
            tickers: Vec::new(),
            selected: None,
            drawing: None,
            dragging: None,
        }
    }

    /// Creates a session with an initial ticker node for `symbol`,
    /// placed where the dashboard drops a preselected ticker.
    pub fn with_symbol(symbol: &str) -> Result<Self, CanvasError> {
        let mut session = Self::new();
        session.add_ticker(symbol, Some(Point::new(200.0, 150.0)))?;
        Ok(session)
    }

    /// Switches the active tool. Any in-progress stroke is dropped.
    pub fn set_tool(&mut self, tool: Tool) {
        self.active_tool = tool;
        self.drawing = None;
        self.dragging = None;
    }

    /// Adds a ticker node from the built-in symbol table.
    pub fn add_ticker(&mut self, symbol: &str, at: Option<Point>) -> Result<Uuid, CanvasError> {
        let quote =
            lookup_symbol(symbol).ok_or_else(|| CanvasError::UnknownSymbol(symbol.to_string()))?;
        let at = at.unwrap_or_else(|| Point::new(200.0, 150.0));
        let node = TickerNode {
            id: Uuid::new_v4(),
            symbol: quote.symbol.to_string(),
            x: at.x,
            y: at.y,
            price: quote.price,
            change: quote.change,
        };
        let id = node.id;
        self.tickers.push(node);
        Ok(id)
    }

    /// Applies one pointer event.
    pub fn pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        match event {
            PointerEvent::Down(p) => self.pointer_down(p),
            PointerEvent::Move(p) => self.pointer_move(p),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    fn pointer_down(&mut self, p: Point) -> PointerOutcome {
        match self.active_tool {
            Tool::Eraser => self.erase_at(p),
            Tool::Select => {
                if let Some(id) = self.hit_annotation(p) {
                    self.selected = Some(id);
                    self.dragging = Some((id, p));
                    PointerOutcome::Selected { id }
                } else {
                    self.selected = None;
                    PointerOutcome::SelectionCleared
                }
            }
            _ => {
                self.drawing = Some(vec![p]);
                PointerOutcome::Drawing
            }
        }
    }

    fn pointer_move(&mut self, p: Point) -> PointerOutcome {
        if let Some((id, last)) = self.dragging {
            let (dx, dy) = (p.x - last.x, p.y - last.y);
            if let Some(annotation) = self.annotations.iter_mut().find(|a| a.id == id) {
                annotation.translate(dx, dy);
            }
            self.dragging = Some((id, p));
            return PointerOutcome::Moved { id };
        }

        let tool = self.active_tool;
        if let Some(path) = self.drawing.as_mut() {
            match tool {
                Tool::Pencil => path.push(p),
                // Two-point shapes keep their anchor and track the cursor
                Tool::Line | Tool::Trendline | Tool::Rectangle | Tool::Zone => {
                    path.truncate(1);
                    path.push(p);
                }
                Tool::Select | Tool::Eraser => {}
            }
            return PointerOutcome::Drawing;
        }

        PointerOutcome::None
    }

    fn pointer_up(&mut self) -> PointerOutcome {
        if self.dragging.take().is_some() {
            return PointerOutcome::None;
        }

        let Some(path) = self.drawing.take() else {
            return PointerOutcome::None;
        };
        if path.is_empty() {
            return PointerOutcome::None;
        }
        let Some(kind) = self.active_tool.annotation_kind() else {
            return PointerOutcome::None;
        };

        let annotation = Annotation::new(kind, path);
        let id = annotation.id;
        self.annotations.push(annotation);
        PointerOutcome::AnnotationAdded { id }
    }

    /// Topmost annotation whose padded bounding box contains the point.
    pub fn hit_annotation(&self, p: Point) -> Option<Uuid> {
        self.annotations.iter().rev().find(|a| a.hit(p)).map(|a| a.id)
    }

    /// Eraser click: annotations first, then overlay bounds.
    fn erase_at(&mut self, p: Point) -> PointerOutcome {
        if let Some(index) = self.annotations.iter().rposition(|a| a.hit(p)) {
            let removed = self.annotations.remove(index);
            if self.selected == Some(removed.id) {
                self.selected = None;
            }
            return PointerOutcome::AnnotationErased { id: removed.id };
        }
        if let Some(index) = self.overlays.iter().rposition(|o| o.bounds().contains(p)) {
            let removed = self.overlays.remove(index);
            return PointerOutcome::OverlayErased { id: removed.id };
        }
        PointerOutcome::None
    }

    /// Deletes the selected annotation, returning its id.
    pub fn delete_selected(&mut self) -> Option<Uuid> {
        let id = self.selected.take()?;
        self.annotations.retain(|a| a.id != id);
        Some(id)
    }

    /// Resets the canvas to a blank surface.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.overlays.clear();
        self.tickers.clear();
        self.selected = None;
        self.drawing = None;
        self.dragging = None;
    }

    /// Answers a free-text question with a canned, keyword-matched reply
    /// and places the corresponding overlays.
    pub fn ask(&mut self, question: &str) -> Result<AskReply, CanvasError> {
        let q = question.trim().to_lowercase();

        if q.contains("support") {
            return self.reply_support();
        }

        const MA_PHRASES: [&str; 4] = [
            "20-day moving average",
            "20 day moving average",
            "20ma",
            "ma 20",
        ];
        if MA_PHRASES.iter().any(|phrase| q.contains(phrase)) {
            return Ok(self.reply_moving_average());
        }

        Ok(self.reply_generic())
    }

    /// Highlights a support zone around the most recent line/trendline.
    fn reply_support(&mut self) -> Result<AskReply, CanvasError> {
        let bbox = self
            .annotations
            .iter()
            .rev()
            .find(|a| a.is_line_like())
            .filter(|a| a.points.len() >= 2)
            .and_then(|a| a.bounding_box())
            .ok_or(CanvasError::TrendlineRequired)?;

        let zone = Overlay::new(
            OverlayKind::Highlight {
                width: bbox.width + SUPPORT_ZONE_PAD_X * 2.0,
                height: (bbox.height + SUPPORT_ZONE_PAD_Y * 2.0).max(24.0),
            },
            bbox.x - SUPPORT_ZONE_PAD_X,
            bbox.y - SUPPORT_ZONE_PAD_Y,
            "AI: Support Zone",
        );
        let note = Overlay::new(
            OverlayKind::Note,
            zone.x + 8.0,
            zone.y - 10.0,
            "Support identified around your trendline (demo).",
        );
        self.overlays.push(zone);
        self.overlays.push(note);

        Ok(AskReply {
            message: "Confirmed: This region looks like support (demo).".to_string(),
            overlays_added: 2,
        })
    }

    /// Pins a 20-day moving-average pill next to every ticker node.
    fn reply_moving_average(&mut self) -> AskReply {
        let mut added = 0;
        let anchors: Vec<(f64, f64)> = self.tickers.iter().map(|n| (n.x, n.y)).collect();
        for (x, y) in anchors {
            self.overlays
                .push(Overlay::new(OverlayKind::MovingAverage, x + 80.0, y - 10.0, "20MA"));
            added += 1;
        }
        self.overlays.push(Overlay::new(
            OverlayKind::Note,
            16.0,
            24.0,
            "20MA added: quick trend gauge; crosses can hint momentum shifts (demo).",
        ));
        added += 1;

        let message = if self.tickers.is_empty() {
            "20-day MA ready (place a ticker on canvas to view MA pill).".to_string()
        } else {
            "20-day moving average overlayed (demo).".to_string()
        };
        AskReply {
            message,
            overlays_added: added,
        }
    }

    /// Generic analysis: a random canned response plus lightweight
    /// overlays near existing annotations and ticker nodes.
    fn reply_generic(&mut self) -> AskReply {
        let message = CANNED_ANALYSIS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CANNED_ANALYSIS[0])
            .to_string();

        let mut new_overlays = Vec::new();
        for annotation in &self.annotations {
            if !annotation.is_line_like() {
                continue;
            }
            if let Some(bbox) = annotation.bounding_box() {
                new_overlays.push(Overlay::new(
                    OverlayKind::Highlight {
                        width: bbox.width + 40.0,
                        height: 20.0,
                    },
                    bbox.x - 20.0,
                    bbox.y - 10.0,
                    "AI: Support Level",
                ));
            }
        }
        for node in &self.tickers {
            new_overlays.push(Overlay::new(
                OverlayKind::MovingAverage,
                node.x + 80.0,
                node.y - 10.0,
                "20MA",
            ));
            new_overlays.push(Overlay::new(
                OverlayKind::Rsi,
                node.x + 80.0,
                node.y + 20.0,
                "RSI: 45",
            ));
        }

        let added = new_overlays.len();
        self.overlays.extend(new_overlays);
        AskReply {
            message,
            overlays_added: added,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::AnnotationKind;

    fn draw(session: &mut CanvasSession, tool: Tool, from: Point, to: Point) -> Uuid {
        session.set_tool(tool);
        session.pointer(PointerEvent::Down(from));
        session.pointer(PointerEvent::Move(to));
        match session.pointer(PointerEvent::Up) {
            PointerOutcome::AnnotationAdded { id } => id,
            other => panic!("expected AnnotationAdded, got {other:?}"),
        }
    }

    #[test]
    fn pencil_accumulates_points() {
        let mut session = CanvasSession::new();
        session.set_tool(Tool::Pencil);
        session.pointer(PointerEvent::Down(Point::new(0.0, 0.0)));
        session.pointer(PointerEvent::Move(Point::new(5.0, 5.0)));
        session.pointer(PointerEvent::Move(Point::new(10.0, 2.0)));
        session.pointer(PointerEvent::Up);

        assert_eq!(session.annotations.len(), 1);
        let annotation = &session.annotations[0];
        assert_eq!(annotation.kind, AnnotationKind::Freehand);
        assert_eq!(annotation.points.len(), 3);
    }

    #[test]
    fn two_point_shapes_track_the_cursor() {
        let mut session = CanvasSession::new();
        session.set_tool(Tool::Rectangle);
        session.pointer(PointerEvent::Down(Point::new(10.0, 10.0)));
        session.pointer(PointerEvent::Move(Point::new(50.0, 50.0)));
        session.pointer(PointerEvent::Move(Point::new(80.0, 40.0)));
        session.pointer(PointerEvent::Up);

        let annotation = &session.annotations[0];
        assert_eq!(annotation.points.len(), 2);
        assert_eq!(annotation.points[0], Point::new(10.0, 10.0));
        assert_eq!(annotation.points[1], Point::new(80.0, 40.0));
    }

    #[test]
    fn hit_test_returns_most_recently_drawn_shape() {
        let mut session = CanvasSession::new();
        let older = draw(
            &mut session,
            Tool::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
        );
        let newer = draw(
            &mut session,
            Tool::Rectangle,
            Point::new(40.0, 40.0),
            Point::new(140.0, 140.0),
        );

        // Overlapping region belongs to the newer shape
        assert_eq!(session.hit_annotation(Point::new(50.0, 50.0)), Some(newer));
        // A point only the older shape covers
        assert_eq!(session.hit_annotation(Point::new(5.0, 5.0)), Some(older));
        assert_eq!(session.hit_annotation(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn select_and_drag_translates_the_shape() {
        let mut session = CanvasSession::new();
        let id = draw(
            &mut session,
            Tool::Line,
            Point::new(10.0, 10.0),
            Point::new(50.0, 10.0),
        );

        session.set_tool(Tool::Select);
        assert_eq!(
            session.pointer(PointerEvent::Down(Point::new(30.0, 10.0))),
            PointerOutcome::Selected { id }
        );
        session.pointer(PointerEvent::Move(Point::new(40.0, 25.0)));
        session.pointer(PointerEvent::Up);

        let annotation = &session.annotations[0];
        assert_eq!(annotation.points[0], Point::new(20.0, 25.0));
        assert_eq!(annotation.points[1], Point::new(60.0, 25.0));
        assert_eq!(session.selected, Some(id));
    }

    #[test]
    fn select_on_empty_space_clears_selection() {
        let mut session = CanvasSession::new();
        draw(
            &mut session,
            Tool::Line,
            Point::new(10.0, 10.0),
            Point::new(50.0, 10.0),
        );
        session.set_tool(Tool::Select);
        session.pointer(PointerEvent::Down(Point::new(30.0, 10.0)));
        session.pointer(PointerEvent::Up);
        assert!(session.selected.is_some());

        assert_eq!(
            session.pointer(PointerEvent::Down(Point::new(400.0, 400.0))),
            PointerOutcome::SelectionCleared
        );
        assert_eq!(session.selected, None);
    }

    #[test]
    fn eraser_removes_topmost_annotation_then_overlays() {
        let mut session = CanvasSession::new();
        let id = draw(
            &mut session,
            Tool::Zone,
            Point::new(0.0, 0.0),
            Point::new(50.0, 50.0),
        );
        session.overlays.push(Overlay::new(
            OverlayKind::Highlight {
                width: 30.0,
                height: 30.0,
            },
            10.0,
            10.0,
            "AI: Support Zone",
        ));
        let overlay_id = session.overlays[0].id;

        session.set_tool(Tool::Eraser);
        assert_eq!(
            session.pointer(PointerEvent::Down(Point::new(25.0, 25.0))),
            PointerOutcome::AnnotationErased { id }
        );
        assert!(session.annotations.is_empty());

        assert_eq!(
            session.pointer(PointerEvent::Down(Point::new(25.0, 25.0))),
            PointerOutcome::OverlayErased { id: overlay_id }
        );
        assert!(session.overlays.is_empty());

        assert_eq!(
            session.pointer(PointerEvent::Down(Point::new(25.0, 25.0))),
            PointerOutcome::None
        );
    }

    #[test]
    fn ask_support_requires_a_trendline() {
        let mut session = CanvasSession::new();
        assert_eq!(
            session.ask("is this support?").unwrap_err(),
            CanvasError::TrendlineRequired
        );

        draw(
            &mut session,
            Tool::Trendline,
            Point::new(20.0, 100.0),
            Point::new(120.0, 90.0),
        );
        let reply = session.ask("Is this support?").unwrap();
        assert_eq!(reply.overlays_added, 2);
        assert_eq!(session.overlays.len(), 2);

        // Zone is padded 24x18 around the trendline bbox
        let zone = &session.overlays[0];
        assert_eq!(zone.x, 20.0 - 24.0);
        assert_eq!(zone.y, 90.0 - 18.0);
        match zone.kind {
            OverlayKind::Highlight { width, height } => {
                assert_eq!(width, 100.0 + 48.0);
                assert_eq!(height, 10.0 + 36.0);
            }
            other => panic!("expected highlight, got {other:?}"),
        }
    }

    #[test]
    fn support_zone_on_flat_line_keeps_padding_height() {
        let mut session = CanvasSession::new();
        draw(
            &mut session,
            Tool::Line,
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
        );
        session.ask("support?").unwrap();
        match session.overlays[0].kind {
            OverlayKind::Highlight { height, .. } => assert_eq!(height, 36.0),
            other => panic!("expected highlight, got {other:?}"),
        }
    }

    #[test]
    fn ask_moving_average_pins_a_pill_per_ticker() {
        let mut session = CanvasSession::new();
        session.add_ticker("AAPL", None).unwrap();
        session.add_ticker("MSFT", Some(Point::new(300.0, 200.0))).unwrap();

        let reply = session.ask("add the 20-day moving average").unwrap();
        assert_eq!(reply.overlays_added, 3); // two pills + one note
        assert_eq!(reply.message, "20-day moving average overlayed (demo).");

        let pills: Vec<_> = session
            .overlays
            .iter()
            .filter(|o| o.kind == OverlayKind::MovingAverage)
            .collect();
        assert_eq!(pills.len(), 2);
        assert_eq!(pills[1].x, 300.0 + 80.0);
        assert_eq!(pills[1].y, 200.0 - 10.0);
    }

    #[test]
    fn ask_moving_average_without_tickers_still_notes() {
        let mut session = CanvasSession::new();
        let reply = session.ask("20ma please").unwrap();
        assert_eq!(reply.overlays_added, 1);
        assert!(reply.message.contains("place a ticker"));
    }

    #[test]
    fn generic_ask_highlights_lines_and_decorates_tickers() {
        let mut session = CanvasSession::new();
        draw(
            &mut session,
            Tool::Trendline,
            Point::new(10.0, 80.0),
            Point::new(90.0, 60.0),
        );
        session.add_ticker("NVDA", None).unwrap();

        let reply = session.ask("what do you think?").unwrap();
        // one highlight for the trendline, MA + RSI pills for the ticker
        assert_eq!(reply.overlays_added, 3);
        assert!(CANNED_ANALYSIS.contains(&reply.message.as_str()));
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = CanvasSession::with_symbol("SPY").unwrap();
        draw(
            &mut session,
            Tool::Pencil,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
        );
        session.ask("thoughts?").unwrap();
        session.clear();

        assert!(session.annotations.is_empty());
        assert!(session.overlays.is_empty());
        assert!(session.tickers.is_empty());
        assert_eq!(session.selected, None);
    }

    #[test]
    fn delete_selected_removes_the_annotation() {
        let mut session = CanvasSession::new();
        let id = draw(
            &mut session,
            Tool::Line,
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        session.set_tool(Tool::Select);
        session.pointer(PointerEvent::Down(Point::new(5.0, 0.0)));
        session.pointer(PointerEvent::Up);

        assert_eq!(session.delete_selected(), Some(id));
        assert!(session.annotations.is_empty());
        assert_eq!(session.delete_selected(), None);
    }

    #[test]
    fn unknown_ticker_symbol_is_rejected() {
        let mut session = CanvasSession::new();
        let err = session.add_ticker("ZZZZ", None).unwrap_err();
        assert_eq!(err, CanvasError::UnknownSymbol("ZZZZ".to_string()));
    }
}
