//! The drag lifecycle as an explicit state machine.
//!
//! `Idle -> Armed -> Dragging -> Idle`. Pointer listeners for a drag are held
//! by the surface's capture guard inside the `Dragging` state, so every way
//! out of that state (pointer-up, cancel, drop) detaches them.

use std::collections::BTreeMap;
use std::mem;

use serde::Serialize;

use super::geometry::{capture_row_layout, handles_for_first_row, HandleId, ResizeHandle};
use super::surface::TableSurface;
use super::widths::{update_cell_widths, WidthUpdate};
use crate::options::TableOptions;
use crate::types::RowLayout;

/// Pointer position relative to the page, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PointerEvent {
    pub x: f64,
}

impl PointerEvent {
    pub fn at(x: f64) -> Self {
        Self { x }
    }
}

/// Lifecycle notifications for the host. Each has a no-op default.
pub trait ResizeCallbacks {
    /// Initial width of every keyed cell
    fn on_init(&mut self, _widths: &BTreeMap<String, f64>) {}

    fn on_resize_start(&mut self, _event: &PointerEvent) {}

    /// Widths in effect when the drag ended
    fn on_resize_stop(&mut self, _event: &PointerEvent, _widths: &BTreeMap<String, f64>) {}
}

impl ResizeCallbacks for () {}

/// A recorded callback invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResizeEvent {
    Init {
        widths: BTreeMap<String, f64>,
    },
    Start {
        x: f64,
    },
    Stop {
        x: f64,
        widths: BTreeMap<String, f64>,
    },
}

/// Callbacks that queue every notification for the host to drain.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<ResizeEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<ResizeEvent> {
        mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl ResizeCallbacks for EventQueue {
    fn on_init(&mut self, widths: &BTreeMap<String, f64>) {
        self.events.push(ResizeEvent::Init {
            widths: widths.clone(),
        });
    }

    fn on_resize_start(&mut self, event: &PointerEvent) {
        self.events.push(ResizeEvent::Start { x: event.x });
    }

    fn on_resize_stop(&mut self, event: &PointerEvent, widths: &BTreeMap<String, f64>) {
        self.events.push(ResizeEvent::Stop {
            x: event.x,
            widths: widths.clone(),
        });
    }
}

/// An ongoing drag on one boundary.
#[derive(Debug)]
pub struct ActiveDrag<G> {
    pub handle: ResizeHandle,
    /// Pointer x at pointer-down
    pub origin_x: f64,
    /// Geometry snapshot every move is computed from
    pub layout: RowLayout,
    /// Widths from the last move that was not rejected
    pub applied: BTreeMap<String, f64>,
    capture: G,
}

#[derive(Debug)]
pub enum ResizeState<G> {
    Idle,
    /// Handles shown, nothing grabbed
    Armed { handles: Vec<ResizeHandle> },
    Dragging(ActiveDrag<G>),
}

/// State tag without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizePhase {
    Idle,
    Armed,
    Dragging,
}

/// Column resizing for one rendered table.
pub struct ColumnResizer<S: TableSurface, C: ResizeCallbacks> {
    surface: S,
    callbacks: C,
    options: TableOptions,
    state: ResizeState<S::Capture>,
    disabled: bool,
}

impl<S: TableSurface, C: ResizeCallbacks> ColumnResizer<S, C> {
    pub fn new(surface: S, callbacks: C, options: TableOptions) -> Self {
        Self {
            surface,
            callbacks,
            options,
            state: ResizeState::Idle,
            disabled: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn phase(&self) -> ResizePhase {
        match self.state {
            ResizeState::Idle => ResizePhase::Idle,
            ResizeState::Armed { .. } => ResizePhase::Armed,
            ResizeState::Dragging(_) => ResizePhase::Dragging,
        }
    }

    /// Handles currently on screen
    pub fn handles(&self) -> &[ResizeHandle] {
        match &self.state {
            ResizeState::Idle => &[],
            ResizeState::Armed { handles } => handles,
            ResizeState::Dragging(drag) => std::slice::from_ref(&drag.handle),
        }
    }

    pub fn active_drag(&self) -> Option<&ActiveDrag<S::Capture>> {
        match &self.state {
            ResizeState::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    /// Report every keyed cell's rendered width to `on_init`.
    pub fn init(&mut self) -> BTreeMap<String, f64> {
        let widths: BTreeMap<String, f64> = self
            .surface
            .rows()
            .into_iter()
            .flatten()
            .filter_map(|cell| Some((cell.key?, cell.width)))
            .collect();
        self.callbacks.on_init(&widths);
        widths
    }

    fn current_handles(&self) -> Vec<ResizeHandle> {
        let rows = self.surface.rows();
        handles_for_first_row(&rows, self.surface.table_height(), self.options.handle_width)
    }

    fn show_fresh_handles(&mut self) {
        let handles = self.current_handles();
        self.show(handles);
    }

    fn show(&mut self, handles: Vec<ResizeHandle>) {
        self.surface.remove_handles(None);
        if handles.is_empty() {
            self.state = ResizeState::Idle;
            return;
        }
        self.surface.show_handles(&handles);
        log::debug!("armed with {} handles", handles.len());
        self.state = ResizeState::Armed { handles };
    }

    /// Pointer entered a cell of the table: place a handle on every boundary.
    ///
    /// Handles already shown for the same geometry are left in place.
    pub fn pointer_enter(&mut self) {
        if self.disabled || matches!(self.state, ResizeState::Dragging(_)) {
            return;
        }
        let handles = self.current_handles();
        if matches!(&self.state, ResizeState::Armed { handles: shown } if *shown == handles) {
            return;
        }
        self.show(handles);
    }

    /// Pointer left the table.
    ///
    /// `still_inside` is true when the pointer only moved between elements of
    /// the table. A running drag keeps going; only its own handle stays.
    pub fn pointer_leave(&mut self, still_inside: bool) {
        if still_inside {
            return;
        }
        match &self.state {
            ResizeState::Idle => {}
            ResizeState::Armed { .. } => {
                self.surface.remove_handles(None);
                self.state = ResizeState::Idle;
                log::debug!("pointer left table, disarmed");
            }
            ResizeState::Dragging(drag) => {
                self.surface.remove_handles(Some(drag.handle.id));
            }
        }
    }

    /// Grab a handle. Returns false if no drag started.
    pub fn pointer_down(&mut self, id: HandleId, event: PointerEvent) -> bool {
        if self.disabled {
            return false;
        }
        let ResizeState::Armed { handles } = &self.state else {
            return false;
        };
        let Some(handle) = handles.iter().find(|h| h.id == id).cloned() else {
            log::warn!("pointer down on unknown handle {}", id.0);
            return false;
        };

        self.surface.remove_handles(Some(id));
        let layout = capture_row_layout(&self.surface.rows());
        let capture = self.surface.capture_pointer();
        self.callbacks.on_resize_start(&event);
        log::debug!("dragging boundary {} from x={}", handle.boundary, event.x);
        self.state = ResizeState::Dragging(ActiveDrag {
            handle,
            origin_x: event.x,
            layout,
            applied: BTreeMap::new(),
            capture,
        });
        true
    }

    /// Preview the widths for the current pointer position.
    pub fn pointer_move(&mut self, event: PointerEvent) -> Option<WidthUpdate> {
        let ResizeState::Dragging(drag) = &mut self.state else {
            return None;
        };
        let update = update_cell_widths(
            &mut self.surface,
            &drag.layout,
            drag.handle.boundary,
            event.x - drag.origin_x,
            self.options.minimum_cell_width,
            self.options.saturation,
        );
        if !update.saturated {
            drag.applied.clone_from(&update.widths);
        }
        Some(update)
    }

    /// Release the drag and report the final widths.
    ///
    /// `release_on` is the handle under the pointer, if any; when it is the
    /// dragged one the handles are refreshed for the new geometry, otherwise
    /// they are all removed.
    pub fn pointer_up(
        &mut self,
        event: PointerEvent,
        release_on: Option<HandleId>,
    ) -> Option<WidthUpdate> {
        let mut drag = match mem::replace(&mut self.state, ResizeState::Idle) {
            ResizeState::Dragging(drag) => drag,
            other => {
                self.state = other;
                return None;
            }
        };
        let update = update_cell_widths(
            &mut self.surface,
            &drag.layout,
            drag.handle.boundary,
            event.x - drag.origin_x,
            self.options.minimum_cell_width,
            self.options.saturation,
        );
        if !update.saturated {
            drag.applied.clone_from(&update.widths);
        }
        let ActiveDrag {
            handle,
            applied,
            capture,
            ..
        } = drag;
        drop(capture);

        self.callbacks.on_resize_stop(&event, &applied);
        log::debug!("drag on boundary {} released", handle.boundary);

        if release_on == Some(handle.id) && !self.disabled {
            self.show_fresh_handles();
        } else {
            self.surface.remove_handles(None);
        }
        Some(update)
    }

    /// Abort a drag and put the drag-start widths back.
    pub fn cancel(&mut self) -> bool {
        let drag = match mem::replace(&mut self.state, ResizeState::Idle) {
            ResizeState::Dragging(drag) => drag,
            other => {
                self.state = other;
                return false;
            }
        };
        let ActiveDrag {
            layout, capture, ..
        } = drag;
        drop(capture);
        for (key, cell) in layout.keyed_cells() {
            self.surface.apply_width(key, cell.width);
        }
        self.surface.remove_handles(None);
        log::debug!("drag cancelled");
        true
    }

    /// Turn resizing off or back on. A running drag is not interrupted.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled && !matches!(self.state, ResizeState::Dragging(_)) {
            self.surface.remove_handles(None);
            self.state = ResizeState::Idle;
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

impl<S, C> std::fmt::Debug for ColumnResizer<S, C>
where
    S: TableSurface + std::fmt::Debug,
    C: ResizeCallbacks + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnResizer")
            .field("surface", &self.surface)
            .field("callbacks", &self.callbacks)
            .field("phase", &self.phase())
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::RenderedCell;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Token(Rc<Cell<usize>>);

    impl Drop for Token {
        fn drop(&mut self) {
            self.0.set(self.0.get() - 1);
        }
    }

    #[derive(Default)]
    struct Surface {
        rows: Vec<Vec<RenderedCell>>,
        shown: Vec<HandleId>,
        shows: usize,
        captures: Rc<Cell<usize>>,
    }

    impl TableSurface for Surface {
        type Capture = Token;

        fn rows(&self) -> Vec<Vec<RenderedCell>> {
            self.rows.clone()
        }

        fn table_height(&self) -> f64 {
            40.0
        }

        fn rendered_width(&self, key: &str) -> Option<f64> {
            self.rows
                .iter()
                .flatten()
                .find(|c| c.key.as_deref() == Some(key))
                .map(|c| c.width)
        }

        fn apply_width(&mut self, key: &str, width: f64) {
            for cell in self.rows.iter_mut().flatten() {
                if cell.key.as_deref() == Some(key) {
                    cell.width = width;
                }
            }
        }

        fn show_handles(&mut self, handles: &[ResizeHandle]) {
            self.shown = handles.iter().map(|h| h.id).collect();
            self.shows += 1;
        }

        fn remove_handles(&mut self, keep: Option<HandleId>) {
            self.shown.retain(|id| Some(*id) == keep);
        }

        fn capture_pointer(&mut self) -> Token {
            self.captures.set(self.captures.get() + 1);
            Token(Rc::clone(&self.captures))
        }
    }

    fn resizer() -> ColumnResizer<Surface, EventQueue> {
        let surface = Surface {
            rows: vec![vec![
                RenderedCell::new("a", 100.0),
                RenderedCell::new("b", 100.0),
                RenderedCell::new("c", 100.0),
            ]],
            ..Surface::default()
        };
        let options = TableOptions {
            minimum_cell_width: 50.0,
            ..TableOptions::default()
        };
        ColumnResizer::new(surface, EventQueue::new(), options)
    }

    #[test]
    fn test_enter_arms_handles() {
        let mut r = resizer();
        assert_eq!(r.phase(), ResizePhase::Idle);
        r.pointer_enter();
        assert_eq!(r.phase(), ResizePhase::Armed);
        assert_eq!(r.handles().len(), 3);
        assert_eq!(r.surface().shown.len(), 3);
    }

    #[test]
    fn test_enter_keeps_handles_for_same_geometry() {
        let mut r = resizer();
        r.pointer_enter();
        let armed = r.handles().to_vec();
        r.pointer_enter();
        r.pointer_enter();
        assert_eq!(r.surface().shows, 1);
        assert_eq!(r.handles(), armed.as_slice());

        r.surface_mut().apply_width("a", 150.0);
        r.pointer_enter();
        assert_eq!(r.surface().shows, 2);
        assert_ne!(r.handles(), armed.as_slice());
    }

    #[test]
    fn test_full_drag_cycle() {
        let mut r = resizer();
        r.pointer_enter();
        assert!(r.pointer_down(HandleId(0), PointerEvent::at(500.0)));
        assert_eq!(r.phase(), ResizePhase::Dragging);
        assert_eq!(r.surface().shown, vec![HandleId(0)]);
        assert_eq!(r.surface().captures.get(), 1);

        let preview = r.pointer_move(PointerEvent::at(520.0)).unwrap();
        assert_eq!(preview.widths["a"], 120.0);
        assert_eq!(preview.widths["b"], 80.0);

        let done = r.pointer_up(PointerEvent::at(530.0), None).unwrap();
        assert_eq!(done.widths["a"], 130.0);
        assert_eq!(r.phase(), ResizePhase::Idle);
        assert_eq!(r.surface().captures.get(), 0);
        assert!(r.surface().shown.is_empty());

        let events = r.callbacks_mut().drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ResizeEvent::Start { x: 500.0 });
        let ResizeEvent::Stop { widths, .. } = &events[1] else {
            panic!("expected stop event");
        };
        assert_eq!(widths["a"], 130.0);
        assert_eq!(widths["b"], 70.0);
    }

    #[test]
    fn test_moves_are_relative_to_snapshot() {
        let mut r = resizer();
        r.pointer_enter();
        r.pointer_down(HandleId(0), PointerEvent::at(0.0));
        r.pointer_move(PointerEvent::at(30.0));
        let again = r.pointer_move(PointerEvent::at(10.0)).unwrap();
        assert_eq!(again.widths["a"], 110.0);
        assert_eq!(again.widths["b"], 90.0);
    }

    #[test]
    fn test_second_pointer_down_is_refused() {
        let mut r = resizer();
        r.pointer_enter();
        assert!(r.pointer_down(HandleId(0), PointerEvent::at(0.0)));
        assert!(!r.pointer_down(HandleId(1), PointerEvent::at(0.0)));
        assert_eq!(r.surface().captures.get(), 1);
    }

    #[test]
    fn test_release_on_handle_rearms() {
        let mut r = resizer();
        r.pointer_enter();
        r.pointer_down(HandleId(1), PointerEvent::at(0.0));
        r.pointer_up(PointerEvent::at(10.0), Some(HandleId(1)));
        assert_eq!(r.phase(), ResizePhase::Armed);
        // Boundaries moved, handles were rebuilt for the new geometry
        assert_eq!(r.handles()[1].boundary, 210.0);
    }

    #[test]
    fn test_leave_while_dragging_keeps_drag() {
        let mut r = resizer();
        r.pointer_enter();
        r.pointer_down(HandleId(0), PointerEvent::at(0.0));
        r.pointer_leave(false);
        assert_eq!(r.phase(), ResizePhase::Dragging);
        assert_eq!(r.surface().shown, vec![HandleId(0)]);
    }

    #[test]
    fn test_leave_while_armed_clears() {
        let mut r = resizer();
        r.pointer_enter();
        r.pointer_leave(true);
        assert_eq!(r.phase(), ResizePhase::Armed);
        r.pointer_leave(false);
        assert_eq!(r.phase(), ResizePhase::Idle);
        assert!(r.surface().shown.is_empty());
    }

    #[test]
    fn test_cancel_restores_widths_and_releases_capture() {
        let mut r = resizer();
        r.pointer_enter();
        r.pointer_down(HandleId(0), PointerEvent::at(0.0));
        r.pointer_move(PointerEvent::at(25.0));
        assert!(r.cancel());
        assert_eq!(r.surface().rendered_width("a"), Some(100.0));
        assert_eq!(r.surface().captures.get(), 0);
        assert!(!r.cancel());
    }

    #[test]
    fn test_dropping_resizer_mid_drag_releases_capture() {
        let mut r = resizer();
        let captures = Rc::clone(&r.surface().captures);
        r.pointer_enter();
        r.pointer_down(HandleId(0), PointerEvent::at(0.0));
        drop(r);
        assert_eq!(captures.get(), 0);
    }

    #[test]
    fn test_disabled_shows_no_handles() {
        let mut r = resizer();
        r.pointer_enter();
        r.set_disabled(true);
        assert_eq!(r.phase(), ResizePhase::Idle);
        r.pointer_enter();
        assert!(r.handles().is_empty());
        r.set_disabled(false);
        r.pointer_enter();
        assert_eq!(r.phase(), ResizePhase::Armed);
    }

    #[test]
    fn test_stop_reports_last_accepted_widths() {
        let mut r = resizer();
        r.pointer_enter();
        r.pointer_down(HandleId(0), PointerEvent::at(0.0));
        r.pointer_move(PointerEvent::at(-60.0));
        // "a" is now pinned at the floor; shrinking further is rejected
        let last = r.pointer_up(PointerEvent::at(-90.0), None).unwrap();
        assert!(last.saturated);
        let events = r.callbacks_mut().drain();
        let ResizeEvent::Stop { widths, .. } = &events[1] else {
            panic!("expected stop event");
        };
        assert_eq!(widths["a"], 50.0);
        assert_eq!(widths["b"], 150.0);
    }

    #[test]
    fn test_init_reports_keyed_widths() {
        let mut r = resizer();
        let widths = r.init();
        assert_eq!(widths.len(), 3);
        assert!(matches!(r.callbacks_mut().drain()[0], ResizeEvent::Init { .. }));
    }
}
