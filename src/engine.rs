//! The navigation and interaction engine.
//!
//! Owns the navigation stack, the hover state and the dwell timer. All
//! methods are expected to be called from a single event loop; the engine
//! never blocks and never spawns. Observable changes are queued as
//! [`EngineEvent`]s and collected with [`Engine::drain_events`].

use crate::config::Appearance;
use crate::events::{EngineEvent, NodeSnapshot, Visibility};
use crate::geometry::{Point, Size};
use crate::menu::dispatch::{self, Dispatch, Executor};
use crate::menu::{
    DwellPoll, DwellScheduler, Hit, HitTester, LayoutEngine, MenuModel, NavigationLevel,
    NavigationStack, NodeRef, PlacedNode, Popped,
};
use std::time::{Duration, Instant};

/// How often the host should tick while a dwell is running.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(16);

pub struct Engine<E: Executor> {
    model: MenuModel,
    appearance: Appearance,
    canvas: Size,
    executor: E,
    visibility: Visibility,
    root_center: Point,
    stack: NavigationStack,
    hover: Option<NodeRef>,
    dwell: DwellScheduler<NodeRef>,
    in_dead_zone: bool,
    events: Vec<EngineEvent>,
}

impl<E: Executor> Engine<E> {
    pub fn new(model: MenuModel, appearance: Appearance, executor: E) -> Self {
        let appearance = appearance.sanitized();
        Self {
            dwell: DwellScheduler::new(appearance.dwell_duration()),
            model,
            appearance,
            canvas: Size::default(),
            executor,
            visibility: Visibility::Hidden,
            root_center: Point::default(),
            stack: NavigationStack::default(),
            hover: None,
            in_dead_zone: false,
            events: Vec::new(),
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility != Visibility::Hidden
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn root_center(&self) -> Point {
        self.root_center
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn hovered(&self) -> Option<&PlacedNode> {
        self.hover.and_then(|at| self.stack.get(at))
    }

    pub fn dwell_progress(&self, now: Instant) -> Option<(NodeRef, f64)> {
        self.dwell.progress(now)
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// When the host should call [`Engine::tick`] next, if at all.
    pub fn next_wakeup(&self, now: Instant) -> Option<Instant> {
        if !self.is_open() {
            return None;
        }
        self.dwell
            .deadline()
            .map(|deadline| deadline.min(now + PROGRESS_INTERVAL))
    }

    fn layout(&self) -> LayoutEngine {
        LayoutEngine::new(&self.appearance, self.canvas)
    }

    fn hit_tester(&self) -> HitTester {
        HitTester::new(self.root_center, self.appearance.dead_zone_radius())
    }

    /// Opens the menu around `point`. Re-activating an open menu starts over
    /// at the new point.
    pub fn activate(&mut self, point: Point) {
        let dropped = self.open_submenus();
        if self.is_open() {
            log::debug!("Re-activating at ({:.0}, {:.0})", point.x, point.y);
            self.reset_interaction();
        }
        if self.model.is_empty() {
            log::warn!("Opening an empty menu");
        }
        self.root_center = point;
        // the pointer starts on the activation point
        self.in_dead_zone = true;
        self.seed_root();
        self.emit_dropped(dropped);
        self.set_visibility(Visibility::Showing);
        self.emit_ring();
        self.emit_level(0);
        self.emit_center_label();
    }

    /// Renderer finished its show animation.
    pub fn shown(&mut self) {
        if self.visibility == Visibility::Showing {
            self.set_visibility(Visibility::Visible);
        }
    }

    pub fn pointer_moved(&mut self, point: Point, now: Instant) {
        if !self.is_open() {
            return;
        }

        let hit = self.hit_tester().resolve(point, &self.stack);
        match hit {
            Hit::DeadZone => {
                let entered = !self.in_dead_zone;
                self.in_dead_zone = true;
                self.dwell.hover(None, now);
                self.set_hover(None);
                if entered && self.stack.depth() > 1 {
                    log::debug!("Dead zone entered at depth {}", self.stack.depth());
                    self.pop_level();
                }
            }
            Hit::Node(at) => {
                self.in_dead_zone = false;
                let expanded = self.stack.get(at).is_some_and(|p| p.expanded);
                self.dwell.hover((!expanded).then_some(at), now);
                self.set_hover(Some(at));
            }
            Hit::Miss => {
                self.in_dead_zone = false;
                self.dwell.hover(None, now);
                self.set_hover(None);
            }
        }

        // progress is reported from ticks only
        self.poll_dwell(now, false);
    }

    /// Advances the dwell timer: reports progress and fires on expiry.
    pub fn tick(&mut self, now: Instant) {
        if self.is_open() {
            self.poll_dwell(now, true);
        }
    }

    /// Explicit selection of the hovered node. Clicking the dead zone goes
    /// back; clicking empty space dismisses the menu.
    pub fn click(&mut self) {
        if !self.is_open() {
            return;
        }
        match self.hover {
            Some(at) => {
                self.dwell.cancel();
                self.activate_node(at);
            }
            None if self.in_dead_zone => self.cancel(),
            None => self.hide(),
        }
    }

    /// Back navigation. Hides the menu when only the root is left.
    pub fn cancel(&mut self) {
        if self.is_open() {
            self.pop_level();
        }
    }

    /// Immediate teardown: no pending dwell and no levels survive.
    pub fn hide(&mut self) {
        if !self.is_open() {
            return;
        }
        self.reset_interaction();
        self.stack.clear();
        self.in_dead_zone = false;
        self.set_visibility(Visibility::Hidden);
    }

    /// Swaps in a new tree and appearance. An open menu is rebuilt in place
    /// at its root; expanded submenus are closed.
    pub fn reload_configuration(&mut self, model: MenuModel, appearance: Appearance) {
        self.model = model;
        let appearance = appearance.sanitized();
        self.dwell.set_duration(appearance.dwell_duration());
        self.appearance = appearance;

        if !self.is_open() {
            return;
        }
        log::info!("Reloading open menu at depth {}", self.stack.depth());

        let dropped = self.open_submenus();
        self.reset_interaction();
        self.seed_root();
        self.emit_dropped(dropped);
        self.emit_ring();
        self.emit_level(0);
        self.emit_center_label();
    }

    pub fn update_ui_scale(&mut self, scale: f64) {
        if !(scale.is_finite() && scale > 0.0) {
            log::warn!("Ignoring invalid ui scale {}", scale);
            return;
        }
        self.appearance.ui_scale = scale;
        self.relayout();
    }

    pub fn update_radii(&mut self, inner: f64, outer: f64) {
        let valid = inner.is_finite() && outer.is_finite() && inner >= 0.0 && outer > 0.0;
        if !valid {
            log::warn!("Ignoring invalid radii {} / {}", inner, outer);
            return;
        }
        self.appearance.inner_radius = inner;
        self.appearance.outer_radius = outer;
        self.relayout();
    }

    pub fn update_center_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.appearance.center_text = text.clone();
        if let Some(root) = self.stack.root_mut() {
            root.display_name = text;
            if self.stack.depth() == 1 {
                self.emit_center_label();
            }
        }
    }

    pub fn set_canvas(&mut self, canvas: Size) {
        if self.canvas != canvas {
            self.canvas = canvas;
            self.relayout();
        }
    }

    fn seed_root(&mut self) {
        let root = NavigationLevel::root(
            self.model.roots().to_vec(),
            self.appearance.center_text.clone(),
            self.root_center,
            &self.layout(),
        );
        log::debug!("Root level with {} nodes", root.placed.len());
        self.stack.seed(root);
    }

    /// Depth and name of every level above the root, topmost first.
    fn open_submenus(&self) -> Vec<(usize, String)> {
        self.stack
            .levels()
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .map(|(depth, level)| (depth, level.display_name.clone()))
            .collect()
    }

    fn emit_dropped(&mut self, dropped: Vec<(usize, String)>) {
        for (depth, display_name) in dropped {
            self.events.push(EngineEvent::LevelPopped {
                depth,
                display_name,
            });
        }
    }

    fn relayout(&mut self) {
        if !self.is_open() {
            return;
        }
        let layout = self.layout();
        self.reset_interaction();
        self.stack.relayout(&layout, self.root_center);
        self.emit_ring();
        for depth in 0..self.stack.depth() {
            self.emit_level(depth);
        }
    }

    fn poll_dwell(&mut self, now: Instant, report_progress: bool) {
        match self.dwell.poll(now) {
            DwellPoll::Idle => {}
            DwellPoll::Pending { target, fraction } => {
                if report_progress {
                    self.emit_progress(target, fraction);
                }
            }
            DwellPoll::Fire(target) => {
                self.emit_progress(target, 1.0);
                log::debug!("Dwell fired on {:?}", target);
                self.activate_node(target);
            }
        }
    }

    fn activate_node(&mut self, at: NodeRef) {
        let Some(placed) = self.stack.get(at) else {
            return;
        };
        let dispatch = Dispatch::resolve(placed);
        if dispatch == Dispatch::Ignore {
            return;
        }

        // ancestor levels stay on screen; picking from one closes everything above it
        while self.stack.depth() > at.depth + 1 {
            self.pop_level();
        }

        match dispatch {
            Dispatch::Expand => self.push_level(at.index),
            Dispatch::Ignore => {}
            Dispatch::Execute { action, path } => {
                dispatch::execute(&mut self.executor, action, &path);
                self.hide();
            }
            Dispatch::Dismiss => {
                log::debug!("Leaf without action selected, closing");
                self.hide();
            }
        }
    }

    fn push_level(&mut self, index: usize) {
        let layout = self.layout();
        let Some(level) = self.stack.push(index, &layout) else {
            return;
        };
        let display_name = level.display_name.clone();
        let depth = self.stack.depth() - 1;
        log::debug!("Opened '{}' at depth {}", display_name, depth);

        self.reset_interaction();
        self.emit_level(depth - 1);
        self.emit_level(depth);
        self.events.push(EngineEvent::LevelPushed {
            depth,
            display_name,
        });
        self.emit_center_label();
    }

    fn pop_level(&mut self) {
        match self.stack.pop() {
            Popped::Level(level) => {
                let depth = self.stack.depth();
                log::debug!("Closed '{}' at depth {}", level.display_name, depth);

                self.reset_interaction();
                self.emit_level(depth - 1);
                self.events.push(EngineEvent::LevelPopped {
                    depth,
                    display_name: level.display_name,
                });
                self.emit_center_label();
            }
            Popped::Exhausted => self.hide(),
        }
    }

    fn reset_interaction(&mut self) {
        self.dwell.cancel();
        self.set_hover(None);
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        if self.visibility != visibility {
            log::debug!("Menu {}", visibility);
            self.visibility = visibility;
            self.events
                .push(EngineEvent::VisibilityChanged { visibility });
        }
    }

    fn set_hover(&mut self, hover: Option<NodeRef>) {
        if self.hover == hover {
            return;
        }
        self.hover = hover;
        let node = hover.and_then(|at| self.stack.get(at).map(|p| NodeSnapshot::new(at, p)));
        self.events.push(EngineEvent::HoverChanged { node });
    }

    fn emit_progress(&mut self, at: NodeRef, fraction: f64) {
        if let Some(placed) = self.stack.get(at) {
            self.events.push(EngineEvent::DwellProgress {
                depth: at.depth,
                index: at.index,
                id: placed.node.id.clone(),
                fraction,
            });
        }
    }

    fn emit_level(&mut self, depth: usize) {
        let Some(level) = self.stack.levels().get(depth) else {
            return;
        };
        let nodes = level
            .placed
            .iter()
            .enumerate()
            .map(|(index, p)| NodeSnapshot::new(NodeRef::new(depth, index), p))
            .collect();
        self.events.push(EngineEvent::NodesChanged { depth, nodes });
    }

    fn emit_ring(&mut self) {
        self.events.push(EngineEvent::RingChanged {
            center: self.root_center,
            dead_zone_radius: self.appearance.dead_zone_radius(),
            ui_scale: self.appearance.ui_scale,
            particles_enabled: self.appearance.particles_enabled,
        });
    }

    fn emit_center_label(&mut self) {
        if let Some(text) = self.stack.display_name() {
            let text = text.to_string();
            self.events.push(EngineEvent::CenterLabelChanged { text });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActionKind;
    use crate::menu::MenuNode;
    use std::io;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<(ActionKind, String)>,
        fail: bool,
    }

    impl Executor for Recorder {
        type Error = io::Error;

        fn execute(&mut self, action: ActionKind, path: &str) -> Result<(), io::Error> {
            self.calls.push((action, path.to_string()));
            if self.fail {
                Err(io::Error::other("boom"))
            } else {
                Ok(())
            }
        }
    }

    const CENTER: Point = Point { x: 1000.0, y: 600.0 };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // root ring (spread 190): apps above, web right, places below, broken left
    fn model() -> MenuModel {
        MenuModel::new(vec![
            MenuNode::branch(
                "apps",
                "Apps",
                vec![
                    MenuNode::leaf("term", "Term", ActionKind::Command, "foot"),
                    MenuNode::branch(
                        "games",
                        "Games",
                        vec![MenuNode::leaf("chess", "Chess", ActionKind::Launch, "chess")],
                    ),
                ],
            ),
            MenuNode::leaf("web", "Web", ActionKind::Url, "https://example.org"),
            MenuNode::branch(
                "places",
                "Places",
                vec![MenuNode::leaf("home", "Home", ActionKind::Folder, "~")],
            ),
            MenuNode::leaf("broken", "Broken", ActionKind::None, ""),
        ])
    }

    fn engine() -> Engine<Recorder> {
        let appearance = Appearance {
            center_text: "Menu".to_string(),
            ..Appearance::default()
        };
        let mut engine = Engine::new(model(), appearance, Recorder::default());
        engine.set_canvas(Size::new(2000.0, 1200.0));
        engine.activate(CENTER);
        engine.drain_events();
        engine
    }

    fn node(engine: &Engine<Recorder>, depth: usize, index: usize) -> Point {
        engine.stack().levels()[depth].placed[index].center
    }

    fn dwell_on(engine: &mut Engine<Recorder>, depth: usize, index: usize, start: Instant) {
        let target = node(engine, depth, index);
        engine.pointer_moved(target, start);
        engine.tick(start + ms(500));
    }

    #[test]
    fn test_activate_seeds_root_level() {
        let mut engine = Engine::new(model(), Appearance::default(), Recorder::default());
        assert_eq!(engine.visibility(), Visibility::Hidden);

        engine.activate(CENTER);
        assert_eq!(engine.visibility(), Visibility::Showing);
        assert!(engine.is_open());
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.stack().levels()[0].origin, None);
        assert!((node(&engine, 0, 0).y - (CENTER.y - 190.0)).abs() < 1e-9);

        let events = engine.drain_events();
        assert!(matches!(
            events[0],
            EngineEvent::VisibilityChanged {
                visibility: Visibility::Showing
            }
        ));
        assert!(events.iter().any(
            |e| matches!(e, EngineEvent::NodesChanged { depth: 0, nodes } if nodes.len() == 4)
        ));

        engine.shown();
        assert_eq!(engine.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_dwell_on_leaf_executes_once_and_hides() {
        let mut engine = engine();
        let t0 = Instant::now();
        let web = node(&engine, 0, 1);

        engine.pointer_moved(web, t0);
        engine.tick(t0 + ms(499));
        assert!(engine.executor().calls.is_empty());
        assert!(engine.is_open());

        engine.tick(t0 + ms(500));
        assert_eq!(
            engine.executor().calls,
            vec![(ActionKind::Url, "https://example.org".to_string())]
        );
        assert_eq!(engine.visibility(), Visibility::Hidden);
        assert_eq!(engine.depth(), 0);

        engine.pointer_moved(web, t0 + ms(600));
        engine.tick(t0 + ms(2000));
        engine.click();
        assert_eq!(engine.executor().calls.len(), 1);
        assert_eq!(engine.next_wakeup(t0 + ms(2000)), None);
    }

    #[test]
    fn test_switching_nodes_restarts_dwell() {
        let mut engine = engine();
        let t0 = Instant::now();

        engine.pointer_moved(node(&engine, 0, 3), t0);
        engine.pointer_moved(node(&engine, 0, 1), t0 + ms(400));
        engine.tick(t0 + ms(600));
        assert!(engine.executor().calls.is_empty());
        assert!(engine.is_open());

        engine.tick(t0 + ms(900));
        assert_eq!(engine.executor().calls.len(), 1);
        assert_eq!(engine.executor().calls[0].0, ActionKind::Url);
    }

    #[test]
    fn test_dwell_progress_is_reported() {
        let mut engine = engine();
        let t0 = Instant::now();

        engine.pointer_moved(node(&engine, 0, 1), t0);
        engine.tick(t0 + ms(250));
        let progress: Vec<f64> = engine
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::DwellProgress { id, fraction, .. } if id.as_str() == "web" => {
                    Some(fraction)
                }
                _ => None,
            })
            .collect();

        assert_eq!(progress, vec![0.5]);
        assert_eq!(engine.dwell_progress(t0 + ms(250)), Some((NodeRef::new(0, 1), 0.5)));
        assert_eq!(
            engine.next_wakeup(t0 + ms(250)),
            Some(t0 + ms(250) + PROGRESS_INTERVAL)
        );
        assert_eq!(engine.next_wakeup(t0 + ms(495)), Some(t0 + ms(500)));
    }

    #[test]
    fn test_pointer_motion_does_not_report_progress() {
        let mut engine = engine();
        let t0 = Instant::now();
        let web = node(&engine, 0, 1);

        for (step, dx) in [0.0, 4.0, -3.0, 8.0].into_iter().enumerate() {
            let at = t0 + ms(step as u64 * 60);
            engine.pointer_moved(Point::new(web.x + dx, web.y), at);
        }
        let events = engine.drain_events();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, EngineEvent::DwellProgress { .. }))
        );

        engine.tick(t0 + ms(300));
        let events = engine.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, EngineEvent::DwellProgress { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_dwell_on_branch_pushes_once() {
        let mut engine = engine();
        let t0 = Instant::now();

        dwell_on(&mut engine, 0, 0, t0);
        assert_eq!(engine.depth(), 2);
        assert!(engine.stack().levels()[0].placed[0].expanded);
        assert_eq!(engine.stack().display_name(), Some("Apps"));
        assert!(engine.executor().calls.is_empty());

        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::LevelPushed {
            depth: 1,
            display_name: "Apps".to_string()
        }));
        assert!(events.contains(&EngineEvent::CenterLabelChanged {
            text: "Apps".to_string()
        }));

        // staying on the expanded parent never re-arms it
        let parent = node(&engine, 0, 0);
        engine.pointer_moved(parent, t0 + ms(600));
        assert!(engine.hovered().is_some_and(|p| p.expanded));
        engine.tick(t0 + ms(5000));
        assert_eq!(engine.depth(), 2);
        assert_eq!(engine.next_wakeup(t0 + ms(5000)), None);
    }

    #[test]
    fn test_click_on_leaf_in_submenu() {
        let mut engine = engine();
        let t0 = Instant::now();

        dwell_on(&mut engine, 0, 0, t0);
        engine.pointer_moved(node(&engine, 1, 0), t0 + ms(600));
        engine.click();

        assert_eq!(
            engine.executor().calls,
            vec![(ActionKind::Command, "foot".to_string())]
        );
        assert!(!engine.is_open());
    }

    #[test]
    fn test_dead_zone_at_root_only_clears_hover() {
        let mut engine = engine();
        let t0 = Instant::now();

        engine.pointer_moved(node(&engine, 0, 1), t0);
        assert!(engine.hovered().is_some());
        engine.pointer_moved(CENTER, t0 + ms(100));

        assert!(engine.hovered().is_none());
        assert!(engine.is_open());
        assert_eq!(engine.depth(), 1);
        engine.tick(t0 + ms(1000));
        assert!(engine.executor().calls.is_empty());
    }

    #[test]
    fn test_dead_zone_pops_once_per_entry() {
        let mut engine = engine();
        let t0 = Instant::now();

        dwell_on(&mut engine, 0, 0, t0);
        dwell_on(&mut engine, 1, 1, t0 + ms(600));
        assert_eq!(engine.depth(), 3);
        assert_eq!(engine.stack().display_name(), Some("Games"));

        engine.pointer_moved(CENTER, t0 + ms(1200));
        assert_eq!(engine.depth(), 2);
        engine.pointer_moved(Point::new(CENTER.x + 5.0, CENTER.y), t0 + ms(1210));
        assert_eq!(engine.depth(), 2);
        assert_eq!(engine.stack().display_name(), Some("Apps"));
        assert!(!engine.stack().levels()[1].placed[1].expanded);

        engine.pointer_moved(Point::new(CENTER.x + 100.0, CENTER.y), t0 + ms(1300));
        engine.pointer_moved(CENTER, t0 + ms(1400));
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.stack().display_name(), Some("Menu"));
        assert!(engine.is_open());
    }

    #[test]
    fn test_cancel_pops_then_hides() {
        let mut engine = engine();
        let t0 = Instant::now();
        let before = engine.stack().clone();

        dwell_on(&mut engine, 0, 2, t0);
        assert_eq!(engine.depth(), 2);
        engine.drain_events();

        engine.cancel();
        assert_eq!(engine.stack(), &before);
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::LevelPopped {
            depth: 1,
            display_name: "Places".to_string()
        }));
        assert!(events.contains(&EngineEvent::CenterLabelChanged {
            text: "Menu".to_string()
        }));

        engine.cancel();
        assert_eq!(engine.visibility(), Visibility::Hidden);
        assert!(engine.stack().is_empty());
    }

    #[test]
    fn test_click_outside_dismisses_and_center_goes_back() {
        let mut engine = engine();
        let t0 = Instant::now();

        dwell_on(&mut engine, 0, 2, t0);
        engine.pointer_moved(CENTER, t0 + ms(600));
        assert_eq!(engine.depth(), 1);
        engine.click();
        assert!(!engine.is_open());

        engine.activate(CENTER);
        engine.pointer_moved(Point::new(50.0, 50.0), t0 + ms(700));
        engine.click();
        assert!(!engine.is_open());
        assert!(engine.executor().calls.is_empty());
    }

    #[test]
    fn test_failed_execution_still_hides() {
        let mut engine = engine();
        engine.executor.fail = true;
        let t0 = Instant::now();

        engine.pointer_moved(node(&engine, 0, 1), t0);
        engine.click();

        assert_eq!(engine.executor().calls.len(), 1);
        assert_eq!(engine.visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_leaf_without_action_just_closes() {
        let mut engine = engine();
        dwell_on(&mut engine, 0, 3, Instant::now());
        assert!(engine.executor().calls.is_empty());
        assert!(!engine.is_open());
    }

    #[test]
    fn test_clipboard_payload_reaches_executor_untouched() {
        let snippet = "    indented\n";
        let model = MenuModel::new(vec![MenuNode::leaf(
            "snippet",
            "Snippet",
            ActionKind::Clipboard,
            snippet,
        )]);
        let mut engine = Engine::new(model, Appearance::default(), Recorder::default());
        engine.set_canvas(Size::new(2000.0, 1200.0));
        engine.activate(CENTER);

        engine.pointer_moved(node(&engine, 0, 0), Instant::now());
        engine.click();
        assert_eq!(
            engine.executor().calls,
            vec![(ActionKind::Clipboard, snippet.to_string())]
        );
    }

    #[test]
    fn test_picking_root_sibling_from_submenu() {
        let mut engine = engine();
        let t0 = Instant::now();

        dwell_on(&mut engine, 0, 0, t0);
        assert_eq!(engine.depth(), 2);

        dwell_on(&mut engine, 0, 2, t0 + ms(600));
        assert_eq!(engine.depth(), 2);
        assert_eq!(engine.stack().display_name(), Some("Places"));
        let root = &engine.stack().levels()[0].placed;
        assert!(!root[0].expanded);
        assert!(root[2].expanded);
    }

    #[test]
    fn test_reload_resets_to_root() {
        let mut engine = engine();
        let t0 = Instant::now();
        dwell_on(&mut engine, 0, 0, t0);
        engine.drain_events();

        let smaller = MenuModel::new(vec![MenuNode::leaf(
            "only",
            "Only",
            ActionKind::Command,
            "true",
        )]);
        let appearance = Appearance {
            dwell_ms: 200,
            center_text: "Reloaded".to_string(),
            ..Appearance::default()
        };
        engine.reload_configuration(smaller, appearance);

        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.stack().levels()[0].placed.len(), 1);
        assert_eq!(engine.root_center(), CENTER);
        assert_eq!(engine.stack().display_name(), Some("Reloaded"));
        assert!(engine.drain_events().contains(&EngineEvent::LevelPopped {
            depth: 1,
            display_name: "Apps".to_string()
        }));

        engine.pointer_moved(node(&engine, 0, 0), t0 + ms(1000));
        engine.tick(t0 + ms(1200));
        assert_eq!(engine.executor().calls.len(), 1);
    }

    #[test]
    fn test_reactivating_closes_open_submenus() {
        let mut engine = engine();
        dwell_on(&mut engine, 0, 0, Instant::now());
        assert_eq!(engine.depth(), 2);
        engine.drain_events();

        let elsewhere = Point::new(300.0, 300.0);
        engine.activate(elsewhere);
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.root_center(), elsewhere);

        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::LevelPopped {
            depth: 1,
            display_name: "Apps".to_string()
        }));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, EngineEvent::NodesChanged { depth: 0, .. }))
        );
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, EngineEvent::NodesChanged { depth: 1, .. }))
        );
    }

    #[test]
    fn test_reload_while_hidden_applies_on_next_activation() {
        let mut engine = engine();
        engine.hide();
        engine.reload_configuration(MenuModel::default(), Appearance::default());
        assert!(!engine.is_open());

        engine.activate(CENTER);
        assert!(engine.stack().levels()[0].placed.is_empty());
        engine.pointer_moved(Point::new(CENTER.x + 190.0, CENTER.y), Instant::now());
        assert!(engine.hovered().is_none());
    }

    #[test]
    fn test_ui_scale_update_relayouts_every_level() {
        let mut engine = engine();
        dwell_on(&mut engine, 0, 0, Instant::now());
        engine.drain_events();

        engine.update_ui_scale(1.6);
        assert_eq!(engine.depth(), 2);
        assert!((node(&engine, 0, 0).distance(CENTER) - 304.0).abs() < 1e-6);
        assert!(engine.stack().levels()[0].placed[0].expanded);
        assert_eq!(
            engine.stack().levels()[1].origin,
            Some(node(&engine, 0, 0))
        );
        let changed: Vec<usize> = engine
            .drain_events()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::NodesChanged { depth, .. } => Some(*depth),
                _ => None,
            })
            .collect();
        assert_eq!(changed, vec![0, 1]);

        engine.update_ui_scale(0.0);
        engine.update_ui_scale(f64::NAN);
        assert_eq!(engine.appearance().ui_scale, 1.6);
    }

    #[test]
    fn test_radii_update_moves_dead_zone() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.update_radii(100.0, 300.0);

        engine.pointer_moved(Point::new(CENTER.x + 90.0, CENTER.y), t0);
        assert!(engine.hovered().is_none());
        assert!((node(&engine, 0, 1).distance(CENTER) - 270.0).abs() < 1e-6);

        engine.update_radii(-1.0, 300.0);
        assert_eq!(engine.appearance().inner_radius, 100.0);
    }

    #[test]
    fn test_center_text_updates_root_label() {
        let mut engine = engine();
        engine.update_center_text("Hello");
        assert_eq!(engine.stack().display_name(), Some("Hello"));
        assert!(engine.drain_events().contains(&EngineEvent::CenterLabelChanged {
            text: "Hello".to_string()
        }));

        dwell_on(&mut engine, 0, 0, Instant::now());
        engine.drain_events();
        engine.update_center_text("Again");
        assert!(engine.drain_events().is_empty());
        engine.cancel();
        assert_eq!(engine.stack().display_name(), Some("Again"));
    }

    #[test]
    fn test_hide_cancels_pending_dwell() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.pointer_moved(node(&engine, 0, 1), t0);
        assert!(engine.next_wakeup(t0).is_some());

        engine.hide();
        engine.tick(t0 + ms(1000));
        assert!(engine.executor().calls.is_empty());
        assert!(engine.next_wakeup(t0).is_none());
        assert!(engine.hovered().is_none());
        engine.drain_events();

        engine.pointer_moved(Point::new(CENTER.x + 190.0, CENTER.y), t0 + ms(1100));
        assert!(engine.drain_events().is_empty());
    }
}
