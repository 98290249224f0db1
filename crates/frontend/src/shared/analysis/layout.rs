use super::chart::ChartType;
use super::error::{RenderError, StoreError};
use super::presentation::TableModel;
use contracts::dashboards::d500_client_analytics::{storage_key, LayoutEntry, Rect};
use std::rc::Rc;

/// Size of a widget placed without a default rectangle
const FALLBACK_W: u32 = 6;
const FALLBACK_H: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetContent {
    Chart {
        title: String,
        /// Offered in the widget's type selector; empty hides the selector
        type_options: Vec<ChartType>,
        selected: ChartType,
    },
    Table(TableModel),
    Message(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    pub id: String,
    pub rect: Rect,
    pub content: WidgetContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMode {
    pub columns: u32,
    /// Widgets can be neither dragged nor resized
    pub static_grid: bool,
}

/// Grid-layout library capability
pub trait GridBackend {
    fn add_widget(&self, spec: &WidgetSpec) -> Result<(), RenderError>;
    fn remove_widget(&self, widget_id: &str);
    fn remove_all(&self);
    /// Rectangles as currently arranged by the user
    fn current_rects(&self) -> Vec<LayoutEntry>;
    fn configure(&self, mode: GridMode);
}

/// Durable string key-value storage
pub trait LayoutStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSettings {
    pub columns: u32,
    pub mobile_breakpoint: u32,
}

/// Places widgets by id, reading saved rectangles through before falling back to defaults
pub struct LayoutEngine {
    grid: Rc<dyn GridBackend>,
    store: Rc<dyn LayoutStore>,
    settings: LayoutSettings,
    namespace: Option<String>,
    placed: Vec<(String, Rect)>,
    mode: GridMode,
}

impl LayoutEngine {
    pub fn new(grid: Rc<dyn GridBackend>, store: Rc<dyn LayoutStore>, settings: LayoutSettings) -> Self {
        Self {
            grid,
            store,
            settings,
            namespace: None,
            placed: Vec::new(),
            mode: GridMode {
                columns: settings.columns,
                static_grid: false,
            },
        }
    }

    /// Layout namespace used by [`place`](Self::place) lookups (the analysis key)
    pub fn set_namespace(&mut self, analysis_key: &str) {
        self.namespace = Some(analysis_key.to_string());
    }

    pub fn clear(&mut self) {
        self.grid.remove_all();
        self.placed.clear();
    }

    /// Adds `widget_id`, replacing a widget with the same id if one is present
    pub fn place(
        &mut self,
        widget_id: &str,
        default_rect: Option<Rect>,
        content: WidgetContent,
    ) -> Result<Rect, RenderError> {
        self.remove(widget_id);

        let rect = self
            .saved_rect(widget_id)
            .or(default_rect)
            .unwrap_or_else(|| self.stacked_rect());

        let spec = WidgetSpec {
            id: widget_id.to_string(),
            rect,
            content,
        };
        self.grid.add_widget(&spec)?;
        self.placed.push((spec.id, rect));
        Ok(rect)
    }

    /// No-op for an id that is not placed
    pub fn remove(&mut self, widget_id: &str) {
        if let Some(pos) = self.placed.iter().position(|(id, _)| id == widget_id) {
            self.grid.remove_widget(widget_id);
            self.placed.remove(pos);
        }
    }

    pub fn widget_ids(&self) -> Vec<&str> {
        self.placed.iter().map(|(id, _)| id.as_str()).collect()
    }


    fn stacked_rect(&self) -> Rect {
        let y = self.placed.iter().map(|(_, r)| r.bottom()).max().unwrap_or(0);
        Rect::new(0, y, FALLBACK_W.min(self.settings.columns), FALLBACK_H)
    }

    fn saved_rect(&self, widget_id: &str) -> Option<Rect> {
        let key = storage_key(self.namespace.as_deref()?);
        let raw = match self.store.load(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Layout '{}' not readable: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str::<Vec<LayoutEntry>>(&raw) {
            Ok(entries) => entries
                .into_iter()
                .find(|entry| entry.id == widget_id)
                .map(|entry| entry.rect()),
            Err(e) => {
                log::warn!("Ignoring malformed layout '{}': {}", key, e);
                None
            }
        }
    }

    /// Persists the current arrangement under `layout_{analysis_key}`.
    ///
    /// Storage failures are logged; returns whether the layout was written.
    pub fn save_layout(&self, analysis_key: &str) -> bool {
        let entries = self.grid.current_rects();
        let key = storage_key(analysis_key);
        let json = match serde_json::to_string(&entries) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Layout '{}' not serializable: {}", key, e);
                return false;
            }
        };
        match self.store.save(&key, &json) {
            Ok(()) => {
                log::debug!("Saved {} widget rects to '{}'", entries.len(), key);
                true
            }
            Err(e) => {
                log::warn!("Layout '{}' not saved: {}", key, e);
                false
            }
        }
    }

    /// Single static column below the mobile breakpoint, full draggable grid above.
    ///
    /// Returns `true` when the mode changed; callers must then resize live charts.
    pub fn apply_viewport(&mut self, width: u32) -> bool {
        let mode = if width < self.settings.mobile_breakpoint {
            GridMode {
                columns: 1,
                static_grid: true,
            }
        } else {
            GridMode {
                columns: self.settings.columns,
                static_grid: false,
            }
        };
        if mode == self.mode {
            return false;
        }
        self.grid.configure(mode);
        self.mode = mode;
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    pub(crate) struct FakeGrid {
        pub widgets: RefCell<Vec<WidgetSpec>>,
        pub modes: RefCell<Vec<GridMode>>,
        pub remove_all_calls: RefCell<usize>,
        /// Overrides `current_rects` to simulate user drags
        pub arranged: RefCell<Option<Vec<LayoutEntry>>>,
    }

    impl FakeGrid {
        pub fn ids(&self) -> Vec<String> {
            self.widgets.borrow().iter().map(|w| w.id.clone()).collect()
        }
    }

    impl GridBackend for FakeGrid {
        fn add_widget(&self, spec: &WidgetSpec) -> Result<(), RenderError> {
            self.widgets.borrow_mut().push(spec.clone());
            Ok(())
        }

        fn remove_widget(&self, widget_id: &str) {
            self.widgets.borrow_mut().retain(|w| w.id != widget_id);
        }

        fn remove_all(&self) {
            self.widgets.borrow_mut().clear();
            *self.remove_all_calls.borrow_mut() += 1;
        }

        fn current_rects(&self) -> Vec<LayoutEntry> {
            if let Some(arranged) = self.arranged.borrow().clone() {
                return arranged;
            }
            self.widgets
                .borrow()
                .iter()
                .map(|w| LayoutEntry::new(w.id.clone(), w.rect))
                .collect()
        }

        fn configure(&self, mode: GridMode) {
            self.modes.borrow_mut().push(mode);
        }
    }

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub entries: RefCell<BTreeMap<String, String>>,
        pub fail_writes: bool,
    }

    impl LayoutStore for MemoryStore {
        fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Write("QuotaExceededError".to_string()));
            }
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    pub(crate) const SETTINGS: LayoutSettings = LayoutSettings {
        columns: 12,
        mobile_breakpoint: 768,
    };

    fn engine(grid: &Rc<FakeGrid>, store: &Rc<MemoryStore>) -> LayoutEngine {
        LayoutEngine::new(grid.clone(), store.clone(), SETTINGS)
    }

    fn message() -> WidgetContent {
        WidgetContent::Message("x".to_string())
    }

    #[test]
    fn test_repeated_place_keeps_one_widget() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore::default());
        let mut layout = engine(&grid, &store);
        layout.set_namespace("cancellations_by_city");

        for _ in 0..3 {
            layout
                .place("cityChart", Some(Rect::new(0, 0, 12, 8)), message())
                .unwrap();
        }

        assert_eq!(grid.ids(), vec!["cityChart".to_string()]);
        assert_eq!(layout.widget_ids(), vec!["cityChart"]);
    }

    #[test]
    fn test_unknown_widget_stacks_below_content() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore::default());
        let mut layout = engine(&grid, &store);

        layout.place("a", Some(Rect::new(0, 0, 12, 8)), message()).unwrap();
        let rect = layout.place("b", None, message()).unwrap();

        assert_eq!(rect, Rect::new(0, 8, 6, 5));
    }

    #[test]
    fn test_saved_layout_round_trip() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore::default());
        let mut layout = engine(&grid, &store);
        layout.set_namespace("Contratos");
        layout.place("mainChart1", Some(Rect::new(0, 0, 6, 5)), message()).unwrap();
        layout.place("mainChart2", Some(Rect::new(6, 0, 6, 5)), message()).unwrap();

        let moved = vec![
            LayoutEntry::new("mainChart1", Rect::new(6, 2, 6, 4)),
            LayoutEntry::new("mainChart2", Rect::new(0, 0, 4, 7)),
        ];
        *grid.arranged.borrow_mut() = Some(moved.clone());
        assert!(layout.save_layout("Contratos"));
        *grid.arranged.borrow_mut() = None;

        layout.clear();
        let r1 = layout.place("mainChart1", Some(Rect::new(0, 0, 6, 5)), message()).unwrap();
        let r2 = layout.place("mainChart2", Some(Rect::new(6, 0, 6, 5)), message()).unwrap();

        assert_eq!(r1, moved[0].rect());
        assert_eq!(r2, moved[1].rect());
    }

    #[test]
    fn test_layouts_are_namespaced_by_analysis() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore::default());
        store.entries.borrow_mut().insert(
            "layout_vendedores".to_string(),
            r#"[{"id":"w","x":3,"y":3,"w":3,"h":3}]"#.to_string(),
        );
        let mut layout = engine(&grid, &store);
        layout.set_namespace("Contratos");

        let rect = layout.place("w", Some(Rect::new(0, 0, 12, 4)), message()).unwrap();
        assert_eq!(rect, Rect::new(0, 0, 12, 4));
    }

    #[test]
    fn test_malformed_layout_falls_back_to_default() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore::default());
        store
            .entries
            .borrow_mut()
            .insert("layout_Contratos".to_string(), "{oops".to_string());
        let mut layout = engine(&grid, &store);
        layout.set_namespace("Contratos");

        let rect = layout.place("mainChart1", Some(Rect::new(0, 0, 6, 5)), message()).unwrap();
        assert_eq!(rect, Rect::new(0, 0, 6, 5));
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore {
            fail_writes: true,
            ..Default::default()
        });
        let mut layout = engine(&grid, &store);
        layout.place("a", None, message()).unwrap();

        assert!(!layout.save_layout("Contratos"));
        assert!(store.entries.borrow().is_empty());
    }

    #[test]
    fn test_viewport_switches_mode_once() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore::default());
        let mut layout = engine(&grid, &store);

        assert!(!layout.apply_viewport(1280));
        assert!(layout.apply_viewport(500));
        assert!(!layout.apply_viewport(400));
        assert!(layout.apply_viewport(1024));

        assert_eq!(
            *grid.modes.borrow(),
            vec![
                GridMode {
                    columns: 1,
                    static_grid: true
                },
                GridMode {
                    columns: 12,
                    static_grid: false
                },
            ]
        );
    }

    #[test]
    fn test_remove_frees_space_for_stacking() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore::default());
        let mut layout = engine(&grid, &store);
        layout.place("a", Some(Rect::new(0, 0, 12, 8)), message()).unwrap();
        layout.place("b", Some(Rect::new(0, 8, 12, 4)), message()).unwrap();

        layout.remove("b");
        layout.remove("missing");

        assert_eq!(grid.ids(), vec!["a".to_string()]);
        assert_eq!(layout.widget_ids(), vec!["a"]);
        assert_eq!(layout.place("c", None, message()).unwrap(), Rect::new(0, 8, 6, 5));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let grid = Rc::new(FakeGrid::default());
        let store = Rc::new(MemoryStore::default());
        let mut layout = engine(&grid, &store);
        layout.place("a", None, message()).unwrap();
        layout.clear();
        layout.clear();
        assert!(grid.ids().is_empty());
        assert!(layout.widget_ids().is_empty());
    }
}
