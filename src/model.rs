//! Application model: pages, navigation and message dispatch.
//!
//! Every list page owns one table controller; the model routes messages to
//! the active page depending on the current modus and exposes a `UIData`
//! snapshot for rendering. All updates are synchronous, each message is
//! fully applied before the next event is read.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use ratatui::text::Line;
use tracing::{debug, error, trace};

use crate::domain::{Message, OpsConfig, OpsError, Role};
use crate::entities::{
    categories_schema, customers_schema, invoices_schema, products_schema,
    purchase_orders_schema, quotations_schema, sales_orders_schema, sales_persons_schema,
    suppliers_schema, Product,
};
use crate::inputter::{InputResult, Inputter};
use crate::store::Store;
use crate::table::{Record, Schema, SortDirection, TableController};

const PAGE_JUMP: usize = 10;
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_COLUMN_WIDTH: u16 = 28;

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    Table,
    Sidebar,
    Detail,
    SearchInput,
    Popup,
}

/// Field/value listing of one activated record.
#[derive(Debug, Clone)]
pub struct DetailData {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct HeaderCell {
    pub label: String,
    pub sort: Option<SortDirection>,
    pub sortable: bool,
    pub selected: bool,
}

/// Render snapshot of the active page's table.
pub struct TableUIData {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<Line<'static>>>,
    pub widths: Vec<u16>,
    pub selected: Option<usize>,
    pub filtered: usize,
    pub total: usize,
}

// CSV escaping for clipboard export of a row.
fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.contains(' ') || c.contains('\t') || c.contains(',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

struct QuickFilter<R> {
    label: String,
    predicate: Box<dyn Fn(&R) -> bool>,
}

/// One list page: records plus a table controller. Everything the page
/// contributes is declarative, the engine does the work.
pub struct Page<R: Record + Clone + 'static> {
    title: String,
    records: Vec<R>,
    // The engine input after the page level quick filter, recomputed when
    // the filter changes.
    filtered_records: Vec<R>,
    controller: TableController<R>,
    // Some(..) iff the page owns the search term (controlled mode).
    host_term: Option<String>,
    quick_filters: Vec<QuickFilter<R>>,
    active_filter: Option<usize>,
    cursor: usize,
    column: usize,
    activated: Rc<RefCell<Option<R>>>,
}

impl<R: Record + Clone + 'static> Page<R> {
    /// Page with controller owned (uncontrolled) search state.
    pub fn new(title: impl Into<String>, schema: Schema<R>, records: Vec<R>) -> Self {
        Self::build(title.into(), schema, records, false)
    }

    /// Page that owns its search term and supplies it per derivation.
    pub fn controlled(title: impl Into<String>, schema: Schema<R>, records: Vec<R>) -> Self {
        Self::build(title.into(), schema, records, true)
    }

    fn build(title: String, schema: Schema<R>, records: Vec<R>, controlled: bool) -> Self {
        let activated: Rc<RefCell<Option<R>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&activated);
        let on_activate = move |record: &R| {
            *slot.borrow_mut() = Some(record.clone());
        };
        let controller = if controlled {
            TableController::controlled(schema).on_activate(on_activate)
        } else {
            TableController::new(schema).on_activate(on_activate)
        };
        let filtered_records = records.clone();
        Page {
            title,
            records,
            filtered_records,
            controller,
            host_term: controlled.then(String::new),
            quick_filters: Vec::new(),
            active_filter: None,
            cursor: 0,
            column: 0,
            activated,
        }
    }

    pub fn quick_filter(
        mut self,
        label: impl Into<String>,
        predicate: impl Fn(&R) -> bool + 'static,
    ) -> Self {
        self.quick_filters.push(QuickFilter {
            label: label.into(),
            predicate: Box::new(predicate),
        });
        self
    }

    fn rows(&self) -> Vec<&R> {
        self.controller
            .derive(&self.filtered_records, self.host_term.as_deref())
    }

    fn apply_quick_filter(&mut self) {
        self.filtered_records = match self.active_filter {
            None => self.records.clone(),
            Some(idx) => {
                let predicate = &self.quick_filters[idx].predicate;
                self.records
                    .iter()
                    .filter(|r| predicate(r))
                    .cloned()
                    .collect()
            }
        };
        self.cursor = 0;
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn selected_identity(&self) -> Option<String> {
        self.rows().get(self.cursor).and_then(|r| r.identity())
    }

    // Keep the cursor on the same record after a reorder when the record
    // has a stable identity; the positional fallback keeps the index.
    fn restore_cursor(&mut self, identity: Option<String>) {
        let pos = identity.and_then(|id| {
            self.rows()
                .iter()
                .position(|r| r.identity().as_deref() == Some(id.as_str()))
        });
        match pos {
            Some(pos) => self.cursor = pos,
            None => self.clamp_cursor(),
        }
    }
}

/// Object safe view of a page, so the model can hold nine differently
/// typed pages in one list.
pub trait PageView {
    fn title(&self) -> &str;
    fn move_up(&mut self, n: usize);
    fn move_down(&mut self, n: usize);
    fn move_begin(&mut self);
    fn move_end(&mut self);
    fn next_column(&mut self);
    fn prev_column(&mut self);
    fn toggle_sort(&mut self) -> Option<String>;
    fn activate(&mut self) -> Option<DetailData>;
    fn set_search(&mut self, term: &str);
    fn clear_search(&mut self);
    fn search_term(&self) -> String;
    fn cycle_filter(&mut self) -> Option<String>;
    fn copy_line(&self) -> Option<String>;
    fn table_ui(&self) -> TableUIData;
}

impl<R: Record + Clone + 'static> PageView for Page<R> {
    fn title(&self) -> &str {
        &self.title
    }

    fn move_up(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    fn move_down(&mut self, n: usize) {
        let len = self.rows().len();
        if len > 0 {
            self.cursor = (self.cursor + n).min(len - 1);
        }
    }

    fn move_begin(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.rows().len().saturating_sub(1);
    }

    fn next_column(&mut self) {
        let count = self.controller.schema().columns().len();
        if self.column + 1 < count {
            self.column += 1;
        }
    }

    fn prev_column(&mut self) {
        self.column = self.column.saturating_sub(1);
    }

    fn toggle_sort(&mut self) -> Option<String> {
        let schema = self.controller.schema();
        let key = schema.column_key(self.column)?.to_string();
        let label = schema.columns()[self.column].label().to_string();
        if !schema.is_sortable(&key) {
            return Some(format!("Column '{label}' is not sortable"));
        }

        let selected = self.selected_identity();
        self.controller.toggle_sort(&key);
        self.restore_cursor(selected);

        let direction = self.controller.sort().direction();
        Some(format!("Sorted by {label} {}", direction.indicator()))
    }

    fn activate(&mut self) -> Option<DetailData> {
        let rows = self.rows();
        let record = rows.get(self.cursor)?;
        let rendered = self.controller.render_rows(&rows);
        let origin = rendered
            .get(self.cursor)
            .and_then(|row| row.cells.get(self.column));
        if !self.controller.activate(record, origin) {
            debug!("Row activation suppressed on page {}", self.title);
            return None;
        }

        let activated = self.activated.borrow_mut().take()?;
        let fields = self
            .controller
            .schema()
            .columns()
            .iter()
            .map(|c| (c.label().to_string(), activated.field(c.key()).display()))
            .collect();
        Some(DetailData {
            title: self.title.clone(),
            fields,
        })
    }

    fn set_search(&mut self, term: &str) {
        match &mut self.host_term {
            Some(current) => *current = term.to_string(),
            None => self.controller.set_search(term),
        }
        self.cursor = 0;
    }

    fn clear_search(&mut self) {
        self.set_search("");
    }

    fn search_term(&self) -> String {
        match &self.host_term {
            Some(term) => term.clone(),
            None => self.controller.search_term().to_string(),
        }
    }

    fn cycle_filter(&mut self) -> Option<String> {
        if self.quick_filters.is_empty() {
            return None;
        }
        self.active_filter = match self.active_filter {
            None => Some(0),
            Some(idx) if idx + 1 < self.quick_filters.len() => Some(idx + 1),
            Some(_) => None,
        };
        self.apply_quick_filter();
        Some(match self.active_filter {
            Some(idx) => format!("Filter: {}", self.quick_filters[idx].label),
            None => "Filter cleared".to_string(),
        })
    }

    fn copy_line(&self) -> Option<String> {
        let rows = self.rows();
        let rendered = self.controller.render_rows(&rows);
        let row = rendered.get(self.cursor)?;
        let line = row
            .cells
            .iter()
            .map(|c| wrap_cell_content(&c.plain_text()))
            .collect::<Vec<String>>()
            .join(",");
        Some(line)
    }

    fn table_ui(&self) -> TableUIData {
        let rows = self.rows();
        let rendered = self.controller.render_rows(&rows);
        let schema = self.controller.schema();
        let sort = self.controller.sort();

        let headers: Vec<HeaderCell> = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(i, c)| HeaderCell {
                label: c.label().to_string(),
                sort: match sort.active() {
                    Some(key) if key == c.key() => Some(sort.direction()),
                    _ => None,
                },
                sortable: c.is_sortable(),
                selected: i == self.column,
            })
            .collect();

        let mut widths: Vec<u16> = headers
            .iter()
            .map(|h| h.label.chars().count() as u16 + 2)
            .collect();
        for row in &rendered {
            for (i, cell) in row.cells.iter().enumerate() {
                let w = cell.plain_text().chars().count() as u16 + 1;
                if w > widths[i] {
                    widths[i] = w.min(MAX_COLUMN_WIDTH);
                }
            }
        }

        let cells: Vec<Vec<Line<'static>>> = rendered
            .into_iter()
            .map(|row| row.cells.into_iter().map(|c| c.into_line()).collect())
            .collect();

        TableUIData {
            headers,
            selected: (!rows.is_empty()).then(|| self.cursor.min(rows.len() - 1)),
            filtered: rows.len(),
            total: self.records.len(),
            rows: cells,
            widths,
        }
    }
}

// ---------------------------------------------------------------------------
// Sidebar navigation
// ---------------------------------------------------------------------------

enum NavEntry {
    Leaf {
        label: String,
        page: usize,
    },
    Group {
        id: String,
        label: String,
        children: Vec<(String, usize)>,
    },
}

/// One visible sidebar line.
#[derive(Debug, Clone)]
pub struct SidebarRow {
    pub label: String,
    pub indent: bool,
    pub marker: Option<&'static str>,
    pub page: Option<usize>,
}

/// Grouped navigation with component local expansion state
/// (group id -> expanded), not shared with anything else.
pub struct Sidebar {
    entries: Vec<NavEntry>,
    expanded: HashMap<String, bool>,
    cursor: usize,
}

impl Sidebar {
    fn new(entries: Vec<NavEntry>) -> Self {
        Sidebar {
            entries,
            expanded: HashMap::new(),
            cursor: 0,
        }
    }

    pub fn visible(&self) -> Vec<SidebarRow> {
        let mut rows = Vec::new();
        for entry in &self.entries {
            match entry {
                NavEntry::Leaf { label, page } => rows.push(SidebarRow {
                    label: label.clone(),
                    indent: false,
                    marker: None,
                    page: Some(*page),
                }),
                NavEntry::Group {
                    id,
                    label,
                    children,
                } => {
                    let open = self.expanded.get(id).copied().unwrap_or(false);
                    rows.push(SidebarRow {
                        label: label.clone(),
                        indent: false,
                        marker: Some(if open { "▾" } else { "▸" }),
                        page: None,
                    });
                    if open {
                        for (label, page) in children {
                            rows.push(SidebarRow {
                                label: label.clone(),
                                indent: true,
                                marker: None,
                                page: Some(*page),
                            });
                        }
                    }
                }
            }
        }
        rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn move_up(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    fn move_down(&mut self, n: usize) {
        let len = self.visible().len();
        if len > 0 {
            self.cursor = (self.cursor + n).min(len - 1);
        }
    }

    // Enter on a group toggles its expansion, on a leaf it selects the page.
    fn activate(&mut self) -> Option<usize> {
        let rows = self.visible();
        let row = rows.get(self.cursor)?;
        if let Some(page) = row.page {
            return Some(page);
        }

        // Find the group this visible row belongs to and flip it.
        let mut idx = 0;
        for entry in &self.entries {
            match entry {
                NavEntry::Leaf { .. } => idx += 1,
                NavEntry::Group { id, children, .. } => {
                    if idx == self.cursor {
                        let open = self.expanded.entry(id.clone()).or_insert(false);
                        *open = !*open;
                        return None;
                    }
                    idx += 1;
                    if self.expanded.get(id).copied().unwrap_or(false) {
                        idx += children.len();
                    }
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Complete render snapshot handed to the draw layer.
pub struct UIData {
    pub page_title: String,
    pub table: TableUIData,
    pub sidebar_rows: Vec<SidebarRow>,
    pub sidebar_cursor: usize,
    pub sidebar_focus: bool,
    pub current_page: usize,
    pub search_term: String,
    pub search_editing: bool,
    pub search_input: InputResult,
    pub detail: Option<DetailData>,
    pub detail_scroll: usize,
    pub show_help: bool,
    pub status_message: String,
    pub role: Role,
}

pub struct Model {
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    role: Role,
    pages: Vec<Box<dyn PageView>>,
    current_page: usize,
    sidebar: Sidebar,
    detail: Option<DetailData>,
    detail_scroll: usize,
    input: Inputter,
    last_input: InputResult,
    clipboard: Option<Clipboard>,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(store: Store, config: &OpsConfig, role: Role) -> Result<Self, OpsError> {
        let mut products_page = Page::controlled(
            "Products",
            products_schema(role, config.low_stock_threshold)?,
            store.products,
        );
        // Category quick filters mirror the category select of the page.
        for category in &store.categories {
            let name = category.name.clone();
            products_page = products_page.quick_filter(name.clone(), move |p: &Product| {
                p.category_name.as_deref() == Some(name.as_str())
            });
        }

        let pages: Vec<Box<dyn PageView>> = vec![
            Box::new(products_page),
            Box::new(Page::new(
                "Categories",
                categories_schema()?,
                store.categories,
            )),
            Box::new(Page::new(
                "Quotations",
                quotations_schema()?,
                store.quotations,
            )),
            Box::new(Page::new(
                "Sales Orders",
                sales_orders_schema()?,
                store.sales_orders,
            )),
            Box::new(Page::new(
                "Purchase Orders",
                purchase_orders_schema()?,
                store.purchase_orders,
            )),
            Box::new(Page::new("Invoices", invoices_schema()?, store.invoices)),
            Box::new(Page::new("Customers", customers_schema()?, store.customers)),
            Box::new(Page::new("Suppliers", suppliers_schema()?, store.suppliers)),
            Box::new(Page::new(
                "Sales Persons",
                sales_persons_schema()?,
                store.sales_persons,
            )),
        ];

        let sidebar = Sidebar::new(vec![
            NavEntry::Group {
                id: "products".to_string(),
                label: "Products".to_string(),
                children: vec![
                    ("Inventory".to_string(), 0),
                    ("Categories".to_string(), 1),
                ],
            },
            NavEntry::Group {
                id: "orders".to_string(),
                label: "Orders".to_string(),
                children: vec![
                    ("Sales Orders".to_string(), 3),
                    ("Purchase Orders".to_string(), 4),
                    ("Quotations".to_string(), 2),
                    ("Invoices".to_string(), 5),
                ],
            },
            NavEntry::Leaf {
                label: "Customers".to_string(),
                page: 6,
            },
            NavEntry::Leaf {
                label: "Suppliers".to_string(),
                page: 7,
            },
            NavEntry::Leaf {
                label: "Sales Persons".to_string(),
                page: 8,
            },
        ]);

        let clipboard = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                debug!("Clipboard unavailable: {e:?}");
                None
            }
        };

        Ok(Model {
            status: Status::Ready,
            modus: Modus::Table,
            previous_modus: Modus::Table,
            role,
            pages,
            current_page: 0,
            sidebar,
            detail: None,
            detail_scroll: 0,
            input: Inputter::default(),
            last_input: InputResult::default(),
            clipboard,
            status_message: format!("Signed in as {}", role.as_str()),
            last_status_message_update: Instant::now(),
        })
    }

    fn page_mut(&mut self) -> &mut dyn PageView {
        self.pages[self.current_page].as_mut()
    }

    fn page(&self) -> &dyn PageView {
        self.pages[self.current_page].as_ref()
    }

    /// True while the search line editor consumes raw key events.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::SearchInput
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    pub fn update(&mut self, message: Message) -> Result<(), OpsError> {
        trace!("Update: modus {:?}, message {:?}", self.modus, message);
        match self.modus {
            Modus::Table => match message {
                Message::Quit => self.status = Status::Quitting,
                Message::MoveUp => self.page_mut().move_up(1),
                Message::MoveDown => self.page_mut().move_down(1),
                Message::MovePageUp => self.page_mut().move_up(PAGE_JUMP),
                Message::MovePageDown => self.page_mut().move_down(PAGE_JUMP),
                Message::MoveBeginning => self.page_mut().move_begin(),
                Message::MoveEnd => self.page_mut().move_end(),
                Message::NextColumn => self.page_mut().next_column(),
                Message::PrevColumn => self.page_mut().prev_column(),
                Message::ToggleSort => {
                    if let Some(status) = self.page_mut().toggle_sort() {
                        self.set_status_message(status);
                    }
                }
                Message::Activate => {
                    if let Some(detail) = self.page_mut().activate() {
                        self.detail = Some(detail);
                        self.detail_scroll = 0;
                        self.modus = Modus::Detail;
                    }
                }
                Message::EnterSearch => self.enter_search(),
                Message::ClearSearch => {
                    self.page_mut().clear_search();
                    self.set_status_message("Search cleared");
                }
                Message::CycleFilter => {
                    if let Some(status) = self.page_mut().cycle_filter() {
                        self.set_status_message(status);
                    }
                }
                Message::CopyRow => self.copy_row(),
                Message::NextPage => self.select_page((self.current_page + 1) % self.pages.len()),
                Message::PrevPage => self.select_page(
                    (self.current_page + self.pages.len() - 1) % self.pages.len(),
                ),
                Message::ToggleSidebar => self.modus = Modus::Sidebar,
                Message::Help => self.show_help(),
                Message::Exit | Message::RawKey(_) => {}
            },
            Modus::Sidebar => match message {
                Message::Quit => self.status = Status::Quitting,
                Message::MoveUp => self.sidebar.move_up(1),
                Message::MoveDown => self.sidebar.move_down(1),
                Message::Activate => {
                    if let Some(page) = self.sidebar.activate() {
                        self.select_page(page);
                        self.modus = Modus::Table;
                    }
                }
                Message::ToggleSidebar | Message::Exit => self.modus = Modus::Table,
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::Detail => match message {
                Message::Quit => self.status = Status::Quitting,
                Message::MoveUp => self.detail_scroll = self.detail_scroll.saturating_sub(1),
                Message::MoveDown => {
                    let limit = self
                        .detail
                        .as_ref()
                        .map(|d| d.fields.len().saturating_sub(1))
                        .unwrap_or(0);
                    self.detail_scroll = (self.detail_scroll + 1).min(limit);
                }
                Message::Exit | Message::Activate => {
                    self.detail = None;
                    self.modus = Modus::Table;
                }
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::Popup => match message {
                Message::Quit => self.status = Status::Quitting,
                Message::Exit | Message::Help | Message::Activate => {
                    self.modus = self.previous_modus;
                }
                _ => (),
            },
            Modus::SearchInput => {
                if let Message::RawKey(key) = message {
                    self.raw_input(key);
                }
            }
        }
        Ok(())
    }

    fn enter_search(&mut self) {
        self.input.clear();
        let term = self.page().search_term();
        self.input.set(&term);
        self.last_input = self.input.get();
        self.modus = Modus::SearchInput;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            if !self.last_input.canceled {
                let term = self.last_input.input.clone();
                self.page_mut().set_search(&term);
                if term.trim().is_empty() {
                    self.set_status_message("Search cleared");
                } else {
                    let matches = self.page().table_ui().filtered;
                    self.set_status_message(format!("Found {matches} matches for '{term}'"));
                }
            }
            self.modus = Modus::Table;
        }
    }

    fn select_page(&mut self, page: usize) {
        self.current_page = page;
        let title = self.page().title().to_string();
        self.set_status_message(title);
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Popup;
    }

    fn copy_row(&mut self) {
        let Some(line) = self.page().copy_line() else {
            self.set_status_message("Nothing to copy");
            return;
        };
        match &mut self.clipboard {
            Some(clipboard) => match clipboard.set_text(line) {
                Ok(()) => self.set_status_message("Copied row to clipboard"),
                Err(e) => {
                    error!("Error copying to clipboard: {e:?}");
                    self.set_status_message("Clipboard error");
                }
            },
            None => self.set_status_message("Clipboard unavailable"),
        }
    }

    pub fn ui_data(&self) -> UIData {
        let status_message =
            if self.last_status_message_update.elapsed() < STATUS_MESSAGE_TIMEOUT {
                self.status_message.clone()
            } else {
                "Press ? for help".to_string()
            };

        UIData {
            page_title: self.page().title().to_string(),
            table: self.page().table_ui(),
            sidebar_rows: self.sidebar.visible(),
            sidebar_cursor: self.sidebar.cursor(),
            sidebar_focus: self.modus == Modus::Sidebar,
            current_page: self.current_page,
            search_term: self.page().search_term(),
            search_editing: self.modus == Modus::SearchInput,
            search_input: self.last_input.clone(),
            detail: self.detail.clone(),
            detail_scroll: self.detail_scroll,
            show_help: self.modus == Modus::Popup,
            status_message,
            role: self.role,
        }
    }
}
