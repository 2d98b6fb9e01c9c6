//! Generic tabular data engine.
//!
//! Every list page in the console feeds its records through this module:
//! a column schema describes how record fields map to columns, a free text
//! search reduces the collection, a stable type aware sort orders it and a
//! render step produces the final cells. The engine performs no I/O and is
//! fully synchronous, all asynchronous work (fetching records) happens in
//! the hosting page before records are handed over.

use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};

use ratatui::text::Line;
use tracing::{debug, error};

use crate::domain::OpsError;

/// A single extracted field value. This is the engine's only view of record
/// data; anything richer stays inside custom render functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Textual form used for default cell rendering and searching.
    /// Missing renders as an empty string, never as a "null" marker.
    pub fn display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format!("{n}"),
            Value::Missing => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Missing,
        }
    }
}

/// One displayable row. Field extraction is a tolerant read: an unknown key
/// yields `Value::Missing` and never fails, records from heterogeneous API
/// responses may omit optional fields.
pub trait Record {
    fn field(&self, key: &str) -> Value;

    /// Stable identity used as the render key. `None` falls back to the
    /// positional index, which re-identifies rows across a sort flip; that
    /// is a documented limitation, not something to paper over with
    /// guessed identity heuristics.
    fn identity(&self) -> Option<String> {
        None
    }
}

/// The presentation of one cell. Custom renders may return styled content;
/// cells flagged as controls host nested interactive elements and therefore
/// swallow row activation originating from them.
#[derive(Debug, Clone)]
pub struct CellContent {
    line: Line<'static>,
    control: bool,
}

impl CellContent {
    pub fn text(s: impl Into<String>) -> Self {
        CellContent {
            line: Line::from(s.into()),
            control: false,
        }
    }

    pub fn styled(line: Line<'static>) -> Self {
        CellContent {
            line,
            control: false,
        }
    }

    /// A cell holding an interactive control (e.g. an actions menu). Row
    /// activation does not fire when it originates from such a cell.
    pub fn control(line: Line<'static>) -> Self {
        CellContent {
            line,
            control: true,
        }
    }

    pub fn empty() -> Self {
        CellContent::text("")
    }

    pub fn is_control(&self) -> bool {
        self.control
    }

    pub fn line(&self) -> &Line<'static> {
        &self.line
    }

    pub fn into_line(self) -> Line<'static> {
        self.line
    }

    /// Unstyled text of the cell, used for column widths and row export.
    pub fn plain_text(&self) -> String {
        self.line
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }
}

type RenderFn<R> = Box<dyn Fn(&Value, &R) -> CellContent>;

/// Declarative mapping of one record field to a table column.
pub struct Column<R> {
    key: String,
    label: String,
    sortable: bool,
    render: Option<RenderFn<R>>,
}

impl<R> Column<R> {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Column {
            key: key.into(),
            label: label.into(),
            sortable: false,
            render: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Custom cell renderer, invoked with the extracted raw value and the
    /// full record. Its output is used verbatim and is never searched.
    pub fn render(mut self, f: impl Fn(&Value, &R) -> CellContent + 'static) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }
}

/// Ordered set of columns for one table instance. Column order is display
/// order. Duplicate keys are the single programmer error the engine
/// signals, detected once at construction.
pub struct Schema<R> {
    columns: Vec<Column<R>>,
    search_keys: Vec<String>,
}

impl<R> Schema<R> {
    pub fn new(columns: Vec<Column<R>>) -> Result<Self, OpsError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.key == column.key) {
                return Err(OpsError::DuplicateColumn(column.key.clone()));
            }
        }
        let search_keys = columns.iter().map(|c| c.key.clone()).collect();
        Ok(Schema {
            columns,
            search_keys,
        })
    }

    /// Override the searchable fields. By default every column key is
    /// searched; callers can narrow this (e.g. to skip render-only columns)
    /// or widen it to fields not shown as columns.
    pub fn with_search_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn search_keys(&self) -> &[String] {
        &self.search_keys
    }

    pub fn is_sortable(&self, key: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.key == key && c.sortable)
    }

    pub fn column_key(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(|c| c.key.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Active sort column and direction. Starts without an active column, the
/// input order is preserved until a sortable header is toggled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortState {
    active: Option<String>,
    direction: SortDirection,
}

impl SortState {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Header click semantics: the active column flips direction, another
    /// sortable column becomes active ascending, a non sortable column is
    /// a no-op.
    pub fn toggle<R>(&mut self, key: &str, schema: &Schema<R>) {
        if !schema.is_sortable(key) {
            return;
        }
        match self.active.as_deref() {
            Some(active) if active == key => self.direction = self.direction.flipped(),
            _ => {
                self.active = Some(key.to_string());
                self.direction = SortDirection::Ascending;
            }
        }
    }
}

// Missing values rank last independent of the direction, a blank must not
// jump to the top on a descending sort. Mixed present values fall back to
// their textual form.
fn compare_values(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    let ord = match (a, b) {
        (Value::Missing, Value::Missing) => return Ordering::Equal,
        (Value::Missing, _) => return Ordering::Greater,
        (_, Value::Missing) => return Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => a
            .display()
            .to_lowercase()
            .cmp(&b.display().to_lowercase()),
    };
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

/// Reduce `records` to those where `term` is a case insensitive substring of
/// the textual form of any searchable field. An empty or whitespace-only
/// term is the identity.
pub fn filter_rows<'a, R: Record>(
    records: &'a [R],
    term: &str,
    search_keys: &[String],
) -> Vec<&'a R> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| {
            search_keys.iter().any(|key| match record.field(key) {
                Value::Missing => false,
                value => value.display().to_lowercase().contains(&needle),
            })
        })
        .collect()
}

/// Order `rows` by the active sort column. Stable: records with equal keys
/// keep their relative input order in both directions.
pub fn sort_rows<R: Record>(rows: &mut [&R], sort: &SortState) {
    let Some(key) = sort.active() else {
        return;
    };
    rows.sort_by(|a, b| compare_values(&a.field(key), &b.field(key), sort.direction()));
}

/// Render key of a row, preferred from the record identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    Identity(String),
    Index(usize),
}

/// One fully rendered row of the derived row set.
pub struct RenderedRow {
    pub key: RowKey,
    pub cells: Vec<CellContent>,
    pub interactive: bool,
}

fn render_cell<R: Record>(column: &Column<R>, record: &R) -> CellContent {
    let value = record.field(&column.key);
    match &column.render {
        Some(render) => {
            // A single bad record must not blank the whole list view,
            // a panicking render is isolated to its cell.
            panic::catch_unwind(AssertUnwindSafe(|| render(&value, record))).unwrap_or_else(
                |_| {
                    error!("Cell render for column '{}' panicked", column.key);
                    CellContent::empty()
                },
            )
        }
        None => CellContent::text(value.display()),
    }
}

enum SearchOwnership {
    // The controller owns the term and mutates it on search input.
    SelfOwned(String),
    // The hosting page owns the term and supplies it per derivation; the
    // controller keeps no shadow copy.
    External,
}

/// Orchestrates one table instance: threads records through search filter,
/// sort engine and render pipeline. Derivation is a pure synchronous
/// function of (records, search state, sort state), recomputed on every
/// call and never cached.
pub struct TableController<R: Record> {
    schema: Schema<R>,
    search: SearchOwnership,
    sort: SortState,
    on_activate: Option<Box<dyn Fn(&R)>>,
}

impl<R: Record> TableController<R> {
    /// Controller with self owned (uncontrolled) search state.
    pub fn new(schema: Schema<R>) -> Self {
        TableController {
            schema,
            search: SearchOwnership::SelfOwned(String::new()),
            sort: SortState::default(),
            on_activate: None,
        }
    }

    /// Controller whose search term is owned by the hosting page and passed
    /// to every derivation. The mode is fixed for the controller lifetime.
    pub fn controlled(schema: Schema<R>) -> Self {
        TableController {
            schema,
            search: SearchOwnership::External,
            sort: SortState::default(),
            on_activate: None,
        }
    }

    /// Row activation callback, invoked with the full record on qualifying
    /// activations. Without a callback rows are not interactive.
    pub fn on_activate(mut self, f: impl Fn(&R) + 'static) -> Self {
        self.on_activate = Some(Box::new(f));
        self
    }

    pub fn schema(&self) -> &Schema<R> {
        &self.schema
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// The term the controller owns. Empty in controlled mode, where the
    /// current term lives in the hosting page.
    pub fn search_term(&self) -> &str {
        match &self.search {
            SearchOwnership::SelfOwned(term) => term,
            SearchOwnership::External => "",
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        match &mut self.search {
            SearchOwnership::SelfOwned(current) => *current = term.into(),
            SearchOwnership::External => {
                // The page owns the term, a stray internal mutation must not
                // introduce a shadow copy.
                debug!("Ignoring search mutation on externally controlled table");
            }
        }
    }

    pub fn toggle_sort(&mut self, key: &str) {
        self.sort.toggle(key, &self.schema);
    }

    /// Derive the row set: search filter then sort engine. `supplied` is
    /// the controlled term and is ignored by self owned controllers.
    pub fn derive<'a>(&self, records: &'a [R], supplied: Option<&str>) -> Vec<&'a R> {
        let term = match (&self.search, supplied) {
            (SearchOwnership::SelfOwned(term), _) => term.as_str(),
            (SearchOwnership::External, Some(term)) => term,
            (SearchOwnership::External, None) => "",
        };
        let mut rows = filter_rows(records, term, self.schema.search_keys());
        sort_rows(&mut rows, &self.sort);
        rows
    }

    /// Render pipeline: resolve every (row, column) pair to its cell.
    pub fn render_rows(&self, rows: &[&R]) -> Vec<RenderedRow> {
        rows.iter()
            .enumerate()
            .map(|(idx, record)| RenderedRow {
                key: record
                    .identity()
                    .map(RowKey::Identity)
                    .unwrap_or(RowKey::Index(idx)),
                cells: self
                    .schema
                    .columns
                    .iter()
                    .map(|column| render_cell(column, *record))
                    .collect(),
                interactive: self.on_activate.is_some(),
            })
            .collect()
    }

    /// Fire the activation callback for `record`, unless the activation
    /// originates from a control cell or no callback is set. Returns
    /// whether the callback fired.
    pub fn activate(&self, record: &R, origin_cell: Option<&CellContent>) -> bool {
        let Some(callback) = &self.on_activate else {
            return false;
        };
        if origin_cell.is_some_and(|cell| cell.is_control()) {
            return false;
        }
        callback(record);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: Option<String>,
        qty: Option<f64>,
        sku: Option<String>,
    }

    impl Item {
        fn new(name: Option<&str>, qty: Option<f64>, sku: Option<&str>) -> Self {
            Item {
                name: name.map(str::to_string),
                qty,
                sku: sku.map(str::to_string),
            }
        }
    }

    impl Record for Item {
        fn field(&self, key: &str) -> Value {
            match key {
                "name" => self.name.clone().into(),
                "qty" => self.qty.into(),
                "sku" => self.sku.clone().into(),
                _ => Value::Missing,
            }
        }
    }

    fn schema() -> Schema<Item> {
        Schema::new(vec![
            Column::new("name", "Name").sortable(),
            Column::new("qty", "Qty").sortable(),
            Column::new("sku", "SKU"),
        ])
        .unwrap()
    }

    fn scenario_records() -> Vec<Item> {
        vec![
            Item::new(Some("Beta"), Some(5.0), None),
            Item::new(Some("Alpha"), None, None),
            Item::new(Some("Gamma"), Some(5.0), None),
        ]
    }

    fn names(rows: &[&Item]) -> Vec<String> {
        rows.iter()
            .map(|i| i.name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn empty_and_whitespace_search_is_identity() {
        let records = scenario_records();
        let keys = schema().search_keys().to_vec();
        for term in ["", "   ", "\t"] {
            let rows = filter_rows(&records, term, &keys);
            assert_eq!(names(&rows), vec!["Beta", "Alpha", "Gamma"]);
        }
    }

    #[test]
    fn search_matches_case_insensitive_substring() {
        let records = scenario_records();
        let keys = schema().search_keys().to_vec();
        // Scenario B
        let rows = filter_rows(&records, "al", &keys);
        assert_eq!(names(&rows), vec!["Alpha"]);
        let rows = filter_rows(&records, "GAMMA", &keys);
        assert_eq!(names(&rows), vec!["Gamma"]);
        let rows = filter_rows(&records, "zzz", &keys);
        assert!(rows.is_empty());
    }

    #[test]
    fn search_matches_numbers_in_decimal_form() {
        let records = scenario_records();
        let keys = schema().search_keys().to_vec();
        let rows = filter_rows(&records, "5", &keys);
        assert_eq!(names(&rows), vec!["Beta", "Gamma"]);
    }

    #[test]
    fn missing_fields_never_match() {
        let records = vec![Item::new(Some("Solo"), None, None)];
        let keys = vec!["qty".to_string()];
        assert!(filter_rows(&records, "anything", &keys).is_empty());
    }

    #[test]
    fn sort_without_active_column_preserves_input_order() {
        let records = scenario_records();
        let mut rows: Vec<&Item> = records.iter().collect();
        sort_rows(&mut rows, &SortState::default());
        assert_eq!(names(&rows), vec!["Beta", "Alpha", "Gamma"]);
    }

    #[test]
    fn scenario_a_missing_sorts_last_ties_stable() {
        let records = scenario_records();
        let schema = schema();
        let mut sort = SortState::default();
        sort.toggle("qty", &schema);

        let mut rows: Vec<&Item> = records.iter().collect();
        sort_rows(&mut rows, &sort);
        assert_eq!(names(&rows), vec!["Beta", "Gamma", "Alpha"]);

        // Missing stays last on the descending pass as well.
        sort.toggle("qty", &schema);
        let mut rows: Vec<&Item> = records.iter().collect();
        sort_rows(&mut rows, &sort);
        assert_eq!(names(&rows), vec!["Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn scenario_c_non_sortable_column_is_a_noop() {
        let schema = schema();
        let mut sort = SortState::default();
        sort.toggle("name", &schema);
        let before = sort.clone();
        sort.toggle("sku", &schema);
        assert_eq!(sort, before);

        // Also from the initial state.
        let mut sort = SortState::default();
        sort.toggle("sku", &schema);
        assert_eq!(sort.active(), None);
    }

    #[test]
    fn scenario_d_toggle_flips_direction_and_keeps_ties_stable() {
        let records = vec![
            Item::new(Some("B"), Some(1.0), Some("first-b")),
            Item::new(Some("A"), Some(2.0), None),
            Item::new(Some("B"), Some(3.0), Some("second-b")),
        ];
        let schema = schema();
        let mut sort = SortState::default();

        sort.toggle("name", &schema);
        let mut rows: Vec<&Item> = records.iter().collect();
        sort_rows(&mut rows, &sort);
        assert_eq!(names(&rows), vec!["A", "B", "B"]);
        assert_eq!(rows[1].sku.as_deref(), Some("first-b"));
        assert_eq!(rows[2].sku.as_deref(), Some("second-b"));

        sort.toggle("name", &schema);
        assert_eq!(sort.direction(), SortDirection::Descending);
        let mut rows: Vec<&Item> = records.iter().collect();
        sort_rows(&mut rows, &sort);
        assert_eq!(names(&rows), vec!["B", "B", "A"]);
        // The two B records keep their mutual order in both passes.
        assert_eq!(rows[0].sku.as_deref(), Some("first-b"));
        assert_eq!(rows[1].sku.as_deref(), Some("second-b"));
    }

    #[test]
    fn descending_reverses_non_tied_elements() {
        let records = vec![
            Item::new(Some("Carol"), Some(3.0), None),
            Item::new(Some("Alice"), Some(1.0), None),
            Item::new(Some("Bob"), Some(2.0), None),
        ];
        let schema = schema();
        let mut sort = SortState::default();
        sort.toggle("qty", &schema);

        let mut asc: Vec<&Item> = records.iter().collect();
        sort_rows(&mut asc, &sort);
        sort.toggle("qty", &schema);
        let mut desc: Vec<&Item> = records.iter().collect();
        sort_rows(&mut desc, &sort);

        let mut reversed = asc.clone();
        reversed.reverse();
        assert_eq!(names(&desc), names(&reversed));
    }

    #[test]
    fn textual_sort_is_case_insensitive() {
        let records = vec![
            Item::new(Some("banana"), None, None),
            Item::new(Some("Apple"), None, None),
            Item::new(Some("cherry"), None, None),
        ];
        let schema = schema();
        let mut sort = SortState::default();
        sort.toggle("name", &schema);
        let mut rows: Vec<&Item> = records.iter().collect();
        sort_rows(&mut rows, &sort);
        assert_eq!(names(&rows), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn derivation_is_idempotent() {
        let records = scenario_records();
        let mut controller = TableController::new(schema());
        controller.set_search("a");
        controller.toggle_sort("qty");
        let first = names(&controller.derive(&records, None));
        let second = names(&controller.derive(&records, None));
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_column_keys_are_rejected() {
        let result = Schema::new(vec![
            Column::<Item>::new("name", "Name"),
            Column::<Item>::new("name", "Also name"),
        ]);
        assert!(matches!(result, Err(OpsError::DuplicateColumn(key)) if key == "name"));
    }

    #[test]
    fn search_keys_can_be_overridden() {
        let records = scenario_records();
        let schema = schema().with_search_keys(["qty"]);
        let rows = filter_rows(&records, "alpha", schema.search_keys());
        assert!(rows.is_empty());
    }

    #[test]
    fn controlled_mode_ignores_internal_mutation_and_uses_supplied_term() {
        let records = scenario_records();
        let mut controller = TableController::controlled(schema());
        controller.set_search("beta");
        assert_eq!(controller.search_term(), "");

        let rows = controller.derive(&records, Some("al"));
        assert_eq!(names(&rows), vec!["Alpha"]);
        // Without a supplied term the full collection passes through.
        let rows = controller.derive(&records, None);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn default_render_coerces_values_and_blanks_missing() {
        let records = vec![Item::new(Some("Beta"), Some(5.0), None)];
        let controller = TableController::new(schema());
        let rows = controller.derive(&records, None);
        let rendered = controller.render_rows(&rows);
        let texts: Vec<String> = rendered[0].cells.iter().map(|c| c.plain_text()).collect();
        assert_eq!(texts, vec!["Beta", "5", ""]);
        assert_eq!(rendered[0].key, RowKey::Index(0));
        assert!(!rendered[0].interactive);
    }

    #[test]
    fn custom_render_receives_value_and_record() {
        let schema = Schema::new(vec![Column::new("qty", "Qty").render(
            |value: &Value, item: &Item| {
                CellContent::text(format!(
                    "{} x {}",
                    item.name.clone().unwrap_or_default(),
                    value.display()
                ))
            },
        )])
        .unwrap();
        let records = vec![Item::new(Some("Beta"), Some(5.0), None)];
        let controller = TableController::new(schema);
        let rows = controller.derive(&records, None);
        let rendered = controller.render_rows(&rows);
        assert_eq!(rendered[0].cells[0].plain_text(), "Beta x 5");
    }

    #[test]
    fn panicking_render_is_isolated_to_its_cell() {
        let schema = Schema::new(vec![
            Column::new("name", "Name"),
            Column::new("qty", "Qty").render(|value: &Value, _: &Item| {
                if value.is_missing() {
                    panic!("bad record");
                }
                CellContent::text(value.display())
            }),
        ])
        .unwrap();
        let records = vec![
            Item::new(Some("Good"), Some(1.0), None),
            Item::new(Some("Bad"), None, None),
        ];
        let controller = TableController::new(schema);
        let rows = controller.derive(&records, None);
        let rendered = controller.render_rows(&rows);
        assert_eq!(rendered[0].cells[1].plain_text(), "1");
        assert_eq!(rendered[1].cells[0].plain_text(), "Bad");
        assert_eq!(rendered[1].cells[1].plain_text(), "");
    }

    #[test]
    fn activation_fires_callback_with_record() {
        let seen: Rc<RefCell<Vec<Item>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let controller =
            TableController::new(schema()).on_activate(move |item: &Item| {
                sink.borrow_mut().push(item.clone());
            });
        let records = scenario_records();
        let rows = controller.derive(&records, None);
        let rendered = controller.render_rows(&rows);
        assert!(rendered[0].interactive);

        assert!(controller.activate(rows[1], None));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].name.as_deref(), Some("Alpha"));
    }

    #[test]
    fn activation_from_control_cell_does_not_fire() {
        let fired = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&fired);
        let controller = TableController::new(schema()).on_activate(move |_: &Item| {
            *sink.borrow_mut() += 1;
        });
        let records = scenario_records();
        let rows = controller.derive(&records, None);

        let menu = CellContent::control(Line::from("⋯"));
        assert!(!controller.activate(rows[0], Some(&menu)));
        let plain = CellContent::text("Beta");
        assert!(controller.activate(rows[0], Some(&plain)));
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn activation_without_callback_is_inert() {
        let controller = TableController::new(schema());
        let records = scenario_records();
        let rows = controller.derive(&records, None);
        assert!(!controller.activate(rows[0], None));
    }

    #[test]
    fn tolerant_read_of_unknown_key() {
        let item = Item::new(Some("Beta"), Some(5.0), None);
        assert!(item.field("no_such_field").is_missing());
        assert_eq!(Value::Missing.display(), "");
    }
}
