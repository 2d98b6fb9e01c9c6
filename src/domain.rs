use std::io::Error;
use std::path::PathBuf;

use clap::ValueEnum;
use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

// Crate wide error type. Store and schema failures are fatal at startup,
// everything after that is handled inside the model.
#[derive(Debug)]
pub enum OpsError {
    IoError(Error),
    ParseError(serde_json::Error),
    DuplicateColumn(String),
    LoadingFailed(String),
    PermissionDenied(PathBuf),
}

impl From<Error> for OpsError {
    fn from(err: Error) -> Self {
        OpsError::IoError(err)
    }
}

impl From<serde_json::Error> for OpsError {
    fn from(err: serde_json::Error) -> Self {
        OpsError::ParseError(err)
    }
}

/// User role supplied at startup. Used for column and page gating only, the
/// console performs no authentication itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Admin,
    Secretary,
    Sales,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Secretary => "Secretary",
            Role::Sales => "Sales",
        }
    }
}

#[derive(Debug, Clone, Setters)]
pub struct OpsConfig {
    /// Event poll timeout in milliseconds
    pub event_poll_time: u64,
    /// Directory holding the per entity record files
    pub data_dir: String,
    /// Products with less stock than this count as low stock
    pub low_stock_threshold: f64,
}

impl Default for OpsConfig {
    fn default() -> Self {
        OpsConfig {
            event_poll_time: 100,
            data_dir: "tests/fixtures".to_string(),
            low_stock_threshold: 10.0,
        }
    }
}

// Messages are dispatched by the model depending on the active modus,
// the same key can mean different things in different views.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    NextColumn,
    PrevColumn,
    ToggleSort,
    Activate,
    EnterSearch,
    ClearSearch,
    CycleFilter,
    CopyRow,
    NextPage,
    PrevPage,
    ToggleSidebar,
    Help,
    Exit,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "
 opsview - business operations console

 Navigation
   j / Down      move selection down
   k / Up        move selection up
   h / Left      previous column
   l / Right     next column
   PgUp / PgDn   move one screen
   g / G         first / last row
   [ / ]         previous / next page
   Tab           focus the sidebar
   Enter         open the selected record

 Table
   /             search the current page
   c             clear the search
   s             sort by the current column (again to flip)
   f             cycle the page filter
   y             copy the selected row (CSV)

 Other
   ?             this help
   Esc           close / back
   q             quit
";
