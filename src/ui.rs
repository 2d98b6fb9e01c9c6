//! Terminal rendering. The draw path is a pure function of the model's
//! `UIData` snapshot plus the table selection state ratatui keeps.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState};

use crate::domain::HELP_TEXT;
use crate::model::{Model, UIData};

const SIDEBAR_WIDTH: u16 = 22;

pub struct UI {
    table_state: TableState,
}

impl UI {
    pub fn new() -> Self {
        UI {
            table_state: TableState::default(),
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let data = model.ui_data();

        let [sidebar_area, main_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
                .areas(frame.area());
        let [table_area, search_area, status_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(main_area);

        self.draw_sidebar(&data, sidebar_area, frame);
        self.draw_table(&data, table_area, frame);
        self.draw_search_line(&data, search_area, frame);
        self.draw_status_line(&data, status_area, frame);

        if let Some(detail) = &data.detail {
            let area = popup_area(frame.area(), 60, 70);
            frame.render_widget(Clear, area);
            let lines: Vec<Line> = detail
                .fields
                .iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::from(format!("{label:>16}  ")).dim(),
                        Span::from(value.clone()),
                    ])
                })
                .collect();
            let block = Block::bordered().title(format!(" {} ", detail.title));
            frame.render_widget(
                Paragraph::new(lines)
                    .block(block)
                    .scroll((data.detail_scroll as u16, 0)),
                area,
            );
        }

        if data.show_help {
            let area = popup_area(frame.area(), 60, 80);
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(HELP_TEXT).block(Block::bordered().title(" Help ")),
                area,
            );
        }
    }

    fn draw_table(&mut self, data: &UIData, area: Rect, frame: &mut Frame) {
        let header = Row::new(data.table.headers.iter().map(|h| {
            let mut text = h.label.clone();
            if let Some(direction) = h.sort {
                text = format!("{text} {}", direction.indicator());
            }
            let mut style = Style::new().bold();
            if h.selected {
                style = style.add_modifier(Modifier::REVERSED);
            } else if !h.sortable {
                style = Style::new().dim();
            }
            Cell::from(text).style(style)
        }));

        let rows = data
            .table
            .rows
            .iter()
            .map(|cells| Row::new(cells.iter().cloned().map(Cell::from)));
        let widths = data
            .table
            .widths
            .iter()
            .map(|&w| Constraint::Length(w));

        let block = Block::bordered().title(format!(" {} ", data.page_title));
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::new().reversed());

        self.table_state.select(data.table.selected);
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_sidebar(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        let lines: Vec<Line> = data
            .sidebar_rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut text = String::new();
                if row.indent {
                    text.push_str("   ");
                }
                if let Some(marker) = row.marker {
                    text.push_str(marker);
                    text.push(' ');
                }
                text.push_str(&row.label);

                let mut line = Line::from(text);
                if row.page == Some(data.current_page) {
                    line = line.bold();
                }
                if data.sidebar_focus && i == data.sidebar_cursor {
                    line = line.reversed();
                }
                line
            })
            .collect();

        let block = Block::bordered().title(" opsview ");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_search_line(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        if data.search_editing {
            let input = &data.search_input.input;
            frame.render_widget(Line::from(format!("/{input}")), area);
            let cursor_x = area.x + 1 + data.search_input.cursor_pos as u16;
            frame.set_cursor_position(Position::new(cursor_x.min(area.right()), area.y));
        } else if data.search_term.is_empty() {
            frame.render_widget(Line::from("/ to search".dim()), area);
        } else {
            frame.render_widget(
                Line::from(vec![
                    Span::from(format!("/{}", data.search_term)).yellow(),
                    Span::from(format!(
                        "  ({}/{} rows)",
                        data.table.filtered, data.table.total
                    ))
                    .dim(),
                ]),
                area,
            );
        }
    }

    fn draw_status_line(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        let left = Span::from(data.status_message.clone());
        let right = format!(
            " {} | {}/{} rows ",
            data.role.as_str(),
            data.table.filtered,
            data.table.total
        );
        let pad = (area.width as usize)
            .saturating_sub(data.status_message.chars().count() + right.chars().count());
        frame.render_widget(
            Line::from(vec![
                left,
                Span::from(" ".repeat(pad)),
                Span::from(right).dim(),
            ]),
            area,
        );
    }
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(ratatui::layout::Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(ratatui::layout::Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OpsConfig, Role};
    use crate::model::Model;
    use crate::store::Store;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn empty_store() -> Store {
        Store {
            products: Vec::new(),
            categories: Vec::new(),
            quotations: Vec::new(),
            sales_orders: Vec::new(),
            purchase_orders: Vec::new(),
            invoices: Vec::new(),
            customers: Vec::new(),
            suppliers: Vec::new(),
            sales_persons: Vec::new(),
        }
    }

    #[test]
    fn draws_an_empty_console() {
        let config = OpsConfig::default();
        let model = Model::init(empty_store(), &config, Role::Admin).unwrap();
        let mut ui = UI::new();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| ui.draw(&model, frame)).unwrap();

        let rendered = format!("{:?}", terminal.backend().buffer());
        assert!(rendered.contains("Products"));
        assert!(rendered.contains("Admin"));
    }

    #[test]
    fn popup_area_is_centered_and_contained() {
        let outer = Rect::new(0, 0, 100, 40);
        let popup = popup_area(outer, 60, 50);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 10);
    }
}
