use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Flex, Layout, Margin, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, BorderType, Cell, Clear, HighlightSpacing, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Table, TableState,
    },
};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

use crate::config::{INFO_TEXT, ITEM_HEIGHT, NOTICE_DURATION_MS, PALETTES, POLL_DURATION_MS};
use crate::data::format::{format_currency_2dp, format_percent};
use crate::data::{Coin, SortOption, Statistic};
use crate::pipeline::PipelineHandle;
use crate::ui::TableColors;

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListTab {
    Live,
    Portfolio,
}

enum Popup {
    Search,
    EditHolding { coin_id: String, name: String },
}

pub struct TuiApp {
    handle: PipelineHandle,
    all_coins_rx: watch::Receiver<Vec<Coin>>,
    portfolio_rx: watch::Receiver<Vec<Coin>>,
    statistics_rx: watch::Receiver<Vec<Statistic>>,
    loading_rx: watch::Receiver<bool>,
    feedback_rx: mpsc::UnboundedReceiver<()>,
    all_coins: Vec<Coin>,
    portfolio_coins: Vec<Coin>,
    statistics: Vec<Statistic>,
    is_loading: bool,
    state: TableState,
    scroll_state: ScrollbarState,
    colors: TableColors,
    color_index: usize,
    tab: ListTab,
    sort_option: SortOption,
    search_text: String,
    popup: Option<Popup>,
    popup_message: String,
    notice: Option<(String, Instant)>,
}

impl TuiApp {
    pub fn new(handle: PipelineHandle, feedback_rx: mpsc::UnboundedReceiver<()>) -> Self {
        Self {
            all_coins_rx: handle.all_coins(),
            portfolio_rx: handle.portfolio_coins(),
            statistics_rx: handle.statistics(),
            loading_rx: handle.is_loading(),
            handle,
            feedback_rx,
            all_coins: Vec::new(),
            portfolio_coins: Vec::new(),
            statistics: Vec::new(),
            is_loading: false,
            state: TableState::default().with_selected(0),
            scroll_state: ScrollbarState::new(0),
            colors: TableColors::new(&PALETTES[0]),
            color_index: 0,
            tab: ListTab::Live,
            sort_option: SortOption::default(),
            search_text: String::new(),
            popup: None,
            popup_message: String::new(),
            notice: None,
        }
    }

    fn rows(&self) -> &[Coin] {
        match self.tab {
            ListTab::Live => &self.all_coins,
            ListTab::Portfolio => &self.portfolio_coins,
        }
    }

    fn selected_coin(&self) -> Option<&Coin> {
        self.state.selected().and_then(|i| self.rows().get(i))
    }

    fn drain_updates(&mut self) {
        let mut rows_changed = false;
        if self.all_coins_rx.has_changed().unwrap_or(false) {
            self.all_coins = self.all_coins_rx.borrow_and_update().clone();
            rows_changed = true;
        }
        if self.portfolio_rx.has_changed().unwrap_or(false) {
            self.portfolio_coins = self.portfolio_rx.borrow_and_update().clone();
            rows_changed = true;
        }
        if self.statistics_rx.has_changed().unwrap_or(false) {
            self.statistics = self.statistics_rx.borrow_and_update().clone();
        }
        if self.loading_rx.has_changed().unwrap_or(false) {
            self.is_loading = *self.loading_rx.borrow_and_update();
        }
        while self.feedback_rx.try_recv().is_ok() {
            self.show_notice("Reloaded");
        }
        if rows_changed {
            self.clamp_selection();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        let selected = match self.state.selected() {
            _ if len == 0 => 0,
            Some(i) => i.min(len - 1),
            None => 0,
        };
        self.state.select(Some(selected));
        self.scroll_state = self
            .scroll_state
            .content_length(len.saturating_sub(1) * ITEM_HEIGHT)
            .position(selected * ITEM_HEIGHT);
    }

    fn next_row(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i * ITEM_HEIGHT);
    }

    fn previous_row(&mut self) {
        let i = match self.state.selected() {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i * ITEM_HEIGHT);
    }

    fn next_color(&mut self) {
        self.color_index = (self.color_index + 1) % PALETTES.len();
    }

    fn previous_color(&mut self) {
        let count = PALETTES.len();
        self.color_index = (self.color_index + count - 1) % count;
    }

    fn set_colors(&mut self) {
        self.colors = TableColors::new(&PALETTES[self.color_index]);
    }

    fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            ListTab::Live => ListTab::Portfolio,
            ListTab::Portfolio => ListTab::Live,
        };
        self.state.select(Some(0));
        self.clamp_selection();
    }

    fn change_sort(&mut self, option: SortOption) {
        self.sort_option = option;
        self.handle.set_sort_option(option);
    }

    fn open_search(&mut self) {
        self.popup_message = self.search_text.clone();
        self.popup = Some(Popup::Search);
    }

    fn open_edit_holding(&mut self) {
        let Some(coin) = self.selected_coin() else {
            return;
        };
        let coin_id = coin.id.clone();
        let name = coin.name.clone();
        // prefer the portfolio copy, the live list carries no holdings
        let held = self
            .portfolio_coins
            .iter()
            .find(|c| c.id == coin_id)
            .and_then(|c| c.current_holdings);
        self.popup_message = held.map(|amount| amount.to_string()).unwrap_or_default();
        self.popup = Some(Popup::EditHolding { coin_id, name });
    }

    fn update_search(&mut self) {
        self.search_text = self.popup_message.clone();
        self.handle.set_search_text(self.search_text.clone());
    }

    fn submit_holding(&mut self, coin_id: String) {
        match self.popup_message.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => {
                self.handle.set_holding(coin_id, amount);
            }
            _ => self.show_notice("Invalid amount"),
        }
        self.popup_message.clear();
    }

    fn show_notice(&mut self, message: &str) {
        self.notice = Some((message.to_string(), Instant::now()));
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        loop {
            self.drain_updates();

            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(POLL_DURATION_MS))? {
                // Drain ALL events, not just one
                while event::poll(Duration::from_millis(0))? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key.code, key.modifiers) {
                                return Ok(());
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match self.popup.take() {
            None => {
                let shift = modifiers.contains(KeyModifiers::SHIFT);
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => return true,
                    KeyCode::Char('j') | KeyCode::Down => self.next_row(),
                    KeyCode::Char('k') | KeyCode::Up => self.previous_row(),
                    KeyCode::Char('l') | KeyCode::Right if shift => self.next_color(),
                    KeyCode::Char('h') | KeyCode::Left if shift => self.previous_color(),
                    KeyCode::Tab => self.toggle_tab(),
                    KeyCode::Char('1') => self.change_sort(self.sort_option.toggled_rank()),
                    KeyCode::Char('2') => self.change_sort(self.sort_option.toggled_holdings()),
                    KeyCode::Char('3') => self.change_sort(self.sort_option.toggled_price()),
                    KeyCode::Char('r') => self.handle.reload(),
                    KeyCode::Char('/') => self.open_search(),
                    KeyCode::Char('e') => self.open_edit_holding(),
                    _ => {}
                }
            }
            Some(Popup::Search) => match code {
                KeyCode::Enter | KeyCode::Esc => self.popup_message.clear(),
                KeyCode::Backspace => {
                    let _ = self.popup_message.pop();
                    self.update_search();
                    self.popup = Some(Popup::Search);
                }
                KeyCode::Char(c) => {
                    self.popup_message.push(c);
                    self.update_search();
                    self.popup = Some(Popup::Search);
                }
                _ => self.popup = Some(Popup::Search),
            },
            Some(Popup::EditHolding { coin_id, name }) => match code {
                KeyCode::Esc => self.popup_message.clear(),
                KeyCode::Enter => self.submit_holding(coin_id),
                KeyCode::Backspace => {
                    let _ = self.popup_message.pop();
                    self.popup = Some(Popup::EditHolding { coin_id, name });
                }
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    self.popup_message.push(c);
                    self.popup = Some(Popup::EditHolding { coin_id, name });
                }
                _ => self.popup = Some(Popup::EditHolding { coin_id, name }),
            },
        }
        false
    }

    fn draw(&mut self, frame: &mut Frame) {
        let vertical = &Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(5),
        ]);
        let rects = vertical.split(frame.area());
        self.set_colors();
        self.render_statistics(frame, rects[0]);
        self.render_table(frame, rects[1]);
        self.render_scrollbar(frame, rects[1]);
        self.render_footer(frame, rects[2]);
        match &self.popup {
            Some(Popup::Search) => self.render_popup(frame, "Search", 60),
            Some(Popup::EditHolding { name, .. }) => {
                let title = format!("Amount of {} (0 removes)", name);
                self.render_popup(frame, &title, 60);
            }
            None => {}
        }
        let expired = self
            .notice
            .as_ref()
            .is_some_and(|(_, shown_at)| shown_at.elapsed() > Duration::from_millis(NOTICE_DURATION_MS));
        if expired {
            self.notice = None;
        }
        if let Some((message, _)) = &self.notice {
            self.render_notice(frame, message);
        }
    }

    fn render_statistics(&self, frame: &mut Frame, area: Rect) {
        if self.statistics.is_empty() {
            let waiting = Paragraph::new("Waiting for market data...")
                .alignment(Alignment::Center)
                .block(Block::bordered())
                .style(Style::new().fg(self.colors.row_fg).bg(self.colors.buffer_bg));
            frame.render_widget(waiting, area);
            return;
        }

        let constraints = vec![Constraint::Fill(1); self.statistics.len()];
        let tiles = Layout::horizontal(constraints).split(area);
        for (stat, tile) in self.statistics.iter().zip(tiles.iter()) {
            let mut line = vec![Span::raw(stat.display_value.clone()).bold()];
            if let Some(change) = stat.percentage_change {
                line.push(Span::raw(" "));
                line.push(
                    Span::raw(format_percent(change))
                        .style(Style::new().fg(self.colors.change_color(Some(change)))),
                );
            }
            let paragraph = Paragraph::new(Line::from(line))
                .alignment(Alignment::Center)
                .block(Block::bordered().title(stat.title.clone()))
                .style(Style::new().fg(self.colors.row_fg).bg(self.colors.buffer_bg));
            frame.render_widget(paragraph, *tile);
        }
    }

    fn popup_area(&self, area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
        let [area] = vertical.areas(area);
        let [area] = horizontal.areas(area);
        area
    }

    fn render_popup(&self, frame: &mut Frame, title: &str, percent_x: u16) {
        let area = self.popup_area(frame.area(), percent_x, 20);
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(self.popup_message.as_str())
            .block(Block::bordered().title(title.to_string()))
            .style(Style::default())
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_notice(&self, frame: &mut Frame, message: &str) {
        let area = self.popup_area(frame.area(), 30, 15);
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(message.to_string())
            .block(Block::bordered().border_type(BorderType::Rounded))
            .style(Style::default())
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let header_style = Style::default()
            .fg(self.colors.header_fg)
            .bg(self.colors.header_bg);
        let selected_row_style = Style::default()
            .add_modifier(Modifier::REVERSED)
            .fg(self.colors.selected_row_style_fg);

        let titles: &[&str] = match self.tab {
            ListTab::Live => &["#", "Coin", "Price", "24h"],
            ListTab::Portfolio => &["#", "Coin", "Holdings", "Value", "24h"],
        };
        let header: Row<'_> = titles
            .iter()
            .copied()
            .map(Cell::from)
            .collect::<Row>()
            .style(header_style);

        let rows = self.rows().iter().enumerate().map(|(i, c)| {
            let bg = if i % 2 == 0 {
                self.colors.normal_row_color
            } else {
                self.colors.alt_row_color
            };
            let change_color = self.colors.change_color(c.price_change_percentage_24h);
            let change = c
                .price_change_percentage_24h
                .map(format_percent)
                .unwrap_or_else(|| "-".to_string());

            let mut cells = vec![
                Cell::from(rank_display(c.rank)),
                Cell::from(format!("{} ({})", c.name, c.symbol.to_uppercase())),
            ];
            match self.tab {
                ListTab::Live => cells.push(Cell::from(price_display(c.current_price))),
                ListTab::Portfolio => {
                    cells.push(Cell::from(format!(
                        "{} {}",
                        c.current_holdings.unwrap_or(0.0),
                        c.symbol.to_uppercase()
                    )));
                    cells.push(Cell::from(format_currency_2dp(c.holdings_value())));
                }
            }
            cells.push(Cell::from(change).style(Style::new().fg(change_color)));

            Row::new(cells).style(Style::new().fg(self.colors.row_fg).bg(bg))
        });

        let widths = vec![Constraint::Fill(1); titles.len()];
        let title = match self.tab {
            ListTab::Live => " Live prices ",
            ListTab::Portfolio => " Portfolio ",
        };
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(title))
            .row_highlight_style(selected_row_style)
            .highlight_spacing(HighlightSpacing::Always)
            .bg(self.colors.buffer_bg);

        frame.render_stateful_widget(table, area, &mut self.state);
    }

    fn render_scrollbar(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_stateful_widget(
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.scroll_state,
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let mut status = format!("Sort: {}", self.sort_option.label());
        if !self.search_text.is_empty() {
            status.push_str(&format!(" | Search: {}", self.search_text));
        }
        if self.is_loading {
            status.push_str(" | Loading...");
        }

        let mut lines: Vec<Line> = INFO_TEXT.iter().map(|text| Line::from(*text)).collect();
        lines.push(Line::from(status));

        let info_footer = Paragraph::new(Text::from(lines))
            .style(
                Style::new()
                    .fg(self.colors.row_fg)
                    .bg(self.colors.buffer_bg),
            )
            .centered()
            .block(
                Block::bordered()
                    .border_type(BorderType::Double)
                    .border_style(Style::new().fg(self.colors.footer_border_color)),
            );
        frame.render_widget(info_footer, area);
    }
}

fn rank_display(rank: u32) -> String {
    if rank == u32::MAX {
        "-".to_string()
    } else {
        rank.to_string()
    }
}

/// Sub-dollar prices keep six decimals so small caps stay readable.
fn price_display(price: f64) -> String {
    if price.abs() < 1.0 {
        format!("${:.6}", price)
    } else {
        format_currency_2dp(price)
    }
}
