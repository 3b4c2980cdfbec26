use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::{self, stdout};

use twenty48::game::{Direction, Game, GameState};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: usize = 7;
const EMPTY_CELL: &str = "   ·   ";

// ============================================================================
// Color Mapping
// ============================================================================

fn tile_color(value: u32) -> Color {
    match value {
        2 | 4 => Color::Rgb(238, 228, 218),
        8 => Color::Rgb(242, 177, 121),
        16 => Color::Rgb(245, 149, 99),
        32 => Color::Rgb(246, 124, 96),
        64 => Color::Rgb(246, 94, 59),
        128 => Color::Rgb(237, 207, 115),
        256 => Color::Rgb(237, 204, 98),
        512 => Color::Rgb(237, 200, 80),
        1024 => Color::Rgb(237, 197, 63),
        2048 => Color::Rgb(237, 194, 45),
        _ => Color::White,
    }
}

// ============================================================================
// Input Mapping
// ============================================================================

fn direction_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Left
        | KeyCode::Char('a')
        | KeyCode::Char('A')
        | KeyCode::Char('h')
        | KeyCode::Char('H') => Some(Direction::Left),
        KeyCode::Up
        | KeyCode::Char('w')
        | KeyCode::Char('W')
        | KeyCode::Char('k')
        | KeyCode::Char('K') => Some(Direction::Up),
        KeyCode::Right
        | KeyCode::Char('d')
        | KeyCode::Char('D')
        | KeyCode::Char('l')
        | KeyCode::Char('L') => Some(Direction::Right),
        KeyCode::Down
        | KeyCode::Char('s')
        | KeyCode::Char('S')
        | KeyCode::Char('j')
        | KeyCode::Char('J') => Some(Direction::Down),
        _ => None,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    match game.state {
        GameState::Playing => render_game(frame, game, area),
        GameState::GameOver => render_game_over(frame, game, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    // Calculate dimensions
    let board_width = (game.field_size * CELL_WIDTH) as u16 + 2;
    let board_height = game.field_size as u16 + 2;
    let info_width = 12;
    let total_width = board_width + info_width + 2;
    let total_height = board_height + 3;

    // Center everything
    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(board_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let board_row = vertical[0];

    // Layout: [Board][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(board_width),
        Constraint::Length(info_width),
    ])
    .split(board_row);

    render_board(frame, game, horizontal[0]);
    render_info(frame, game, horizontal[1]);

    // Render controls hint below
    let controls_area = Rect {
        x: area.x,
        y: board_row.y + board_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "Arrows/WASD/HJKL: Slide | R: Restart | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_board(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 2048 ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    for row in game.grid.rows() {
        let mut spans: Vec<Span> = Vec::new();

        for &value in row {
            let (text, style) = if value == 0 {
                (EMPTY_CELL.to_string(), Style::default().fg(Color::DarkGray))
            } else {
                (
                    format!("{:^width$}", value, width = CELL_WIDTH),
                    Style::default().fg(tile_color(value)),
                )
            };

            spans.push(Span::styled(text, style));
        }

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Moves", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.moves)),
        Line::from(""),
        Line::from(Span::styled("Best", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.grid.max_value())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    // First render the board in background
    render_game(frame, game, area);

    // Then overlay game over popup
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Moves: {}", game.moves)),
        Line::from(format!("Best: {}", game.grid.max_value())),
        Line::from(""),
        Line::from(Span::styled(
            "Press R to restart",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 12, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    // Create game
    let mut game = Game::new();

    // Main loop: the game is turn-based, so block until the next key
    loop {
        terminal.draw(|frame| render(frame, &game))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    // Always allow quit
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                    // Always allow restart
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        game.restart();
                    }
                    // Only process moves while playing
                    _ if game.state == GameState::Playing => {
                        if let Some(direction) = direction_for_key(key.code) {
                            game.make_turn(direction);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
