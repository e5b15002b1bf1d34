use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use oxo::{Action, Game, Mark, Mode, Session, Status};
use sodium as na;
use tui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame, Terminal,
};

const AUTO_MOVE_DELAY: Duration = Duration::from_millis(500);
const TICK: Duration = Duration::from_millis(50);

fn main() -> io::Result<()> {
    let ctx = na::SodiumCtx::new();

    let (actions, game) = ctx.transaction(|| {
        let actions: na::StreamSink<Action> = ctx.new_stream_sink();
        let session = Session::new(&ctx, &actions.stream(), Mode::HumanVsAuto);
        (actions, session.game)
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let ui = Ui { game: game.clone() };
    let mut mode = Mode::HumanVsAuto;
    let mut rng = rand::thread_rng();
    let mut auto_due: Option<Instant> = None;

    loop {
        terminal.draw(|f| ui.draw(f))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('r') => actions.send(Action::Restart(mode)),
                    KeyCode::Char('m') => {
                        mode = match mode {
                            Mode::HumanVsHuman => Mode::HumanVsAuto,
                            Mode::HumanVsAuto => Mode::HumanVsHuman,
                        };
                        actions.send(Action::Restart(mode));
                    }
                    KeyCode::Char(c @ '1'..='9') => {
                        actions.send(Action::Place((c as u8 - b'1') as usize))
                    }
                    _ => {}
                },
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(index) = square_at(terminal.size()?, mouse.column, mouse.row) {
                        actions.send(Action::Place(index));
                    }
                }
                _ => {}
            }
        }

        // The automated reply runs on a deadline rather than a sleep so a
        // restart or mode switch during the pause cancels it; awaiting_auto
        // is checked again at the moment the deadline fires.
        if game.sample().awaiting_auto() {
            if auto_due.is_none() {
                auto_due = Some(Instant::now() + AUTO_MOVE_DELAY);
            }
        } else {
            auto_due = None;
        }
        if let Some(due) = auto_due {
            if Instant::now() >= due {
                auto_due = None;
                let current = game.sample();
                if current.awaiting_auto() {
                    if let Ok(index) = current.auto_move(&mut rng) {
                        actions.send(Action::Place(index));
                    }
                }
            }
        }
    }

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

struct Ui {
    game: na::Cell<Game>,
}

impl Ui {
    fn draw<B: Backend>(&self, f: &mut Frame<B>) {
        let game = self.game.sample();
        let chunks = panels(f.size());

        let block = Block::default().title("Board").borders(Borders::ALL);
        self.draw_board(f, block.inner(chunks[0]), &game);
        f.render_widget(block, chunks[0]);

        let block = Block::default().title("Game").borders(Borders::ALL);
        let inner = block.inner(chunks[1]);
        f.render_widget(block, chunks[1]);
        self.draw_info(f, inner, &game);
    }

    fn draw_board<B: Backend>(&self, f: &mut Frame<B>, area: Rect, game: &Game) {
        let winning_line = match game.status() {
            Status::Won { line, .. } => Some(line),
            _ => None,
        };

        for (index, chunk) in board_squares(area).into_iter().enumerate() {
            let style = match winning_line {
                Some(line) if line.contains(&index) => Style::default().fg(Color::Green),
                _ => Style::default(),
            };
            let block = Block::default().borders(square_borders(index));
            f.render_widget(
                RenderMark {
                    mark: game.square(index).unwrap_or(None),
                    style,
                },
                block.inner(chunk),
            );
            f.render_widget(block, chunk);
        }
    }

    fn draw_info<B: Backend>(&self, f: &mut Frame<B>, area: Rect, game: &Game) {
        let mode = match game.mode() {
            Mode::HumanVsHuman => "two players",
            Mode::HumanVsAuto => "vs computer",
        };
        let status = match game.status() {
            Status::Active => format!("{:?}'s turn", game.turn()),
            Status::Won { mark, .. } => format!("{:?} wins!", mark),
            Status::Draw => "It's a draw!".to_string(),
        };

        let text = vec![
            Spans::from(Span::styled(
                status,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Spans::from(format!("mode: {}", mode)),
            Spans::from(""),
            Spans::from("1-9 or click: mark"),
            Spans::from("m: switch mode"),
            Spans::from("r: restart"),
            Spans::from("q: quit"),
        ];
        f.render_widget(Paragraph::new(text), area);
    }
}

fn panels(frame: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .margin(2)
        .constraints([Constraint::Percentage(80), Constraint::Percentage(20)].as_ref())
        .split(frame)
}

// Square rects indexed by board index, numpad orientation: squares 7-8-9
// (indices 6-8) across the top row, 1-2-3 along the bottom.
fn board_squares(area: Rect) -> [Rect; 9] {
    let thirds = [
        Constraint::Percentage(5),
        Constraint::Percentage(29),
        Constraint::Percentage(34),
        Constraint::Percentage(30),
        Constraint::Percentage(5),
    ];
    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(thirds.as_ref())
        .split(area);

    let mut rows = Vec::new();
    for vchunk in &vchunks[1..4] {
        let hchunks = Layout::default()
            .direction(Direction::Horizontal)
            .horizontal_margin(3)
            .constraints(thirds.as_ref())
            .split(*vchunk);
        rows.push([hchunks[1], hchunks[2], hchunks[3]]);
    }

    [
        rows[2][0], rows[2][1], rows[2][2],
        rows[1][0], rows[1][1], rows[1][2],
        rows[0][0], rows[0][1], rows[0][2],
    ]
}

fn square_borders(index: usize) -> Borders {
    match index {
        6 => Borders::RIGHT | Borders::BOTTOM,
        7 => Borders::ALL ^ Borders::TOP,
        8 => Borders::LEFT | Borders::BOTTOM,
        3 => Borders::ALL ^ Borders::LEFT,
        4 => Borders::ALL,
        5 => Borders::ALL ^ Borders::RIGHT,
        0 => Borders::RIGHT | Borders::TOP,
        1 => Borders::ALL ^ Borders::BOTTOM,
        2 => Borders::LEFT | Borders::TOP,
        _ => Borders::NONE,
    }
}

fn square_at(frame: Rect, column: u16, row: u16) -> Option<usize> {
    let board = Block::default().borders(Borders::ALL).inner(panels(frame)[0]);
    board_squares(board).iter().position(|rect| {
        column >= rect.x
            && column < rect.x + rect.width
            && row >= rect.y
            && row < rect.y + rect.height
    })
}

struct RenderMark {
    mark: Option<Mark>,
    style: Style,
}

impl Widget for RenderMark {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(mark) = self.mark {
            match mark {
                Mark::X => render_x(area, buf, self.style),
                Mark::O => render_o(area, buf, self.style),
            }
        }
    }
}

fn render_x(area: Rect, buf: &mut Buffer, style: Style) {
    const LEFT: &str = "\\@\\";
    const RIGHT: &str = "/@/";

    if area.width < 6 || area.height == 0 {
        return;
    }

    // In theory this should be the number of characters to go over for each line
    // -2 because the line is 3 characters wide
    let inv_slope = area.width.div_euclid(area.height);
    for y in 0..area.height {
        let x_left = (area.width - 5).saturating_sub(y * inv_slope);
        buf.set_string(area.x + x_left, area.y + y, RIGHT, style);

        let x_right = y * inv_slope;
        buf.set_string(area.x + x_right, area.y + y, LEFT, style);
    }
}

fn render_o(area: Rect, buf: &mut Buffer, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let x_offset;
    let y_offset;
    if area.width >= area.height {
        x_offset = (area.width - area.height).div_euclid(2);
        y_offset = 0;
    } else {
        x_offset = 0;
        y_offset = (area.height - area.width).div_euclid(2);
    }

    let diameter = area.width.min(area.height);
    let radius = diameter.div_euclid(2);
    if radius == 0 {
        return;
    }
    let center_x = (area.x + radius + x_offset) as i32;
    let center_y = (area.y + radius + y_offset) as i32;

    let radius = radius as f32;
    let min_angle = (1.0 - 1.0 / radius).acos().to_radians();

    let mut angle = 0.0;
    while angle < std::f32::consts::PI {
        let (sin, cos) = angle.sin_cos();
        let x_offset = (radius * cos) as i32;
        let y_offset = (radius * sin) as i32;

        let x = (center_x + x_offset) as u16;
        buf.get_mut(x, (center_y + y_offset) as u16)
            .set_char('@')
            .set_style(style);
        buf.get_mut(x, (center_y - y_offset) as u16)
            .set_char('@')
            .set_style(style);
        angle += min_angle;
    }
}
