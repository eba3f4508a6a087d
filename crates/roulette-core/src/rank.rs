//! Live ranking overlay.
//!
//! The list scrolls on its own: while nobody touches it, the view follows
//! the most recent finisher. A wheel scroll freezes the target for
//! `hold_ms`, after which auto-follow resumes. The rendered offset always
//! eases exponentially toward the target and snaps once close enough.

use std::ops::Range;
use std::rc::Rc;

use crate::color::Color;
use crate::config::RankScrollConfig;
use crate::geometry::Vec2;
use crate::params::RenderParameters;
use crate::surface::{CornerRadii, Surface, TextAlign, TextBaseline};
use crate::ui::{ClipboardSink, UiObject};

pub const COPIED_MESSAGE: &str = "The result has been copied";

const HEADER_X: f64 = 15.0;
/// Offset of row 0 below the top of the canvas.
const LIST_TOP: f64 = 48.0;
const ROW_X: f64 = 15.0;
const ROW_WIDTH: f64 = 220.0;
const ROW_GAP: f64 = 6.0;
const CORNER: f64 = 3.0;
const HUE_BAR: f64 = 6.0;
const RANK_BOX: f64 = 35.0;

/// Scroll offset state.
#[derive(Debug, Clone, PartialEq)]
pub struct RankScroll {
    cfg: RankScrollConfig,
    current_y: f64,
    target_y: f64,
    /// Remaining hold after a user scroll, in ms. Never negative.
    user_moved: f64,
    max_y: f64,
}

impl RankScroll {
    pub fn new(cfg: RankScrollConfig) -> Self {
        Self {
            cfg,
            current_y: 0.0,
            target_y: 0.0,
            user_moved: 0.0,
            max_y: 0.0,
        }
    }

    pub fn current_y(&self) -> f64 {
        self.current_y
    }

    pub fn target_y(&self) -> f64 {
        self.target_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn is_user_held(&self) -> bool {
        self.user_moved > 0.0
    }

    pub fn row_height(&self) -> f64 {
        self.cfg.row_height
    }

    /// Updates the scroll range for a list of `rows` entries.
    pub fn set_rows(&mut self, rows: usize) {
        self.max_y = (rows as f64 + 1.0) * self.cfg.row_height;
        self.target_y = self.target_y.clamp(0.0, self.max_y);
    }

    /// Where auto-follow wants the list when `finished` marbles are done.
    pub fn follow_target(&self, finished: usize) -> f64 {
        let lead = finished as f64 - f64::from(self.cfg.lookahead);
        (lead * self.cfg.row_height).max(0.0)
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        self.target_y = (self.target_y + delta_y).clamp(0.0, self.max_y);
        self.user_moved = self.cfg.hold_ms;
    }

    /// Advances the animation by `dt_ms`.
    pub fn tick(&mut self, dt_ms: f64, finished: usize) {
        let dt = dt_ms.max(0.0);
        if self.user_moved > 0.0 {
            self.user_moved = (self.user_moved - dt).max(0.0);
        }
        if self.user_moved <= 0.0 {
            self.target_y = self.follow_target(finished);
        }
        self.target_y = self.target_y.clamp(0.0, self.max_y);

        let k = if self.cfg.ease_ms > 0.0 {
            1.0 - (-dt / self.cfg.ease_ms).exp()
        } else {
            1.0
        };
        self.current_y += (self.target_y - self.current_y) * k;
        if (self.current_y - self.target_y).abs() < self.cfg.snap_threshold {
            self.current_y = self.target_y;
        }
    }

    /// Top of the visible band in list coordinates.
    pub fn start_y(&self, height: f64) -> f64 {
        (self.current_y - height / 2.0).max(-self.cfg.row_height)
    }
}

/// Rows whose top edge lies in `[start_y - row_height, start_y + height]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn visible_rows(start_y: f64, height: f64, row_height: f64, total: usize) -> Range<usize> {
    if row_height <= 0.0 || total == 0 {
        return 0..0;
    }
    let first = ((start_y - row_height) / row_height).ceil().max(0.0) as usize;
    let last = ((start_y + height) / row_height).floor();
    if last < 0.0 {
        return 0..0;
    }
    let end = (last as usize).saturating_add(1).min(total);
    first.min(end)..end
}

/// Tab-separated ranking with a header row. The row at `winner_rank`
/// (zero-based) is marked with `☆`; `None` marks nothing.
pub fn summary_tsv<'a>(
    names: impl IntoIterator<Item = &'a str>,
    winner_rank: Option<usize>,
) -> String {
    let mut lines = vec!["Rank\tName\tWinner".to_string()];
    for (i, name) in names.into_iter().enumerate() {
        let mark = if winner_rank == Some(i) { "☆" } else { "" };
        lines.push(format!("{}\t{name}\t{mark}", i + 1));
    }
    lines.join("\n")
}

/// Colour of the FPS readout.
pub fn fps_color(fps: f64) -> Color {
    if fps >= 110.0 {
        Color::rgb(0x00, 0xff, 0xc8)
    } else if fps >= 55.0 {
        Color::WHITE
    } else {
        Color::rgb(0xff, 0x4b, 0x4b)
    }
}

/// Scrollable ranking panel in the top-left corner.
pub struct RankOverlay {
    scroll: RankScroll,
    /// Set after the first render; the scroll stays idle until then.
    finished: Option<usize>,
    names: Vec<String>,
    /// Unknown until the first frame is observed.
    winner_rank: Option<usize>,
    clipboard: Rc<dyn ClipboardSink>,
    message_handler: Option<Rc<dyn Fn(&str)>>,
}

impl RankOverlay {
    pub fn new(cfg: RankScrollConfig, clipboard: Rc<dyn ClipboardSink>) -> Self {
        Self {
            scroll: RankScroll::new(cfg),
            finished: None,
            names: Vec::new(),
            winner_rank: None,
            clipboard,
            message_handler: None,
        }
    }

    pub fn scroll(&self) -> &RankScroll {
        &self.scroll
    }

    /// Handler notified with a short status message after a copy.
    pub fn on_message(&mut self, handler: impl Fn(&str) + 'static) {
        self.message_handler = Some(Rc::new(handler));
    }

    /// Ranking of the last rendered frame as TSV.
    pub fn summary(&self) -> String {
        summary_tsv(self.names.iter().map(String::as_str), self.winner_rank)
    }

    /// Copies the ranking to the clipboard. Does nothing when no clipboard
    /// is available.
    pub fn copy_summary(&self) {
        if !self.clipboard.is_available() {
            tracing::debug!("Clipboard unavailable; ranking not copied");
            return;
        }
        let handler = self.message_handler.clone();
        self.clipboard.write_text(
            self.summary(),
            Box::new(move || {
                if let Some(handler) = handler {
                    handler(COPIED_MESSAGE);
                }
            }),
        );
    }

    fn observe(&mut self, params: &RenderParameters<'_>) {
        self.finished = Some(params.winners.len());
        self.winner_rank = Some(params.winner_rank);
        self.names.clear();
        self.names.extend(params.ranking().map(|m| m.name.clone()));
        self.scroll.set_rows(params.total());
    }

    fn render_header(surface: &mut dyn Surface, params: &RenderParameters<'_>) {
        surface.set_text_align(TextAlign::Left);
        surface.set_font("900 10pt sans-serif");
        surface.clear_shadow();
        surface.set_fill_color(fps_color(params.fps));
        surface.fill_text(&format!("{:.0} FPS", params.fps), HEADER_X, 15.0);

        surface.set_font("bold 14pt sans-serif");
        surface.set_fill_color(Color::WHITE);
        surface.set_shadow(4.0, Color::rgba_f(0, 0, 0, 0.5));
        surface.fill_text(
            &format!(
                "LIVE RANKING: {} / {}",
                params.winners.len(),
                params.total()
            ),
            HEADER_X,
            35.0,
        );
    }

    fn render_row(
        surface: &mut dyn Surface,
        rank: usize,
        name: &str,
        hue: f64,
        finished: bool,
        starred: bool,
        row_height: f64,
    ) {
        let y = rank as f64 * row_height;
        let h = row_height - ROW_GAP;

        surface.begin_path();
        surface.round_rect(ROW_X, y, ROW_WIDTH, h, CornerRadii::uniform(CORNER));
        surface.set_fill_color(Color::rgba_f(0, 0, 0, 0.75));
        surface.fill();

        surface.scoped(|s| {
            s.begin_path();
            s.round_rect(ROW_X, y, HUE_BAR, h, CornerRadii::left(CORNER));
            s.clip();
            s.set_fill_color(Color::hsl(hue, 100.0, 60.0));
            s.fill_rect(ROW_X, y, HUE_BAR, h);
        });

        surface.set_fill_color(if finished {
            Color::rgba_f(255, 215, 0, 0.9)
        } else {
            Color::rgba_f(255, 255, 255, 0.15)
        });
        surface.fill_rect(ROW_X + HUE_BAR, y, RANK_BOX, h);

        surface.set_text_baseline(TextBaseline::Middle);
        surface.set_text_align(TextAlign::Center);
        surface.set_font("bold 14pt sans-serif");
        surface.set_fill_color(if finished { Color::BLACK } else { Color::WHITE });
        surface.fill_text(
            &(rank + 1).to_string(),
            ROW_X + HUE_BAR + RANK_BOX / 2.0,
            y + h / 2.0,
        );

        surface.set_text_align(TextAlign::Left);
        surface.set_font("600 14pt sans-serif");
        surface.set_fill_color(Color::WHITE);
        let label = if starred {
            format!("{name} ⭐")
        } else {
            name.to_string()
        };
        surface.fill_text(&label, ROW_X + RANK_BOX + 15.0, y + h / 2.0);
    }
}

impl UiObject for RankOverlay {
    fn update(&mut self, dt_ms: f64) {
        if let Some(finished) = self.finished {
            self.scroll.tick(dt_ms, finished);
        }
    }

    fn render(
        &mut self,
        surface: &mut dyn Surface,
        params: &RenderParameters<'_>,
        _width: f64,
        height: f64,
    ) {
        self.observe(params);
        let row_height = self.scroll.row_height();
        let start_y = self.scroll.start_y(height);
        let rows = visible_rows(start_y, height, row_height, params.total());
        let panel_top = self.scroll.cfg.panel_top;
        let panel_width = self.scroll.cfg.panel_width;

        surface.scoped(|s| {
            Self::render_header(s, params);

            s.begin_path();
            s.rect(0.0, panel_top, panel_width, height);
            s.clip();
            s.translate(0.0, -start_y + LIST_TOP);

            let finished = params.winners.len();
            for (rank, marble) in params.ranking().enumerate().skip(rows.start).take(rows.len()) {
                Self::render_row(
                    s,
                    rank,
                    &marble.name,
                    marble.hue,
                    rank < finished,
                    rank == params.winner_rank,
                    row_height,
                );
            }
        });
    }

    fn on_wheel(&mut self, delta_y: f64) {
        self.scroll.on_wheel(delta_y);
    }

    fn on_double_click(&mut self, _position: Vec2) {
        self.copy_summary();
    }
}
