use crate::game::phase::RoundPhase;
use crate::model::board::{COLUMN_COUNT, DISPLAY_GROUPS};

pub const NOMINAL_WIDTH: f32 = 1440.0;
pub const NOMINAL_HEIGHT: f32 = 790.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Open on every edge.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        self.x < px && px < self.x + self.width && self.y < py && py < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Cancel,
    ContinueYes,
    ContinueNo,
    Menu,
    Group(usize),
    Column(usize),
}

/// Screen regions for every clickable control at a given canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    start: Rect,
    cancel: Rect,
    continue_yes: Rect,
    continue_no: Rect,
    menu: Rect,
    groups: [Rect; DISPLAY_GROUPS],
    columns: [Rect; COLUMN_COUNT],
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(NOMINAL_WIDTH, NOMINAL_HEIGHT)
    }
}

impl Layout {
    pub fn new(width: f32, height: f32) -> Self {
        let sx = width / NOMINAL_WIDTH;
        let sy = height / NOMINAL_HEIGHT;
        Self {
            start: Rect::new(width / 3.0, height / 3.0, 400.0, 150.0),
            cancel: Rect::new(width * 0.7, height / 12.0, 95.0 * sx, 80.0 * sy),
            continue_yes: Rect::new(width / 3.0 - width / 25.0, height / 2.0, 150.0, 100.0),
            continue_no: Rect::new(width / 2.0 + width / 10.0, height / 2.0, 150.0, 100.0),
            menu: Rect::new(width / 2.0, height - height / 5.0, 150.0, 100.0),
            groups: std::array::from_fn(|g| {
                Rect::new((80.0 + 90.0 * g as f32) * sx, 240.0 * sy, 64.0 * sx, 64.0 * sy)
            }),
            columns: std::array::from_fn(|c| {
                Rect::new((480.0 + 130.0 * c as f32) * sx, 240.0 * sy, 110.0 * sx, 420.0 * sy)
            }),
        }
    }

    pub fn cancel(&self) -> Rect {
        self.cancel
    }

    pub fn start(&self) -> Rect {
        self.start
    }

    pub fn group(&self, group: usize) -> Option<Rect> {
        self.groups.get(group).copied()
    }

    pub fn column(&self, column: usize) -> Option<Rect> {
        self.columns.get(column).copied()
    }

    /// The control under the point, considering only what `phase` shows.
    pub fn hit(&self, phase: RoundPhase, x: f32, y: f32) -> Option<Control> {
        match phase {
            RoundPhase::Menu => self.start.contains(x, y).then_some(Control::Start),
            RoundPhase::Playing => {
                if self.cancel.contains(x, y) {
                    return Some(Control::Cancel);
                }
                if let Some(g) = self.groups.iter().position(|r| r.contains(x, y)) {
                    return Some(Control::Group(g));
                }
                self.columns
                    .iter()
                    .position(|r| r.contains(x, y))
                    .map(Control::Column)
            }
            RoundPhase::ContinuePrompt => {
                if self.continue_yes.contains(x, y) {
                    Some(Control::ContinueYes)
                } else if self.continue_no.contains(x, y) {
                    Some(Control::ContinueNo)
                } else {
                    None
                }
            }
            RoundPhase::GameOver => self.menu.contains(x, y).then_some(Control::Menu),
            RoundPhase::Bonus | RoundPhase::Won | RoundPhase::Resetting => None,
        }
    }
}
