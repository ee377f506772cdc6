//! Certificate geometry
//!
//! All coordinates are PDF points with a bottom-left origin on an A4 page.
//! The values encode one specific template design and are shared by every
//! record; nothing here is computed from data.

/// A4 portrait, in points
pub const A4_SIZE: (f32, f32) = (595.28, 841.89);

/// RGB text colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// #1C3062
    pub const NAVY: Rgb = Rgb::new(28, 48, 98);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points
    pub size: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Image rectangle, anchored at its bottom-left corner
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
}

/// Record values printed on the first page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    FullName,
    Instructor,
    Aircraft,
    Map,
    MissionType,
    MissionName,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSlot {
    pub field: TextField,
    pub at: Point,
}

/// Page 1: identity fields and the photo
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityLayout {
    pub style: TextStyle,
    pub fields: Vec<TextSlot>,
    pub photo: Rect,
}

/// One chart position on a chart page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSlot {
    pub heading: Point,
    pub chart: Rect,
}

/// Pages 2 and 3: two charts per page, each under a "Round N" heading
#[derive(Debug, Clone, PartialEq)]
pub struct ChartsLayout {
    pub title: String,
    pub continuation_title: String,
    pub title_at: Point,
    pub title_style: TextStyle,
    pub heading_style: TextStyle,
    pub slots: [ChartSlot; 2],
}

impl ChartsLayout {
    /// Overlay page index (0-based) and slot for `round` (1-based)
    pub fn placement(&self, round: u8) -> (usize, &ChartSlot) {
        let offset = usize::from(round.saturating_sub(1));
        let per_page = self.slots.len();
        (1 + offset / per_page, &self.slots[offset % per_page])
    }

    /// Rounds drawn on overlay page `page_index`
    pub fn rounds_on_page(&self, page_index: usize) -> std::ops::Range<u8> {
        let per_page = self.slots.len();
        let first = (page_index.saturating_sub(1) * per_page + 1) as u8;
        first..first + per_page as u8
    }

    pub fn title_for_page(&self, page_index: usize) -> &str {
        if page_index <= 1 {
            &self.title
        } else {
            &self.continuation_title
        }
    }

    pub fn heading(round: u8) -> String {
        format!("Round {}", round)
    }
}

/// Complete certificate layout
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Size of overlay pages appended without a template page behind them
    pub page_size: (f32, f32),
    pub identity: IdentityLayout,
    pub charts: ChartsLayout,
}

impl Default for Layout {
    fn default() -> Self {
        let field = |field, x, y| TextSlot {
            field,
            at: Point::new(x, y),
        };

        Self {
            page_size: A4_SIZE,
            identity: IdentityLayout {
                style: TextStyle {
                    size: 16.0,
                    color: Rgb::WHITE,
                },
                fields: vec![
                    field(TextField::FullName, 99.0, 533.0),
                    field(TextField::Instructor, 99.0, 458.0),
                    field(TextField::Aircraft, 98.0, 309.0),
                    field(TextField::Map, 83.0, 284.0),
                    field(TextField::MissionType, 163.0, 360.0),
                    field(TextField::MissionName, 179.0, 334.0),
                    field(TextField::Date, 86.0, 385.0),
                ],
                photo: Rect::new(360.0, 278.0, 205.0, 280.0),
            },
            charts: ChartsLayout {
                title: "Training Simulation Report - Shots Details".to_string(),
                continuation_title: "Training Simulation Report - Shots Details (Suite)"
                    .to_string(),
                title_at: Point::new(50.0, 800.0),
                title_style: TextStyle {
                    size: 20.0,
                    color: Rgb::WHITE,
                },
                heading_style: TextStyle {
                    size: 16.0,
                    color: Rgb::NAVY,
                },
                slots: [
                    ChartSlot {
                        heading: Point::new(50.0, 765.0),
                        chart: Rect::new(50.0, 465.0, 500.0, 280.0),
                    },
                    ChartSlot {
                        heading: Point::new(50.0, 450.0),
                        chart: Rect::new(50.0, 150.0, 500.0, 280.0),
                    },
                ],
            },
        }
    }
}
