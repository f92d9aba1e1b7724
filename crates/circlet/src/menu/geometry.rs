use crate::menu::{
    ANGLE_STEP, LAST_VISIBLE_INDEX, SLOT_COUNT, START_ANGLE, VISIBLE_COUNT, WRAP_ANGLE, WRAP_INDEX,
};
use circlet_motion::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Sizes and distances of the menu, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Side of the square box the ring is laid out in.
    pub menu_size: f64,
    pub radius: f64,
    pub button_size: f64,
    pub indicator_size: f64,
    /// Distance of the visible indicator badges from the centre.
    pub indicator_distance: f64,
    /// Distance of the wrap indicator badge from the centre.
    pub wrap_indicator_distance: f64,
    pub main_button_padding: f64,
    pub submenu_margin: f64,
    pub submenu_indicator_margin: f64,
    pub hint_padding: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            menu_size: 300.0,
            radius: 96.0,
            button_size: 52.0,
            indicator_size: 16.0,
            indicator_distance: 130.0,
            wrap_indicator_distance: 150.0,
            main_button_padding: 15.0,
            submenu_margin: 10.0,
            submenu_indicator_margin: 15.0,
            hint_padding: 7.0,
        }
    }
}

impl Layout {
    /// Vertical distance between two stacked submenu buttons.
    pub fn submenu_step(&self) -> f64 {
        self.button_size + self.submenu_margin
    }
}

pub fn ring_angle(index: usize) -> f64 {
    START_ANGLE - index as f64 * ANGLE_STEP
}

fn place(angle: f64, distance: f64, menu_size: f64, size: f64) -> Point {
    let center = menu_size / 2.0;
    Point::new(
        angle.cos() * distance + center - size / 2.0,
        angle.sin() * distance + center - size / 2.0,
    )
}

/// Top-left corners of the ring buttons: the visible points followed by the wrap point,
/// which sits on the diagonal at `menu_size` from the centre.
pub fn compute_ring_positions(radius: f64, slot_size: f64, menu_size: f64) -> [Point; SLOT_COUNT] {
    let mut points = [Point::default(); SLOT_COUNT];
    for (i, point) in points.iter_mut().take(VISIBLE_COUNT).enumerate() {
        *point = place(ring_angle(i), radius, menu_size, slot_size);
    }
    points[WRAP_INDEX] = place(WRAP_ANGLE, menu_size, menu_size, slot_size);
    points
}

pub fn compute_indicator_positions(
    distance: f64,
    wrap_distance: f64,
    indicator_size: f64,
    menu_size: f64,
) -> [Point; SLOT_COUNT] {
    let mut points = [Point::default(); SLOT_COUNT];
    for (i, point) in points.iter_mut().take(VISIBLE_COUNT).enumerate() {
        *point = place(ring_angle(i), distance, menu_size, indicator_size);
    }
    points[WRAP_INDEX] = place(WRAP_ANGLE, wrap_distance, menu_size, indicator_size);
    points
}

/// Precomputed ring points in menu space. Only rebuilt when the [`Layout`] changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RingGeometry {
    pub buttons: [Point; SLOT_COUNT],
    pub indicators: [Point; SLOT_COUNT],
    pub main_button: Point,
}

impl RingGeometry {
    pub fn new(layout: &Layout) -> Self {
        let center = layout.menu_size / 2.0 - layout.button_size / 2.0;
        Self {
            buttons: compute_ring_positions(layout.radius, layout.button_size, layout.menu_size),
            indicators: compute_indicator_positions(
                layout.indicator_distance,
                layout.wrap_indicator_distance,
                layout.indicator_size,
                layout.menu_size,
            ),
            main_button: Point::new(center, center),
        }
    }

    pub fn button(&self, index: usize) -> Point {
        self.buttons[index.min(WRAP_INDEX)]
    }

    pub fn indicator(&self, index: usize) -> Point {
        self.indicators[index.min(WRAP_INDEX)]
    }

    pub fn wrap_button(&self) -> Point {
        self.buttons[WRAP_INDEX]
    }

    pub fn wrap_indicator(&self) -> Point {
        self.indicators[WRAP_INDEX]
    }
}

/// Column of submenu buttons stacked above `owner`. The slot next to the last visible
/// index leans into the screen edge, so its column moves one step left and starts one
/// step lower.
pub fn submenu_positions(layout: &Layout, owner: Point, ring_index: usize, count: usize) -> Vec<Point> {
    let step = layout.submenu_step();
    let mut anchor = owner;
    if ring_index == LAST_VISIBLE_INDEX - 1 {
        anchor = anchor.offset(-step, step);
    }
    (1..=count)
        .map(|i| anchor.offset(0.0, -step * i as f64))
        .collect()
}

/// Where the owner's indicator badge parks while its submenu is open.
pub fn submenu_indicator_position(layout: &Layout, last_button: Point) -> Point {
    Point::new(
        last_button.x + layout.button_size / 2.0 - layout.indicator_size / 2.0,
        last_button.y - layout.submenu_indicator_margin,
    )
}

/// Safe area of the host view, in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostFrame {
    pub safe_area: Rect,
}

impl HostFrame {
    pub fn new(safe_area: Rect) -> Self {
        Self { safe_area }
    }
}

/// Where the menu box and the submenu area sit inside the host. Both hang off the
/// bottom-right corner of the safe area; the menu box reaches past it so only its
/// upper-left quarter is on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub menu_origin: Point,
    pub submenu_area: Rect,
}

impl Placement {
    pub fn new(layout: &Layout, host: &HostFrame) -> Self {
        let overhang = layout.menu_size / 2.0 - layout.button_size / 2.0 - layout.main_button_padding;
        let (right, bottom) = (host.safe_area.max_x(), host.safe_area.max_y());
        Self {
            menu_origin: Point::new(
                right + overhang - layout.menu_size,
                bottom + overhang - layout.menu_size,
            ),
            submenu_area: Rect::new(
                right - layout.menu_size,
                bottom - 2.0 * layout.menu_size,
                layout.menu_size,
                2.0 * layout.menu_size,
            ),
        }
    }

    pub fn to_host(&self, menu_point: Point) -> Point {
        menu_point.offset(self.menu_origin.x, self.menu_origin.y)
    }

    pub fn to_submenu_area(&self, menu_point: Point) -> Point {
        let host = self.to_host(menu_point);
        host.offset(-self.submenu_area.origin.x, -self.submenu_area.origin.y)
    }
}
