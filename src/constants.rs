//! Geometric constants and prebuilt connection shapes for one renderer.
//!
//! A `ConstantProvider` is immutable for the duration of a measure+draw pass.
//! Renderer variants are built by constructing a provider with different
//! numbers, not by subtyping.

use unicode_width::UnicodeWidthStr;

use crate::svg;

/// The notch shape cut into previous/next connection edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Notch {
    pub width: f64,
    pub height: f64,
    /// Drawn while the pen moves left-to-right.
    pub path_left: String,
    /// Drawn while the pen moves right-to-left.
    pub path_right: String,
}

/// The puzzle-piece tab on output and value-input connections.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleTab {
    pub width: f64,
    pub height: f64,
    /// Drawn while the pen moves up the left edge.
    pub path_up: String,
    /// Drawn while the pen moves down into a value notch.
    pub path_down: String,
}

/// The rounded cap drawn above event-style blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct StartHat {
    pub width: f64,
    pub height: f64,
    pub path: String,
}

/// The torn-edge marker on collapsed blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct JaggedTeeth {
    pub width: f64,
    pub height: f64,
    pub path: String,
}

/// Concave corners of a statement-input cutout.
#[derive(Debug, Clone, PartialEq)]
pub struct InsideCorners {
    pub width: f64,
    pub height: f64,
    pub path_top: String,
    pub path_bottom: String,
}

/// Convex corners of the block outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutsideCorners {
    pub top_left: String,
    pub top_right: String,
    pub bottom_left: String,
    pub bottom_right: String,
    /// Vertical extent of the bottom-right corner, subtracted from the
    /// right edge before the bottom pass starts.
    pub right_height: f64,
}

/// All sizing information shared by the measurement and drawing passes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantProvider {
    pub no_padding: f64,
    pub small_padding: f64,
    pub medium_padding: f64,
    pub medium_large_padding: f64,
    pub large_padding: f64,

    pub tab_width: f64,
    pub tab_height: f64,
    /// Gap between the top of a value input and the top of its tab.
    pub tab_offset_from_top: f64,

    pub notch_width: f64,
    pub notch_height: f64,
    /// Distance from the block's left edge to a previous/next notch.
    pub notch_offset_left: f64,
    /// Distance from a statement input's left edge to its notch.
    pub statement_input_notch_offset: f64,
    pub statement_input_padding_left: f64,

    pub corner_radius: f64,

    pub min_block_width: f64,
    pub min_block_height: f64,

    pub empty_inline_input_padding: f64,
    pub empty_inline_input_height: f64,
    pub empty_statement_input_height: f64,
    pub dummy_input_min_height: f64,
    pub dummy_input_shadow_min_height: f64,

    pub top_row_min_height: f64,
    pub top_row_precedes_statement_min_height: f64,
    pub bottom_row_min_height: f64,
    pub bottom_row_after_statement_min_height: f64,

    /// Whether blocks with neither output nor previous connection grow a hat.
    pub add_start_hats: bool,
    pub start_hat_width: f64,
    pub start_hat_height: f64,

    pub jagged_teeth_width: f64,
    pub jagged_teeth_height: f64,

    pub icon_size: f64,
    pub field_height: f64,
    /// Width of one character cell, for field text measurement.
    pub char_width: f64,

    pub notch: Notch,
    pub puzzle_tab: PuzzleTab,
    pub start_hat: StartHat,
    pub jagged_teeth: JaggedTeeth,
    pub inside_corners: InsideCorners,
    pub outside_corners: OutsideCorners,
}

impl Default for ConstantProvider {
    fn default() -> Self {
        Self::classic()
    }
}

impl ConstantProvider {
    /// The standard renderer geometry.
    pub fn classic() -> Self {
        let tab_width = 8.0;
        let tab_height = 15.0;
        let notch_width = 15.0;
        let notch_height = 4.0;
        let corner_radius = 8.0;
        let start_hat_width = 100.0;
        let start_hat_height = 15.0;
        let jagged_teeth_width = 6.0;
        let jagged_teeth_height = 12.0;
        let medium_padding = 5.0;
        let large_padding = 10.0;
        let min_block_height = 24.0;

        Self {
            no_padding: 0.0,
            small_padding: 3.0,
            medium_padding,
            medium_large_padding: 8.0,
            large_padding,

            tab_width,
            tab_height,
            tab_offset_from_top: 5.0,

            notch_width,
            notch_height,
            notch_offset_left: 15.0,
            statement_input_notch_offset: 15.0,
            statement_input_padding_left: 20.0,

            corner_radius,

            min_block_width: 12.0,
            min_block_height,

            empty_inline_input_padding: 14.5,
            empty_inline_input_height: tab_height + 11.0,
            empty_statement_input_height: min_block_height,
            dummy_input_min_height: tab_height,
            dummy_input_shadow_min_height: tab_height,

            top_row_min_height: medium_padding,
            top_row_precedes_statement_min_height: large_padding,
            bottom_row_min_height: medium_padding,
            bottom_row_after_statement_min_height: large_padding,

            add_start_hats: false,
            start_hat_width,
            start_hat_height,

            jagged_teeth_width,
            jagged_teeth_height,

            icon_size: 16.0,
            field_height: 16.0,
            char_width: 8.0,

            notch: make_notch(notch_width, notch_height),
            puzzle_tab: make_puzzle_tab(tab_width, tab_height),
            start_hat: make_start_hat(start_hat_width, start_hat_height),
            jagged_teeth: make_jagged_teeth(jagged_teeth_width, jagged_teeth_height),
            inside_corners: make_inside_corners(corner_radius),
            outside_corners: make_outside_corners(corner_radius),
        }
    }

    /// A denser profile: same connection shapes, tighter padding and corners.
    pub fn compact() -> Self {
        let corner_radius = 4.0;
        let mut c = Self::classic();
        c.small_padding = 2.0;
        c.medium_padding = 3.0;
        c.medium_large_padding = 5.0;
        c.large_padding = 6.0;
        c.top_row_min_height = c.medium_padding;
        c.top_row_precedes_statement_min_height = c.large_padding;
        c.bottom_row_min_height = c.medium_padding;
        c.bottom_row_after_statement_min_height = c.large_padding;
        c.corner_radius = corner_radius;
        c.inside_corners = make_inside_corners(corner_radius);
        c.outside_corners = make_outside_corners(corner_radius);
        c
    }

    /// Width of `text` in px, by character cells.
    pub fn text_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.char_width
    }

    /// Rendered size of a text field.
    pub fn field_size(&self, text: &str) -> (f64, f64) {
        (self.text_width(text), self.field_height)
    }
}

fn make_notch(width: f64, height: f64) -> Notch {
    let inner_width = 3.0;
    let outer_width = (width - inner_width) / 2.0;

    let main_path = |dir: f64| {
        svg::line(&[
            (dir * outer_width, height),
            (dir * inner_width, 0.0),
            (dir * outer_width, -height),
        ])
    };

    Notch {
        width,
        height,
        path_left: main_path(1.0),
        path_right: main_path(-1.0),
    }
}

fn make_puzzle_tab(width: f64, height: f64) -> PuzzleTab {
    // The up and down paths are the same curve with the Y sign flipped.
    let main_path = |up: bool| {
        let forward = if up { -1.0 } else { 1.0 };
        let back = -forward;

        let overlap = 2.5;
        let half_height = height / 2.0;
        let control1_y = half_height + overlap;
        let control2_y = half_height + 0.5;
        let control3_y = overlap;

        svg::curve(
            'c',
            &[
                (0.0, forward * control1_y),
                (-width, back * control2_y),
                (-width, forward * half_height),
            ],
        ) + &svg::curve('s', &[(width, back * control3_y), (width, forward * half_height)])
    };

    PuzzleTab {
        width,
        height,
        path_up: main_path(true),
        path_down: main_path(false),
    }
}

fn make_start_hat(width: f64, height: f64) -> StartHat {
    StartHat {
        width,
        height,
        path: svg::curve('c', &[(30.0, -height), (70.0, -height), (width, 0.0)]),
    }
}

fn make_jagged_teeth(width: f64, height: f64) -> JaggedTeeth {
    JaggedTeeth {
        width,
        height,
        path: svg::line(&[
            (width, height / 4.0),
            (-width * 2.0, height / 2.0),
            (width, height / 4.0),
        ]),
    }
}

fn make_inside_corners(radius: f64) -> InsideCorners {
    InsideCorners {
        width: radius,
        height: radius,
        path_top: svg::arc('a', "0 0,0", radius, (-radius, radius)),
        path_bottom: svg::arc('a', "0 0,0", radius, (radius, radius)),
    }
}

fn make_outside_corners(radius: f64) -> OutsideCorners {
    OutsideCorners {
        top_left: svg::move_by(0.0, radius) + &svg::arc('a', "0 0,1", radius, (radius, -radius)),
        top_right: svg::arc('a', "0 0,1", radius, (radius, radius)),
        bottom_left: svg::arc('a', "0 0,1", radius, (-radius, -radius)),
        bottom_right: svg::arc('a', "0 0,1", radius, (-radius, radius)),
        right_height: radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_ascii() {
        let c = ConstantProvider::classic();
        assert_eq!(c.text_width("move"), 4.0 * 8.0);
    }

    #[test]
    fn test_text_width_fullwidth() {
        let c = ConstantProvider::classic();
        // Fullwidth characters occupy two cells.
        assert_eq!(c.text_width("ブロック"), 8.0 * 8.0);
    }

    #[test]
    fn test_notch_paths() {
        let c = ConstantProvider::classic();
        assert_eq!(c.notch.path_left, "l 6,4 3,0 6,-4 ");
        assert_eq!(c.notch.path_right, "l -6,4 -3,0 -6,-4 ");
    }

    #[test]
    fn test_puzzle_tab_paths() {
        let c = ConstantProvider::classic();
        assert_eq!(c.puzzle_tab.path_down, "c 0,10 -8,-8 -8,7.5 s 8,-2.5 8,7.5 ");
        assert_eq!(c.puzzle_tab.path_up, "c 0,-10 -8,8 -8,-7.5 s 8,2.5 8,-7.5 ");
    }

    #[test]
    fn test_jagged_teeth_path() {
        let c = ConstantProvider::classic();
        assert_eq!(c.jagged_teeth.path, "l 6,3 -12,6 6,3 ");
    }

    #[test]
    fn test_compact_profile_keeps_shapes() {
        let classic = ConstantProvider::classic();
        let compact = ConstantProvider::compact();
        assert_eq!(classic.notch, compact.notch);
        assert_eq!(classic.puzzle_tab, compact.puzzle_tab);
        assert!(compact.medium_padding < classic.medium_padding);
        assert_ne!(classic.outside_corners, compact.outside_corners);
    }
}
