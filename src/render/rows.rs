//! Rows: one horizontal band of a block's rendered body.

use crate::block::Align;
use crate::constants::ConstantProvider;
use crate::render::measurables::{Element, ElementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Top,
    Bottom,
    Input,
    Spacer,
}

/// A row of measurable elements plus its accumulated geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub elements: Vec<Element>,

    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
    /// Width including connected child blocks that stick out to the right.
    pub width_with_connected_blocks: f64,

    /// Final position relative to the block origin.
    pub x_pos: f64,
    pub y_pos: f64,

    pub has_external_input: bool,
    pub has_statement: bool,
    pub has_inline_input: bool,
    pub has_dummy_input: bool,
    pub has_jagged_edge: bool,

    /// Alignment of the first input placed on this row.
    pub align: Option<Align>,
    /// Offset of a previous/next notch from the block's left edge.
    pub notch_offset: f64,

    /// Top row: how far the row extends above its capline, and the capline
    /// itself (the y where the straight top edge is drawn).
    pub capline: f64,
    pub ascender_height: f64,
    pub has_previous_connection: bool,

    /// Bottom row: how far the row hangs below its baseline, and the final
    /// baseline in block coordinates.
    pub descender_height: f64,
    pub baseline: f64,
    pub has_next_connection: bool,

    /// Input rows: total width of connected child blocks.
    pub connected_block_widths: f64,
    /// Statement rows: shared x of the statement cutout's left edge.
    pub statement_edge: f64,

    /// Spacer rows: which neighbours they separate.
    pub follows_statement: bool,
    pub precedes_statement: bool,
}

impl Row {
    pub fn new(kind: RowKind, c: &ConstantProvider) -> Self {
        Self {
            kind,
            elements: Vec::new(),
            width: 0.0,
            height: 0.0,
            min_width: 0.0,
            min_height: 0.0,
            width_with_connected_blocks: 0.0,
            x_pos: 0.0,
            y_pos: 0.0,
            has_external_input: false,
            has_statement: false,
            has_inline_input: false,
            has_dummy_input: false,
            has_jagged_edge: false,
            align: None,
            notch_offset: c.notch_offset_left,
            capline: 0.0,
            ascender_height: 0.0,
            has_previous_connection: false,
            descender_height: 0.0,
            baseline: 0.0,
            has_next_connection: false,
            connected_block_widths: 0.0,
            statement_edge: 0.0,
            follows_statement: false,
            precedes_statement: false,
        }
    }

    /// A between-rows spacer with its size fixed at creation.
    pub fn spacer(c: &ConstantProvider, height: f64, width: f64) -> Self {
        let mut row = Self::new(RowKind::Spacer, c);
        row.height = height;
        row.width = width;
        row.elements.push(Element::spacer(width));
        row
    }

    /// Populate the row's size fields from its elements.
    pub fn measure(&mut self) {
        match self.kind {
            // Sized at creation.
            RowKind::Spacer => {}
            RowKind::Top => {
                let mut width = 0.0;
                let mut height = 0.0f64;
                let mut ascender = 0.0f64;
                for elem in &self.elements {
                    width += elem.width;
                    if elem.is_spacer() {
                        continue;
                    }
                    if let ElementKind::Hat { ascender_height } = elem.kind {
                        ascender = ascender.max(ascender_height);
                    } else {
                        height = height.max(elem.height);
                    }
                }
                self.width = self.min_width.max(width);
                self.height = self.min_height.max(height) + ascender;
                self.ascender_height = ascender;
                self.capline = ascender;
                self.width_with_connected_blocks = self.width;
            }
            RowKind::Bottom => {
                let mut width = 0.0;
                let mut height = 0.0f64;
                let mut descender = 0.0f64;
                for elem in &self.elements {
                    width += elem.width;
                    if elem.is_spacer() {
                        continue;
                    }
                    // A next notch hangs entirely below the baseline.
                    if elem.is_next_connection() {
                        descender = descender.max(elem.height);
                    } else {
                        height = height.max(elem.height);
                    }
                }
                self.width = self.min_width.max(width);
                self.height = self.min_height.max(height) + descender;
                self.descender_height = descender;
                self.width_with_connected_blocks = self.width;
            }
            RowKind::Input => {
                self.width = self.min_width;
                self.height = self.min_height;
                let mut connected = 0.0;
                for elem in &self.elements {
                    self.width += elem.width;
                    match elem.kind {
                        ElementKind::StatementInput {
                            connected_block_width,
                            ..
                        } => connected += connected_block_width,
                        ElementKind::ExternalValueInput {
                            connected_block_width,
                            connection_width,
                            ..
                        } if connected_block_width != 0.0 => {
                            connected += connected_block_width - connection_width;
                        }
                        _ => {}
                    }
                    if !elem.is_spacer() {
                        self.height = self.height.max(elem.height);
                    }
                }
                self.connected_block_widths = connected;
                self.width_with_connected_blocks = self.width + connected;
            }
        }
    }

    /// Whether element spacing inserts a spacer before the first element.
    pub fn starts_with_elem_spacer(&self) -> bool {
        matches!(self.kind, RowKind::Input)
    }

    /// Whether element spacing inserts a spacer after the last element.
    /// External and statement inputs must touch the row's right edge.
    pub fn ends_with_elem_spacer(&self) -> bool {
        match self.kind {
            RowKind::Top | RowKind::Bottom => true,
            RowKind::Input => !self.has_external_input && !self.has_statement,
            RowKind::Spacer => false,
        }
    }

    pub fn last_input_index(&self) -> Option<usize> {
        self.elements.iter().rposition(Element::is_input)
    }

    pub fn last_input(&self) -> Option<&Element> {
        self.last_input_index().map(|i| &self.elements[i])
    }

    pub fn first_spacer_index(&self) -> Option<usize> {
        self.elements.iter().position(Element::is_spacer)
    }

    pub fn last_spacer_index(&self) -> Option<usize> {
        self.elements.iter().rposition(Element::is_spacer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_row_measure_sums_widths() {
        let c = ConstantProvider::classic();
        let mut row = Row::new(RowKind::Input, &c);
        row.elements.push(Element::spacer(5.0));
        row.elements.push(Element::field(&c, "abc", 0, 0));
        row.elements.push(Element::spacer(5.0));
        row.measure();
        assert_eq!(row.width, 5.0 + 24.0 + 5.0);
        assert_eq!(row.height, 16.0);
    }

    #[test]
    fn test_input_row_min_height_applies() {
        let c = ConstantProvider::classic();
        let mut row = Row::new(RowKind::Input, &c);
        row.min_height = c.dummy_input_min_height;
        row.has_dummy_input = true;
        row.elements.push(Element::spacer(5.0));
        row.measure();
        assert_eq!(row.height, c.dummy_input_min_height);
    }

    #[test]
    fn test_bottom_row_descender() {
        let c = ConstantProvider::classic();
        let mut row = Row::new(RowKind::Bottom, &c);
        row.min_height = c.bottom_row_min_height;
        row.elements.push(Element::round_corner(&c, false));
        row.elements
            .push(Element::next_connection(&c, crate::connection::ConnectionId(0)));
        row.elements.push(Element::round_corner(&c, true));
        row.measure();
        assert_eq!(row.descender_height, c.notch.height);
        assert_eq!(
            row.height,
            c.bottom_row_min_height.max(c.corner_radius / 2.0) + c.notch.height
        );
    }

    #[test]
    fn test_top_row_hat_ascender() {
        let c = ConstantProvider::classic();
        let mut row = Row::new(RowKind::Top, &c);
        row.min_height = c.top_row_min_height;
        row.elements.push(Element::square_corner(&c, false));
        row.elements.push(Element::hat(&c));
        row.elements.push(Element::square_corner(&c, true));
        row.measure();
        assert_eq!(row.ascender_height, c.start_hat.height);
        assert_eq!(row.capline, c.start_hat.height);
        assert_eq!(row.height, c.top_row_min_height + c.start_hat.height);
    }

    #[test]
    fn test_connected_block_widths() {
        let c = ConstantProvider::classic();
        let mut row = Row::new(RowKind::Input, &c);
        row.has_statement = true;
        row.elements
            .push(Element::statement_input(&c, None, Some((64.0, 48.0))));
        row.measure();
        assert_eq!(row.connected_block_widths, 64.0);
        assert_eq!(row.width_with_connected_blocks, row.width + 64.0);
    }
}
