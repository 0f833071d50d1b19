//! Measurable elements: the units a row is made of.
//!
//! Every element carries the same four geometry fields; the kind variant
//! holds whatever extra geometry that element needs. The kind is a closed
//! sum type so every dispatch over elements is checked for exhaustiveness.

use crate::connection::ConnectionId;
use crate::constants::ConstantProvider;

/// What an element is, plus its kind-specific geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind {
    SquareCorner {
        right: bool,
    },
    RoundCorner {
        right: bool,
    },
    Hat {
        ascender_height: f64,
    },
    PreviousConnection {
        connection: ConnectionId,
        notch_offset: f64,
    },
    NextConnection {
        connection: ConnectionId,
        notch_offset: f64,
    },
    OutputConnection {
        connection: ConnectionId,
        connection_offset_x: f64,
        connection_offset_y: f64,
    },
    InlineInput {
        connection: Option<ConnectionId>,
        connection_width: f64,
        connection_height: f64,
        connection_offset_x: f64,
        connection_offset_y: f64,
        connected_block_width: f64,
    },
    ExternalValueInput {
        connection: Option<ConnectionId>,
        connection_width: f64,
        connection_height: f64,
        connected_block_width: f64,
    },
    StatementInput {
        connection: Option<ConnectionId>,
        notch_offset: f64,
        connected_block_width: f64,
    },
    Field {
        input: usize,
        field: usize,
    },
    Icon {
        icon: usize,
    },
    JaggedEdge,
    Spacer,
}

/// One measurable part of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub width: f64,
    pub height: f64,
    /// Final x offset from the block origin, assigned in the last pass.
    pub x_pos: f64,
    /// Final vertical centre from the block origin, assigned in the last pass.
    pub centerline: f64,
}

impl Element {
    fn new(kind: ElementKind, width: f64, height: f64) -> Self {
        Self {
            kind,
            width,
            height,
            x_pos: 0.0,
            centerline: 0.0,
        }
    }

    pub fn square_corner(c: &ConstantProvider, right: bool) -> Self {
        Self::new(ElementKind::SquareCorner { right }, c.no_padding, c.no_padding)
    }

    pub fn round_corner(c: &ConstantProvider, right: bool) -> Self {
        // The arc spills into the next row, so only half the radius counts
        // against this one.
        Self::new(
            ElementKind::RoundCorner { right },
            c.corner_radius,
            c.corner_radius / 2.0,
        )
    }

    pub fn hat(c: &ConstantProvider) -> Self {
        Self::new(
            ElementKind::Hat {
                ascender_height: c.start_hat.height,
            },
            c.start_hat.width,
            c.start_hat.height,
        )
    }

    pub fn previous_connection(c: &ConstantProvider, connection: ConnectionId) -> Self {
        Self::new(
            ElementKind::PreviousConnection {
                connection,
                notch_offset: c.notch_offset_left,
            },
            c.notch.width,
            c.notch.height,
        )
    }

    pub fn next_connection(c: &ConstantProvider, connection: ConnectionId) -> Self {
        Self::new(
            ElementKind::NextConnection {
                connection,
                notch_offset: c.notch_offset_left,
            },
            c.notch.width,
            c.notch.height,
        )
    }

    pub fn output_connection(c: &ConstantProvider, connection: ConnectionId) -> Self {
        Self::new(
            ElementKind::OutputConnection {
                connection,
                connection_offset_x: 0.0,
                connection_offset_y: c.tab_offset_from_top,
            },
            c.puzzle_tab.width,
            c.puzzle_tab.height,
        )
    }

    /// An inline value socket. `connected` is the joined child's size, if any.
    pub fn inline_input(
        c: &ConstantProvider,
        connection: Option<ConnectionId>,
        connected: Option<(f64, f64)>,
    ) -> Self {
        let (width, height, connected_block_width) = match connected {
            Some((w, h)) => (w + c.puzzle_tab.width, h, w),
            None => (
                c.empty_inline_input_padding + c.puzzle_tab.width,
                c.empty_inline_input_height,
                0.0,
            ),
        };
        Self::new(
            ElementKind::InlineInput {
                connection,
                connection_width: c.puzzle_tab.width,
                connection_height: c.puzzle_tab.height,
                connection_offset_x: 0.0,
                connection_offset_y: c.tab_offset_from_top,
                connected_block_width,
            },
            width,
            height,
        )
    }

    /// A value socket rendered as a tab notch in the block's right edge.
    pub fn external_value_input(
        c: &ConstantProvider,
        connection: Option<ConnectionId>,
        connected: Option<(f64, f64)>,
    ) -> Self {
        let (height, connected_block_width) = match connected {
            Some((w, h)) => (h - 2.0 * c.tab_offset_from_top, w),
            None => (c.puzzle_tab.height, 0.0),
        };
        Self::new(
            ElementKind::ExternalValueInput {
                connection,
                connection_width: c.puzzle_tab.width,
                connection_height: c.puzzle_tab.height,
                connected_block_width,
            },
            c.puzzle_tab.width,
            height,
        )
    }

    /// A statement socket: the C-shaped cutout holding a nested stack.
    pub fn statement_input(
        c: &ConstantProvider,
        connection: Option<ConnectionId>,
        connected: Option<(f64, f64)>,
    ) -> Self {
        let (height, connected_block_width) = match connected {
            Some((w, h)) => (h, w),
            None => (c.empty_statement_input_height, 0.0),
        };
        Self::new(
            ElementKind::StatementInput {
                connection,
                notch_offset: c.statement_input_notch_offset,
                connected_block_width,
            },
            c.statement_input_notch_offset + c.notch.width,
            height,
        )
    }

    pub fn field(c: &ConstantProvider, text: &str, input: usize, field: usize) -> Self {
        let (width, height) = c.field_size(text);
        Self::new(ElementKind::Field { input, field }, width, height)
    }

    pub fn icon(c: &ConstantProvider, icon: usize) -> Self {
        Self::new(ElementKind::Icon { icon }, c.icon_size, c.icon_size)
    }

    pub fn jagged_edge(c: &ConstantProvider) -> Self {
        Self::new(
            ElementKind::JaggedEdge,
            c.jagged_teeth.width,
            c.jagged_teeth.height,
        )
    }

    /// Horizontal padding. Its height is overwritten with the row height
    /// once rows are final.
    pub fn spacer(width: f64) -> Self {
        Self::new(ElementKind::Spacer, width, 0.0)
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self.kind, ElementKind::Spacer)
    }

    pub fn is_hat(&self) -> bool {
        matches!(self.kind, ElementKind::Hat { .. })
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, ElementKind::Field { .. })
    }

    pub fn is_icon(&self) -> bool {
        matches!(self.kind, ElementKind::Icon { .. })
    }

    pub fn is_previous_connection(&self) -> bool {
        matches!(self.kind, ElementKind::PreviousConnection { .. })
    }

    pub fn is_next_connection(&self) -> bool {
        matches!(self.kind, ElementKind::NextConnection { .. })
    }

    pub fn is_inline_input(&self) -> bool {
        matches!(self.kind, ElementKind::InlineInput { .. })
    }

    pub fn is_external_input(&self) -> bool {
        matches!(self.kind, ElementKind::ExternalValueInput { .. })
    }

    pub fn is_statement_input(&self) -> bool {
        matches!(self.kind, ElementKind::StatementInput { .. })
    }

    /// Any kind of input socket.
    pub fn is_input(&self) -> bool {
        self.is_inline_input() || self.is_external_input() || self.is_statement_input()
    }

    pub fn is_left_square_corner(&self) -> bool {
        matches!(self.kind, ElementKind::SquareCorner { right: false })
    }

    pub fn is_left_round_corner(&self) -> bool {
        matches!(self.kind, ElementKind::RoundCorner { right: false })
    }

    /// The notch offset carried by previous/next connection elements.
    pub fn notch_offset(&self) -> Option<f64> {
        match self.kind {
            ElementKind::PreviousConnection { notch_offset, .. }
            | ElementKind::NextConnection { notch_offset, .. }
            | ElementKind::StatementInput { notch_offset, .. } => Some(notch_offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_sizes() {
        let c = ConstantProvider::classic();
        let square = Element::square_corner(&c, false);
        assert_eq!((square.width, square.height), (0.0, 0.0));
        let round = Element::round_corner(&c, true);
        assert_eq!((round.width, round.height), (8.0, 4.0));
    }

    #[test]
    fn test_inline_input_sizing() {
        let c = ConstantProvider::classic();
        let empty = Element::inline_input(&c, None, None);
        assert_eq!(empty.width, c.empty_inline_input_padding + c.puzzle_tab.width);
        assert_eq!(empty.height, c.empty_inline_input_height);

        let full = Element::inline_input(&c, None, Some((40.0, 30.0)));
        assert_eq!(full.width, 40.0 + c.puzzle_tab.width);
        assert_eq!(full.height, 30.0);
    }

    #[test]
    fn test_statement_input_sizing() {
        let c = ConstantProvider::classic();
        let empty = Element::statement_input(&c, None, None);
        assert_eq!(empty.width, c.statement_input_notch_offset + c.notch.width);
        assert_eq!(empty.height, c.empty_statement_input_height);

        let full = Element::statement_input(&c, None, Some((50.0, 72.0)));
        assert_eq!(full.height, 72.0);
    }

    #[test]
    fn test_input_predicate_covers_all_inputs() {
        let c = ConstantProvider::classic();
        assert!(Element::inline_input(&c, None, None).is_input());
        assert!(Element::external_value_input(&c, None, None).is_input());
        assert!(Element::statement_input(&c, None, None).is_input());
        assert!(!Element::field(&c, "x", 0, 0).is_input());
        assert!(!Element::spacer(5.0).is_input());
    }
}
