//! The drawing pass: from measured geometry to SVG path strings.
//!
//! The outline is one continuous pen stroke: top edge, then each interior
//! row's right side, then the bottom edge drawn in reverse, then the left
//! edge closes the path. Inline cutouts and field placement do not affect
//! the outline and run as a second pass. The drawer trusts the measurement
//! pass completely and re-validates nothing.

use crate::connection::ConnectionId;
use crate::constants::ConstantProvider;
use crate::render::info::RenderInfo;
use crate::render::measurables::{Element, ElementKind};
use crate::render::rows::Row;
use crate::svg;
use crate::workspace::{Workspace, WorkspaceError};

/// A field or icon placed by the drawer. The editor's DOM layer applies
/// these as transforms; here they are plain records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item {
    Field { input: usize, field: usize },
    Icon { icon: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemLayout {
    pub item: Item,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub hidden: bool,
}

/// Everything a draw pass produces besides its connection write-backs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    /// The block outline, a single closed path.
    pub outline: String,
    /// Cutouts for inline inputs, separate so they can be filled differently.
    pub inline: String,
    pub width: f64,
    pub height: f64,
    pub width_with_children: f64,
    /// Whether the finished path should be mirrored by the downstream layer.
    pub rtl: bool,
    pub items: Vec<ItemLayout>,
}

/// Draws one block from a finished [`RenderInfo`].
pub struct Drawer<'a> {
    constants: &'a ConstantProvider,
    info: &'a RenderInfo,
    outline: String,
    inline: String,
    items: Vec<ItemLayout>,
}

impl<'a> Drawer<'a> {
    pub fn new(constants: &'a ConstantProvider, info: &'a RenderInfo) -> Self {
        Self {
            constants,
            info,
            outline: String::new(),
            inline: String::new(),
            items: Vec::new(),
        }
    }

    /// Produce the path strings, position every live connection, and write
    /// the final size back onto the block.
    pub fn draw(mut self, ws: &mut Workspace) -> Result<RenderResult, WorkspaceError> {
        self.hide_collapse_hidden_icons();
        self.draw_outline(ws)?;
        self.draw_internals(ws)?;
        self.record_size_on_block(ws)?;

        let info = self.info;
        Ok(RenderResult {
            outline: self.outline,
            inline: self.inline,
            width: info.width,
            height: info.height,
            width_with_children: info.width_with_children,
            rtl: info.rtl,
            items: self.items,
        })
    }

    fn hide_collapse_hidden_icons(&mut self) {
        let info = self.info;
        for elem in &info.hidden_icons {
            if let ElementKind::Icon { icon } = elem.kind {
                self.items.push(ItemLayout {
                    item: Item::Icon { icon },
                    x: 0.0,
                    y: 0.0,
                    width: elem.width,
                    height: elem.height,
                    hidden: true,
                });
            }
        }
    }

    fn draw_outline(&mut self, ws: &mut Workspace) -> Result<(), WorkspaceError> {
        self.draw_top(ws)?;
        let info = self.info;
        for r in 1..info.rows.len().saturating_sub(1) {
            let row = &info.rows[r];
            if row.has_jagged_edge {
                self.draw_jagged_edge(row);
            } else if row.has_statement {
                self.draw_statement_input(ws, row)?;
            } else if row.has_external_input {
                self.draw_value_input(ws, row)?;
            } else {
                self.draw_right_side_row(row);
            }
        }
        self.draw_bottom(ws)?;
        self.draw_left(ws)?;
        Ok(())
    }

    /// The top edge: corner, hat or previous notch, spacers, then a step
    /// down to the first interior row.
    fn draw_top(&mut self, ws: &mut Workspace) -> Result<(), WorkspaceError> {
        let info = self.info;
        let c = self.constants;
        let Some(top) = info.rows.first() else {
            return Ok(());
        };
        self.position_previous_connection(ws, top)?;

        let mut path = svg::move_by(top.x_pos, info.start_y);
        for elem in &top.elements {
            match elem.kind {
                ElementKind::RoundCorner { right: false } => {
                    path.push_str(&c.outside_corners.top_left);
                }
                ElementKind::RoundCorner { right: true } => {
                    path.push_str(&c.outside_corners.top_right);
                }
                ElementKind::PreviousConnection { .. } => path.push_str(&c.notch.path_left),
                ElementKind::Hat { .. } => path.push_str(&c.start_hat.path),
                ElementKind::Spacer => path.push_str(&svg::line_on_axis('h', elem.width)),
                // Square corners draw nothing.
                _ => {}
            }
        }
        path.push_str(&svg::line_on_axis('v', top.height));
        self.outline.push_str(&path);
        Ok(())
    }

    /// The torn right edge of a collapsed block.
    fn draw_jagged_edge(&mut self, row: &Row) {
        let c = self.constants;
        let remainder = row.height - c.jagged_teeth.height;
        self.outline.push_str(&c.jagged_teeth.path);
        self.outline.push_str(&svg::line_on_axis('v', remainder));
    }

    /// An external value input: a tab notch in the right edge.
    fn draw_value_input(&mut self, ws: &mut Workspace, row: &Row) -> Result<(), WorkspaceError> {
        let c = self.constants;
        self.position_external_value_connection(ws, row)?;
        let Some(input) = row.last_input() else {
            return Ok(());
        };
        let ElementKind::ExternalValueInput {
            connection_height, ..
        } = input.kind
        else {
            return Ok(());
        };

        let mut path = svg::line_on_axis('H', input.x_pos + input.width);
        path.push_str(&c.puzzle_tab.path_down);
        path.push_str(&svg::line_on_axis('v', row.height - connection_height));
        self.outline.push_str(&path);
        Ok(())
    }

    /// A statement input: notch, inner corners, and the connecting verticals
    /// of the C-shaped cutout.
    fn draw_statement_input(
        &mut self,
        ws: &mut Workspace,
        row: &Row,
    ) -> Result<(), WorkspaceError> {
        let c = self.constants;
        let Some(input) = row.last_input() else {
            return Ok(());
        };
        let Some(notch_offset) = input.notch_offset() else {
            return Ok(());
        };

        // The notch is drawn right-to-left, starting at its right edge.
        let x = input.x_pos + notch_offset + c.notch.width;
        let inner_top_left = format!(
            "{}{}{}",
            c.notch.path_right,
            svg::line_on_axis('h', -(notch_offset - c.inside_corners.width)),
            c.inside_corners.path_top
        );
        let inner_height = row.height - 2.0 * c.inside_corners.height;

        let mut path = svg::line_on_axis('H', x);
        path.push_str(&inner_top_left);
        path.push_str(&svg::line_on_axis('v', inner_height));
        path.push_str(&c.inside_corners.path_bottom);
        path.push_str(&svg::line_on_axis('H', row.x_pos + row.width));
        self.outline.push_str(&path);

        self.position_statement_input_connection(ws, row)?;
        Ok(())
    }

    /// A plain right edge for rows with no connection in them.
    fn draw_right_side_row(&mut self, row: &Row) {
        self.outline
            .push_str(&svg::line_on_axis('V', row.y_pos + row.height));
    }

    /// The bottom edge, drawn right-to-left, possibly with a next notch.
    fn draw_bottom(&mut self, ws: &mut Workspace) -> Result<(), WorkspaceError> {
        let info = self.info;
        let c = self.constants;
        let Some(bottom) = info.rows.last() else {
            return Ok(());
        };
        self.position_next_connection(ws, bottom)?;

        let mut right_corner_y = 0.0;
        let mut path = String::new();
        for elem in bottom.elements.iter().rev() {
            match elem.kind {
                ElementKind::NextConnection { .. } => path.push_str(&c.notch.path_right),
                ElementKind::SquareCorner { right: false } => {
                    path.push_str(&svg::line_on_axis('H', bottom.x_pos));
                }
                ElementKind::RoundCorner { right: false } => {
                    path.push_str(&c.outside_corners.bottom_left);
                }
                ElementKind::RoundCorner { right: true } => {
                    path.push_str(&c.outside_corners.bottom_right);
                    right_corner_y = c.outside_corners.right_height;
                }
                ElementKind::Spacer => path.push_str(&svg::line_on_axis('h', -elem.width)),
                _ => {}
            }
        }

        self.outline
            .push_str(&svg::line_on_axis('V', bottom.baseline - right_corner_y));
        self.outline.push_str(&path);
        Ok(())
    }

    /// The left edge: an output tab if the block has one, then close.
    fn draw_left(&mut self, ws: &mut Workspace) -> Result<(), WorkspaceError> {
        let info = self.info;
        let c = self.constants;
        self.position_output_connection(ws)?;

        if let Some(output) = &info.output {
            if let ElementKind::OutputConnection {
                connection_offset_y,
                ..
            } = output.kind
            {
                let tab_bottom = connection_offset_y + output.height;
                self.outline
                    .push_str(&svg::line_on_axis('V', tab_bottom));
                self.outline.push_str(&c.puzzle_tab.path_up);
            }
        }
        self.outline.push('z');
        Ok(())
    }

    /// Inline cutouts plus field and icon placement; none of these touch
    /// the outline.
    fn draw_internals(&mut self, ws: &mut Workspace) -> Result<(), WorkspaceError> {
        let info = self.info;
        for row in &info.rows {
            for elem in &row.elements {
                match elem.kind {
                    ElementKind::InlineInput { .. } => self.draw_inline_input(ws, elem)?,
                    ElementKind::Field { input, field } => {
                        self.layout_item(elem, Item::Field { input, field });
                    }
                    ElementKind::Icon { icon } => self.layout_item(elem, Item::Icon { icon }),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn draw_inline_input(
        &mut self,
        ws: &mut Workspace,
        elem: &Element,
    ) -> Result<(), WorkspaceError> {
        let c = self.constants;
        let info = self.info;
        let ElementKind::InlineInput {
            connection,
            connection_width,
            connection_height,
            connection_offset_x,
            connection_offset_y,
            ..
        } = elem.kind
        else {
            return Ok(());
        };

        let y_pos = elem.centerline - elem.height / 2.0;
        let connection_bottom = connection_height + connection_offset_y;
        let connection_right = elem.x_pos + connection_width;

        let mut path = svg::move_to(connection_right, y_pos);
        path.push_str(&svg::line_on_axis('v', connection_offset_y));
        path.push_str(&c.puzzle_tab.path_down);
        path.push_str(&svg::line_on_axis('v', elem.height - connection_bottom));
        path.push_str(&svg::line_on_axis('h', elem.width - connection_width));
        path.push_str(&svg::line_on_axis('v', -elem.height));
        path.push_str("z ");
        self.inline.push_str(&path);

        if let Some(conn) = connection {
            let mut conn_x = elem.x_pos + connection_width + connection_offset_x;
            if info.rtl {
                conn_x = -conn_x;
            }
            ws.set_connection_offset(conn, conn_x, y_pos + connection_offset_y)?;
        }
        Ok(())
    }

    fn layout_item(&mut self, elem: &Element, item: Item) {
        let info = self.info;
        let y = elem.centerline - elem.height / 2.0;
        let mut x = elem.x_pos;
        if info.rtl {
            x = -(x + elem.width);
        }
        self.items.push(ItemLayout {
            item,
            x,
            y,
            width: elem.width,
            height: elem.height,
            hidden: info.is_insertion_marker,
        });
    }

    // ---- connection write-backs ------------------------------------------

    fn set_offset(
        &self,
        ws: &mut Workspace,
        conn: ConnectionId,
        x: f64,
        y: f64,
    ) -> Result<(), WorkspaceError> {
        let x = if self.info.rtl { -x } else { x };
        ws.set_connection_offset(conn, x, y)
    }

    fn position_previous_connection(
        &self,
        ws: &mut Workspace,
        top: &Row,
    ) -> Result<(), WorkspaceError> {
        if !top.has_previous_connection {
            return Ok(());
        }
        for elem in &top.elements {
            if let ElementKind::PreviousConnection { connection, .. } = elem.kind {
                return self.set_offset(ws, connection, top.x_pos + top.notch_offset, 0.0);
            }
        }
        Ok(())
    }

    fn position_next_connection(
        &self,
        ws: &mut Workspace,
        bottom: &Row,
    ) -> Result<(), WorkspaceError> {
        if !bottom.has_next_connection {
            return Ok(());
        }
        for elem in &bottom.elements {
            if let ElementKind::NextConnection { connection, .. } = elem.kind {
                return self.set_offset(ws, connection, elem.x_pos, bottom.baseline);
            }
        }
        Ok(())
    }

    fn position_output_connection(&self, ws: &mut Workspace) -> Result<(), WorkspaceError> {
        let info = self.info;
        if let Some(output) = &info.output {
            if let ElementKind::OutputConnection {
                connection,
                connection_offset_x,
                connection_offset_y,
            } = output.kind
            {
                return self.set_offset(
                    ws,
                    connection,
                    info.start_x + connection_offset_x,
                    connection_offset_y,
                );
            }
        }
        Ok(())
    }

    fn position_external_value_connection(
        &self,
        ws: &mut Workspace,
        row: &Row,
    ) -> Result<(), WorkspaceError> {
        if let Some(input) = row.last_input() {
            if let ElementKind::ExternalValueInput {
                connection: Some(conn),
                ..
            } = input.kind
            {
                return self.set_offset(ws, conn, row.x_pos + row.width, row.y_pos);
            }
        }
        Ok(())
    }

    fn position_statement_input_connection(
        &self,
        ws: &mut Workspace,
        row: &Row,
    ) -> Result<(), WorkspaceError> {
        if let Some(input) = row.last_input() {
            if let ElementKind::StatementInput {
                connection: Some(conn),
                notch_offset,
                ..
            } = input.kind
            {
                return self.set_offset(
                    ws,
                    conn,
                    row.x_pos + row.statement_edge + notch_offset,
                    row.y_pos,
                );
            }
        }
        Ok(())
    }

    fn record_size_on_block(&self, ws: &mut Workspace) -> Result<(), WorkspaceError> {
        let info = self.info;
        let block = ws
            .block_mut(info.block)
            .ok_or(WorkspaceError::UnknownBlock(info.block))?;
        block.height = info.height;
        block.width = info.width;
        block.width_with_children = info.width_with_children;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;
    use crate::render::info::RenderInfo;

    fn render(ws: &mut Workspace, block: BlockId) -> RenderResult {
        let c = ConstantProvider::classic();
        let info = RenderInfo::measure(ws, block, &c).unwrap();
        Drawer::new(&c, &info).draw(ws).unwrap()
    }

    #[test]
    fn test_outline_is_one_closed_path() {
        let mut ws = Workspace::new();
        let b = ws.create_block("stack");
        ws.add_previous_connection(b, None).unwrap();
        ws.add_next_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "hello").unwrap();

        let result = render(&mut ws, b);
        assert!(result.outline.starts_with("m "));
        assert!(result.outline.ends_with('z'));
        assert_eq!(result.outline.matches('z').count(), 1);
    }

    #[test]
    fn test_outline_carries_notches() {
        let c = ConstantProvider::classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("stack");
        ws.add_previous_connection(b, None).unwrap();
        ws.add_next_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();

        let result = render(&mut ws, b);
        assert!(result.outline.contains(&c.notch.path_left));
        assert!(result.outline.contains(&c.notch.path_right));
    }

    #[test]
    fn test_output_block_draws_tab() {
        let c = ConstantProvider::classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("value");
        ws.add_output_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "v").unwrap();

        let result = render(&mut ws, b);
        assert!(result.outline.contains(&c.puzzle_tab.path_up));
    }

    #[test]
    fn test_statement_block_draws_inside_corners() {
        let c = ConstantProvider::classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("loop");
        ws.append_statement_input(b, "DO", None).unwrap();

        let result = render(&mut ws, b);
        assert!(result.outline.contains(&c.inside_corners.path_top));
        assert!(result.outline.contains(&c.inside_corners.path_bottom));
        assert!(result.outline.contains(&c.notch.path_right));
    }

    #[test]
    fn test_inline_inputs_cut_separate_paths() {
        let mut ws = Workspace::new();
        let b = ws.create_block("sum");
        ws.append_value_input(b, "A", None).unwrap();
        ws.append_value_input(b, "B", None).unwrap();
        ws.set_inputs_inline(b, true).unwrap();

        let result = render(&mut ws, b);
        assert_eq!(result.inline.matches("M ").count(), 2);
        assert_eq!(result.inline.matches('z').count(), 2);
    }

    #[test]
    fn test_connection_offsets_written_back() {
        let c = ConstantProvider::classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("stack");
        let prev = ws.add_previous_connection(b, None).unwrap();
        let next = ws.add_next_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "hello").unwrap();

        let result = render(&mut ws, b);

        let prev_conn = ws.connection(prev).unwrap();
        assert_eq!(
            (prev_conn.offset_x, prev_conn.offset_y),
            (c.notch_offset_left, 0.0)
        );

        // The next notch hangs below the baseline, offset like the previous
        // notch so stacked blocks line up.
        let next_conn = ws.connection(next).unwrap();
        assert_eq!(next_conn.offset_x, c.notch_offset_left);
        assert_eq!(next_conn.offset_y, result.height - c.notch.height);
    }

    #[test]
    fn test_output_offset_written_back() {
        let c = ConstantProvider::classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("value");
        let out = ws.add_output_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();

        render(&mut ws, b);
        let conn = ws.connection(out).unwrap();
        assert_eq!(conn.offset_x, c.puzzle_tab.width);
        assert_eq!(conn.offset_y, c.tab_offset_from_top);
    }

    #[test]
    fn test_rtl_negates_connection_offsets() {
        let c = ConstantProvider::classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("stack");
        let prev = ws.add_previous_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.set_rtl(b, true).unwrap();

        let result = render(&mut ws, b);
        assert!(result.rtl);
        let conn = ws.connection(prev).unwrap();
        assert_eq!(conn.offset_x, -c.notch_offset_left);
    }

    #[test]
    fn test_size_recorded_on_block() {
        let mut ws = Workspace::new();
        let b = ws.create_block("stack");
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "hello").unwrap();

        let result = render(&mut ws, b);
        let block = ws.block(b).unwrap();
        assert_eq!(block.height, result.height);
        assert_eq!(block.width, result.width);
        assert_eq!(block.width_with_children, result.width_with_children);
        assert!(block.height > 0.0);
        assert!(block.width > 0.0);
    }

    #[test]
    fn test_insertion_marker_hides_fields() {
        let mut ws = Workspace::new();
        let b = ws.create_block("ghost");
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "label").unwrap();
        ws.set_insertion_marker(b, true).unwrap();

        let result = render(&mut ws, b);
        assert!(result.items.iter().all(|item| item.hidden));
        assert!(!result.items.is_empty());
    }

    #[test]
    fn test_statement_connection_sits_at_notch() {
        let c = ConstantProvider::classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("loop");
        let slot = ws.append_statement_input(b, "DO", None).unwrap();

        let info = RenderInfo::measure(&ws, b, &c).unwrap();
        let statement_edge = info.statement_edge;
        Drawer::new(&c, &info).draw(&mut ws).unwrap();

        let conn = ws.connection(slot).unwrap();
        assert_eq!(
            conn.offset_x,
            statement_edge + c.statement_input_notch_offset
        );
    }
}
