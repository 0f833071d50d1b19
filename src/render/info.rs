//! The measurement pass: from a block snapshot to final row geometry.
//!
//! Six phases run in a fixed order, each depending on the previous one:
//! rows are built, element spacing inserted, bounds computed, rows aligned
//! to the block's right edge, spacer rows interleaved, and finally every
//! row and element receives its position. The result is consumed by the
//! drawer and discarded.

use crate::block::{Align, Block, BlockId, Input, InputKind};
use crate::connection::ConnectionId;
use crate::constants::ConstantProvider;
use crate::render::measurables::Element;
use crate::render::rows::{Row, RowKind};
use crate::render::RenderError;
use crate::workspace::Workspace;

/// All sizing information needed to draw one block. Ephemeral: one instance
/// per measure pass, discarded after drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInfo {
    pub block: BlockId,
    /// Top row, input and spacer rows, bottom row, in draw order.
    pub rows: Vec<Row>,
    /// The output tab, drawn on the left edge outside any row.
    pub output: Option<Element>,
    /// Icons suppressed because the block is collapsed.
    pub hidden_icons: Vec<Element>,

    pub is_inline: bool,
    pub is_collapsed: bool,
    pub is_insertion_marker: bool,
    pub rtl: bool,

    /// Width of the block body, excluding connected children.
    pub width: f64,
    pub height: f64,
    pub width_with_children: f64,
    /// Shared left edge of every statement cutout on the block.
    pub statement_edge: f64,
    /// Drawing start offset; nonzero when an output tab claims the left edge.
    pub start_x: f64,
    pub start_y: f64,
}

impl RenderInfo {
    /// Run the full measurement pass over `block`.
    pub fn measure(
        ws: &Workspace,
        block: BlockId,
        constants: &ConstantProvider,
    ) -> Result<Self, RenderError> {
        let b = ws.block(block).ok_or(RenderError::UnknownBlock(block))?;
        let mut info = Self {
            block,
            rows: Vec::new(),
            output: b.output.map(|c| Element::output_connection(constants, c)),
            hidden_icons: Vec::new(),
            is_inline: b.inputs_inline && !b.collapsed,
            is_collapsed: b.collapsed,
            is_insertion_marker: b.insertion_marker,
            rtl: b.rtl,
            width: 0.0,
            height: 0.0,
            width_with_children: 0.0,
            statement_edge: 0.0,
            start_x: 0.0,
            start_y: 0.0,
        };
        info.create_rows(ws, b, constants);
        info.add_elem_spacing(constants);
        info.compute_bounds(constants);
        info.align_row_elements();
        info.add_row_spacing(constants);
        info.finalize(ws, b);
        Ok(info)
    }

    // ---- phase 1: rows ---------------------------------------------------

    fn create_rows(&mut self, ws: &Workspace, b: &Block, c: &ConstantProvider) {
        let mut top = Row::new(RowKind::Top, c);
        self.populate_top_row(ws, b, c, &mut top);
        self.rows.push(top);

        let mut active = Row::new(RowKind::Input, c);

        // Icons always go on the first row, before anything else.
        for (i, icon) in b.icons.iter().enumerate() {
            let elem = Element::icon(c, i);
            if self.is_collapsed && icon.collapse_hidden {
                self.hidden_icons.push(elem);
            } else {
                active.elements.push(elem);
            }
        }

        if self.is_collapsed {
            // Collapsed blocks show a torn edge instead of their inputs.
            active.has_jagged_edge = true;
            active.elements.push(Element::jagged_edge(c));
        } else {
            let mut last_kind = None;
            for (i, input) in b.inputs.iter().enumerate() {
                if !input.visible {
                    continue;
                }
                if self.should_start_new_row(input.kind, last_kind) {
                    self.rows.push(active);
                    active = Row::new(RowKind::Input, c);
                }
                for (j, field) in input.fields.iter().enumerate() {
                    active.elements.push(Element::field(c, &field.text, i, j));
                }
                self.add_input(ws, b, input, c, &mut active);
                last_kind = Some(input.kind);
            }
        }

        // An empty trailing row is dropped rather than emitted.
        if !active.elements.is_empty() || active.has_dummy_input {
            self.rows.push(active);
        }

        let mut bottom = Row::new(RowKind::Bottom, c);
        self.populate_bottom_row(ws, b, c, &mut bottom);
        self.rows.push(bottom);
    }

    fn populate_top_row(&mut self, ws: &Workspace, b: &Block, c: &ConstantProvider, row: &mut Row) {
        let has_previous = b.previous.is_some();
        let has_hat = (b.hat || c.add_start_hats) && b.output.is_none() && !has_previous;
        let prev_connected = b
            .previous
            .and_then(|p| ws.connection(p))
            .is_some_and(|p| p.is_connected());

        let left_square = b.output.is_some() || has_hat || prev_connected;
        row.elements.push(if left_square {
            Element::square_corner(c, false)
        } else {
            Element::round_corner(c, false)
        });

        if has_hat {
            row.elements.push(Element::hat(c));
        } else if let Some(prev) = b.previous {
            row.has_previous_connection = true;
            row.elements.push(Element::previous_connection(c, prev));
        }

        let precedes_statement = b.first_input_kind() == Some(InputKind::Statement);
        row.min_height = if precedes_statement && !self.is_collapsed {
            c.top_row_precedes_statement_min_height
        } else {
            c.top_row_min_height
        };

        let right_square = b.output.is_some() || prev_connected;
        row.elements.push(if right_square {
            Element::square_corner(c, true)
        } else {
            Element::round_corner(c, true)
        });
    }

    fn populate_bottom_row(
        &mut self,
        ws: &Workspace,
        b: &Block,
        c: &ConstantProvider,
        row: &mut Row,
    ) {
        row.has_next_connection = b.next.is_some();

        let follows_statement = b.last_input_kind() == Some(InputKind::Statement);
        row.min_height = if follows_statement && !self.is_collapsed {
            c.bottom_row_after_statement_min_height
        } else {
            c.bottom_row_min_height
        };

        let next_connected = b
            .next
            .and_then(|n| ws.connection(n))
            .is_some_and(|n| n.is_connected());
        let square = b.output.is_some() || next_connected;

        row.elements.push(if square {
            Element::square_corner(c, false)
        } else {
            Element::round_corner(c, false)
        });
        if let Some(next) = b.next {
            row.elements.push(Element::next_connection(c, next));
        }
        row.elements.push(if square {
            Element::square_corner(c, true)
        } else {
            Element::round_corner(c, true)
        });
    }

    fn should_start_new_row(&self, kind: InputKind, last: Option<InputKind>) -> bool {
        // The first input joins the row that holds the icons.
        let Some(last) = last else {
            return false;
        };
        // A statement input, and whatever follows one, always starts fresh.
        if kind == InputKind::Statement || last == InputKind::Statement {
            return true;
        }
        // Value and dummy inputs share a row only when the block is inline.
        if kind == InputKind::Value || kind == InputKind::Dummy {
            return !self.is_inline;
        }
        false
    }

    fn add_input(
        &mut self,
        ws: &Workspace,
        b: &Block,
        input: &Input,
        c: &ConstantProvider,
        active: &mut Row,
    ) {
        match input.kind {
            InputKind::Value if self.is_inline => {
                let connected = self.connected_block_size(ws, input.connection);
                active
                    .elements
                    .push(Element::inline_input(c, input.connection, connected));
                active.has_inline_input = true;
            }
            InputKind::Statement => {
                let connected = self.connected_block_size(ws, input.connection);
                active
                    .elements
                    .push(Element::statement_input(c, input.connection, connected));
                active.has_statement = true;
            }
            InputKind::Value => {
                let connected = self.connected_block_size(ws, input.connection);
                active
                    .elements
                    .push(Element::external_value_input(c, input.connection, connected));
                active.has_external_input = true;
            }
            InputKind::Dummy => {
                // No visual representation, but it still reserves height.
                let min = if b.shadow {
                    c.dummy_input_shadow_min_height
                } else {
                    c.dummy_input_min_height
                };
                active.min_height = active.min_height.max(min);
                active.has_dummy_input = true;
            }
        }
        if active.align.is_none() {
            active.align = Some(input.align);
        }
    }

    /// Size of the block connected to an input, if any. Children are always
    /// rendered before their parents, so their sizes are current.
    fn connected_block_size(
        &self,
        ws: &Workspace,
        connection: Option<ConnectionId>,
    ) -> Option<(f64, f64)> {
        let conn = ws.connection(connection?)?;
        let target = ws.connection(conn.target?)?;
        let child = ws.block(target.block)?;
        Some((child.width_with_children, child.height))
    }

    // ---- phase 2: element spacing ----------------------------------------

    fn add_elem_spacing(&mut self, c: &ConstantProvider) {
        for row in &mut self.rows {
            let old = std::mem::take(&mut row.elements);
            if row.starts_with_elem_spacer() {
                row.elements
                    .push(Element::spacer(Self::in_row_spacing(c, None, old.first())));
            }
            if old.is_empty() {
                continue;
            }
            let mut spacings = Vec::with_capacity(old.len() - 1);
            for pair in old.windows(2) {
                spacings.push(Self::in_row_spacing(c, Some(&pair[0]), Some(&pair[1])));
            }
            let trailing = row
                .ends_with_elem_spacer()
                .then(|| Self::in_row_spacing(c, old.last(), None));
            for (e, elem) in old.into_iter().enumerate() {
                row.elements.push(elem);
                if e < spacings.len() {
                    row.elements.push(Element::spacer(spacings[e]));
                }
            }
            if let Some(width) = trailing {
                row.elements.push(Element::spacer(width));
            }
        }
    }

    /// Spacer width between two adjacent elements, either of which may be
    /// the row edge.
    fn in_row_spacing(c: &ConstantProvider, prev: Option<&Element>, next: Option<&Element>) -> f64 {
        if prev.is_none() {
            // Statement cutouts get their own left padding.
            if next.is_some_and(Element::is_statement_input) {
                return c.statement_input_padding_left;
            }
        }
        if let Some(prev) = prev {
            // Inputs against the end of the row.
            if prev.is_input() && next.is_none() {
                if prev.is_external_input() || prev.is_statement_input() {
                    return c.no_padding;
                }
                if prev.is_inline_input() {
                    return c.large_padding;
                }
            }
            // Corners before a previous/next notch keep it at its offset.
            if let Some(next) = next {
                if next.is_previous_connection() || next.is_next_connection() {
                    if let Some(offset) = next.notch_offset() {
                        if prev.is_left_square_corner() {
                            return offset;
                        }
                        if prev.is_left_round_corner() {
                            return offset - c.corner_radius;
                        }
                    }
                }
            }
        }
        c.medium_padding
    }

    // ---- phase 3: bounds -------------------------------------------------

    fn compute_bounds(&mut self, c: &ConstantProvider) {
        for row in &mut self.rows {
            row.measure();
        }

        let mut widest_statement_fields = 0.0f64;
        let mut widest_plain_row = 0.0f64;
        let mut widest_connected = 0.0f64;
        let mut has_statement_row = false;
        for row in &self.rows {
            if row.has_statement {
                has_statement_row = true;
                if let Some(input) = row.last_input() {
                    widest_statement_fields =
                        widest_statement_fields.max(row.width - input.width);
                }
            } else {
                widest_plain_row = widest_plain_row.max(row.width);
            }
            widest_connected = widest_connected.max(row.width_with_connected_blocks);
        }

        // Statement cutouts share one edge, past the content of every other
        // row so the cutout never overlaps field content elsewhere.
        let statement_edge = if has_statement_row {
            widest_statement_fields.max(widest_plain_row)
        } else {
            0.0
        };

        let mut block_width = widest_plain_row.max(c.min_block_width);
        for row in &mut self.rows {
            if row.has_statement {
                row.statement_edge = statement_edge;
                if let Some(input) = row.last_input() {
                    block_width = block_width.max(statement_edge + input.width);
                }
            }
        }

        self.statement_edge = statement_edge;
        self.width = block_width;
        self.width_with_children = block_width.max(widest_connected);

        if let Some(output) = &self.output {
            self.start_x = output.width;
            self.width += output.width;
            self.width_with_children += output.width;
        }
    }

    // ---- phase 4: alignment ----------------------------------------------

    fn align_row_elements(&mut self) {
        for i in 0..self.rows.len() {
            if self.rows[i].has_statement {
                self.align_statement_row(i);
            } else {
                let desired = self.width - self.start_x;
                let missing = desired - self.rows[i].width;
                if missing > 0.0 {
                    Self::add_alignment_padding(&mut self.rows[i], missing);
                }
                if matches!(self.rows[i].kind, RowKind::Top | RowKind::Bottom) {
                    self.rows[i].width_with_connected_blocks = self.rows[i].width;
                }
            }
        }
    }

    /// Grow a row by `missing`, placing the extra space according to the
    /// row's alignment.
    fn add_alignment_padding(row: &mut Row, missing: f64) {
        if row.has_external_input || row.has_statement {
            row.width_with_connected_blocks += missing;
        }
        let first = row.first_spacer_index();
        let last = row.last_spacer_index();
        match row.align.unwrap_or_default() {
            Align::Left => {
                if let Some(i) = last {
                    row.elements[i].width += missing;
                }
            }
            Align::Centre => {
                if let Some(i) = first {
                    row.elements[i].width += missing / 2.0;
                }
                if let Some(i) = last {
                    row.elements[i].width += missing / 2.0;
                }
            }
            Align::Right => {
                if let Some(i) = first {
                    row.elements[i].width += missing;
                }
            }
        }
        row.width += missing;
    }

    /// Statement rows add space in two places: padding up to the shared
    /// statement edge, then the statement input itself stretches to the
    /// block's right edge.
    fn align_statement_row(&mut self, i: usize) {
        let statement_edge = self.statement_edge;
        let desired = self.width - self.start_x;
        let row = &mut self.rows[i];
        let Some(input_idx) = row.last_input_index() else {
            return;
        };

        let current = row.width - row.elements[input_idx].width;
        let missing = statement_edge - current;
        if missing > 0.0 {
            Self::add_alignment_padding(row, missing);
        }

        let delta = desired - row.width;
        row.elements[input_idx].width += delta;
        row.width += delta;
        let row_height = row.height;
        let input = &mut row.elements[input_idx];
        input.height = input.height.max(row_height);

        row.width_with_connected_blocks = row
            .width
            .max(statement_edge + row.connected_block_widths);
    }

    // ---- phase 5: row spacing --------------------------------------------

    fn add_row_spacing(&mut self, c: &ConstantProvider) {
        let old = std::mem::take(&mut self.rows);
        let statement_flags: Vec<bool> = old.iter().map(|r| r.has_statement).collect();
        let count = old.len();
        let width = self.width - self.start_x;

        for (r, row) in old.into_iter().enumerate() {
            // The top row's minimum height already supplies the gap above
            // the first input row, so no spacer follows it.
            let is_top = matches!(row.kind, RowKind::Top);
            self.rows.push(row);
            if r + 1 < count && !is_top {
                let mut spacer = Row::spacer(c, c.medium_padding, width);
                spacer.follows_statement = statement_flags[r];
                spacer.precedes_statement = statement_flags[r + 1];
                self.rows.push(spacer);
            }
        }
    }

    // ---- phase 6: positions ----------------------------------------------

    fn finalize(&mut self, ws: &Workspace, b: &Block) {
        let mut widest_connected = 0.0f64;
        let mut y_cursor = 0.0;
        for row in &mut self.rows {
            row.y_pos = y_cursor;
            row.x_pos = self.start_x;
            y_cursor += row.height;
            widest_connected = widest_connected.max(row.width_with_connected_blocks);
        }
        for row in &mut self.rows {
            Self::record_elem_positions(row);
        }

        // A value block heading a statement stack reports the stack's width.
        if self.output.is_some() {
            let next_child = b
                .next
                .and_then(|n| ws.connection(n))
                .and_then(|n| n.target)
                .and_then(|t| ws.connection(t))
                .and_then(|t| ws.block(t.block));
            if let Some(child) = next_child {
                widest_connected = widest_connected.max(child.width_with_children);
            }
        }

        self.width_with_children = widest_connected + self.start_x;
        self.height = y_cursor;
        self.start_y = self.rows.first().map_or(0.0, |r| r.capline);
        if let Some(bottom) = self.rows.last_mut() {
            bottom.baseline = y_cursor - bottom.descender_height;
        }
    }

    fn record_elem_positions(row: &mut Row) {
        let kind = row.kind;
        let (y_pos, height) = (row.y_pos, row.height);
        let capline = row.capline;
        let descender = row.descender_height;
        let mut x_cursor = row.x_pos;
        for elem in &mut row.elements {
            // Spacers stretch to the finalized row height.
            if elem.is_spacer() {
                elem.height = height;
            }
            elem.x_pos = x_cursor;
            elem.centerline = if elem.is_spacer() {
                y_pos + elem.height / 2.0
            } else {
                match kind {
                    RowKind::Bottom => {
                        let baseline = y_pos + height - descender;
                        if elem.is_next_connection() {
                            baseline + elem.height / 2.0
                        } else {
                            baseline - elem.height / 2.0
                        }
                    }
                    RowKind::Top => {
                        if elem.is_hat() {
                            capline - elem.height / 2.0
                        } else {
                            capline + elem.height / 2.0
                        }
                    }
                    _ => y_pos + height / 2.0,
                }
            };
            x_cursor += elem.width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;

    fn classic() -> ConstantProvider {
        ConstantProvider::classic()
    }

    fn row_kinds(info: &RenderInfo) -> Vec<RowKind> {
        info.rows.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_two_dummy_inputs_make_six_rows() {
        let mut ws = Workspace::new();
        let b = ws.create_block("labels");
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "first").unwrap();
        ws.append_dummy_input(b, "B").unwrap();
        ws.append_field(b, 1, "second").unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        assert_eq!(
            row_kinds(&info),
            vec![
                RowKind::Top,
                RowKind::Input,
                RowKind::Spacer,
                RowKind::Input,
                RowKind::Spacer,
                RowKind::Bottom,
            ]
        );
        let total: f64 = info.rows.iter().map(|r| r.height).sum();
        assert_eq!(info.height, total);
    }

    #[test]
    fn test_row_positions_are_contiguous() {
        let mut ws = Workspace::new();
        let b = ws.create_block("stack");
        ws.add_previous_connection(b, None).unwrap();
        ws.add_next_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "do a thing").unwrap();
        ws.append_statement_input(b, "DO", None).unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        for pair in info.rows.windows(2) {
            assert_eq!(pair[0].y_pos + pair[0].height, pair[1].y_pos);
        }
        let last = info.rows.last().unwrap();
        assert_eq!(last.y_pos + last.height, info.height);
    }

    #[test]
    fn test_rows_align_to_block_width() {
        let mut ws = Workspace::new();
        let b = ws.create_block("mixed");
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "a much longer label").unwrap();
        ws.append_dummy_input(b, "B").unwrap();
        ws.append_field(b, 1, "x").unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        for row in &info.rows {
            assert_eq!(row.width, info.width - info.start_x, "{:?}", row.kind);
        }
    }

    #[test]
    fn test_element_positions_monotonic_and_sum_to_width() {
        let mut ws = Workspace::new();
        let b = ws.create_block("stack");
        ws.add_previous_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "label").unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        for row in &info.rows {
            let mut x = row.x_pos;
            for elem in &row.elements {
                assert_eq!(elem.x_pos, x);
                x += elem.width;
            }
            assert_eq!(x, row.x_pos + row.width);
        }
    }

    #[test]
    fn test_statement_edge_clears_sibling_row() {
        let c = classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("if");
        ws.append_value_input(b, "COND", None).unwrap();
        ws.append_field(b, 0, "if").unwrap();
        ws.append_statement_input(b, "DO", None).unwrap();

        let info = RenderInfo::measure(&ws, b, &c).unwrap();

        // The sibling value row's natural content: leading spacer, the "if"
        // field, a spacer, and the value tab flush against the row end.
        let sibling_content =
            c.medium_padding + c.text_width("if") + c.medium_padding + c.puzzle_tab.width;
        assert_eq!(info.statement_edge, sibling_content);

        // The statement row reaches the block's right edge.
        let statement_row = info.rows.iter().find(|r| r.has_statement).unwrap();
        assert_eq!(statement_row.width, info.width - info.start_x);
    }

    #[test]
    fn test_statement_input_stretches_to_edge() {
        let mut ws = Workspace::new();
        let b = ws.create_block("loop");
        ws.append_dummy_input(b, "HEAD").unwrap();
        ws.append_field(b, 0, "a long header label").unwrap();
        ws.append_statement_input(b, "DO", None).unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        let row = info.rows.iter().find(|r| r.has_statement).unwrap();
        let input = row.last_input().unwrap();
        assert_eq!(input.x_pos + input.width, info.width);
        assert_eq!(input.x_pos, info.statement_edge);
    }

    #[test]
    fn test_output_offsets_start_x() {
        let c = classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("value");
        ws.add_output_connection(b, None).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "val").unwrap();

        let info = RenderInfo::measure(&ws, b, &c).unwrap();
        assert_eq!(info.start_x, c.puzzle_tab.width);
        for row in &info.rows {
            assert_eq!(row.x_pos, c.puzzle_tab.width);
        }
    }

    #[test]
    fn test_collapsed_block_shows_jagged_edge() {
        let mut ws = Workspace::new();
        let b = ws.create_block("big");
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "hidden content").unwrap();
        ws.append_statement_input(b, "DO", None).unwrap();
        ws.set_collapsed(b, true).unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        assert!(info.rows.iter().any(|r| r.has_jagged_edge));
        assert!(info.rows.iter().all(|r| !r.has_statement));
    }

    #[test]
    fn test_collapse_hides_flagged_icons() {
        let mut ws = Workspace::new();
        let b = ws.create_block("commented");
        ws.add_icon(b, true).unwrap();
        ws.add_icon(b, false).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.set_collapsed(b, true).unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        assert_eq!(info.hidden_icons.len(), 1);
        let shown: usize = info
            .rows
            .iter()
            .map(|r| r.elements.iter().filter(|e| e.is_icon()).count())
            .sum();
        assert_eq!(shown, 1);
    }

    #[test]
    fn test_inline_inputs_share_a_row() {
        let mut ws = Workspace::new();
        let b = ws.create_block("sum");
        ws.append_value_input(b, "A", None).unwrap();
        ws.append_value_input(b, "B", None).unwrap();
        ws.set_inputs_inline(b, true).unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        let input_rows: Vec<&Row> = info
            .rows
            .iter()
            .filter(|r| r.kind == RowKind::Input)
            .collect();
        assert_eq!(input_rows.len(), 1);
        assert!(input_rows[0].has_inline_input);
        assert_eq!(
            input_rows[0]
                .elements
                .iter()
                .filter(|e| e.is_inline_input())
                .count(),
            2
        );
    }

    #[test]
    fn test_invisible_inputs_are_skipped() {
        let mut ws = Workspace::new();
        let b = ws.create_block("partial");
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "shown").unwrap();
        ws.append_dummy_input(b, "B").unwrap();
        ws.append_field(b, 1, "hidden").unwrap();
        ws.set_input_visible(b, 1, false).unwrap();

        let info = RenderInfo::measure(&ws, b, &classic()).unwrap();
        let input_rows = info
            .rows
            .iter()
            .filter(|r| r.kind == RowKind::Input)
            .count();
        assert_eq!(input_rows, 1);
    }

    #[test]
    fn test_remeasure_is_deterministic() {
        let mut ws = Workspace::new();
        let b = ws.create_block("repeat");
        ws.add_previous_connection(b, None).unwrap();
        ws.add_next_connection(b, None).unwrap();
        ws.append_value_input(b, "TIMES", None).unwrap();
        ws.append_field(b, 0, "repeat").unwrap();
        ws.append_statement_input(b, "DO", None).unwrap();

        let c = classic();
        let first = RenderInfo::measure(&ws, b, &c).unwrap();
        let second = RenderInfo::measure(&ws, b, &c).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_hat_raises_capline() {
        let mut ws = Workspace::new();
        let b = ws.create_block("event");
        ws.set_hat(b, true).unwrap();
        ws.append_dummy_input(b, "A").unwrap();
        ws.append_field(b, 0, "when started").unwrap();

        let c = classic();
        let info = RenderInfo::measure(&ws, b, &c).unwrap();
        assert_eq!(info.start_y, c.start_hat.height);
        assert_eq!(info.rows[0].ascender_height, c.start_hat.height);
    }

    #[test]
    fn test_statement_min_heights_apply() {
        let c = classic();
        let mut ws = Workspace::new();
        let b = ws.create_block("wrap");
        ws.append_statement_input(b, "DO", None).unwrap();

        let info = RenderInfo::measure(&ws, b, &c).unwrap();
        assert_eq!(
            info.rows.first().unwrap().min_height,
            c.top_row_precedes_statement_min_height
        );
        assert_eq!(
            info.rows.last().unwrap().min_height,
            c.bottom_row_after_statement_min_height
        );
    }
}
