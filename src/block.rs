//! The block model: blocks, inputs, fields, and icons.
//!
//! Blocks live in a workspace arena and refer to their connections by id;
//! nothing here owns a pointer to anything else.

use std::fmt;

use crate::connection::ConnectionId;

/// Arena id of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// What a slot on a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Accepts a value block via a puzzle tab.
    Value,
    /// Accepts a stack of statement blocks via a notch.
    Statement,
    /// Fields only, no connection.
    Dummy,
}

/// Horizontal alignment of a row's content within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Centre,
    Right,
}

/// A piece of text rendered on a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub text: String,
}

/// A fixed-size marker rendered before a block's first input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    /// Whether the icon disappears when the block is collapsed.
    pub collapse_hidden: bool,
}

/// One slot on a block: fields plus an optional child connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub kind: InputKind,
    pub name: String,
    pub fields: Vec<Field>,
    pub align: Align,
    pub visible: bool,
    /// Present on value and statement inputs only.
    pub connection: Option<ConnectionId>,
}

impl Input {
    pub(crate) fn new(kind: InputKind, name: &str, connection: Option<ConnectionId>) -> Self {
        Self {
            kind,
            name: name.to_string(),
            fields: Vec::new(),
            align: Align::Left,
            visible: true,
            connection,
        }
    }
}

/// A single draggable program construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub block_type: String,
    pub inputs: Vec<Input>,
    pub icons: Vec<Icon>,

    pub previous: Option<ConnectionId>,
    pub next: Option<ConnectionId>,
    pub output: Option<ConnectionId>,

    pub collapsed: bool,
    pub inputs_inline: bool,
    pub rtl: bool,
    pub shadow: bool,
    pub insertion_marker: bool,
    pub movable: bool,
    pub in_flyout: bool,
    pub hat: bool,

    /// Top-left corner in workspace coordinates.
    pub x: f64,
    pub y: f64,

    /// Rendered size, written back after each draw pass.
    pub width: f64,
    pub height: f64,
    pub width_with_children: f64,
}

impl Block {
    pub(crate) fn new(id: BlockId, block_type: &str) -> Self {
        Self {
            id,
            block_type: block_type.to_string(),
            inputs: Vec::new(),
            icons: Vec::new(),
            previous: None,
            next: None,
            output: None,
            collapsed: false,
            inputs_inline: false,
            rtl: false,
            shadow: false,
            insertion_marker: false,
            movable: true,
            in_flyout: false,
            hat: false,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            width_with_children: 0.0,
        }
    }

    /// Kind of the first input in declaration order, visible or not.
    pub fn first_input_kind(&self) -> Option<InputKind> {
        self.inputs.first().map(|i| i.kind)
    }

    /// Kind of the last input in declaration order, visible or not.
    pub fn last_input_kind(&self) -> Option<InputKind> {
        self.inputs.last().map(|i| i.kind)
    }
}
