//! Block definitions: the JSON shape used to describe a block type.
//!
//! Definitions come in over the wasm boundary or from a file on the CLI and
//! are instantiated into workspace blocks. Workspace persistence is a
//! different concern and lives outside this crate.

use serde::Deserialize;

use crate::block::{Align, BlockId, InputKind};
use crate::workspace::{Workspace, WorkspaceError};

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("invalid block definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// One attachment point on a defined block. An absent `checks` list accepts
/// anything.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ConnectionDef {
    #[serde(default)]
    pub checks: Option<Vec<String>>,
}

/// The kind of a defined input slot.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputKindDef {
    Value,
    Statement,
    Dummy,
}

impl From<InputKindDef> for InputKind {
    fn from(kind: InputKindDef) -> Self {
        match kind {
            InputKindDef::Value => InputKind::Value,
            InputKindDef::Statement => InputKind::Statement,
            InputKindDef::Dummy => InputKind::Dummy,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlignDef {
    #[default]
    Left,
    Centre,
    Right,
}

impl From<AlignDef> for Align {
    fn from(align: AlignDef) -> Self {
        match align {
            AlignDef::Left => Align::Left,
            AlignDef::Centre => Align::Centre,
            AlignDef::Right => Align::Right,
        }
    }
}

/// One input slot: leading field texts, then the connection if the kind
/// carries one.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InputDef {
    pub kind: InputKindDef,
    #[serde(default)]
    pub name: String,
    /// Field texts rendered before the input's connection point.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Accepted type tags for value and statement inputs.
    #[serde(default)]
    pub checks: Option<Vec<String>>,
    #[serde(default)]
    pub align: AlignDef,
}

/// A complete block definition.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BlockDefinition {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub previous: Option<ConnectionDef>,
    #[serde(default)]
    pub next: Option<ConnectionDef>,
    #[serde(default)]
    pub output: Option<ConnectionDef>,
    #[serde(default)]
    pub inputs: Vec<InputDef>,
    /// Whether value inputs share rows instead of stacking.
    #[serde(default)]
    pub inline: bool,
    #[serde(default)]
    pub hat: bool,
    #[serde(default)]
    pub rtl: bool,
    #[serde(default)]
    pub shadow: bool,
}

impl BlockDefinition {
    pub fn from_json(source: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(source)?)
    }
}

impl Workspace {
    /// Build an arena block from a definition.
    pub fn instantiate(&mut self, def: &BlockDefinition) -> Result<BlockId, DefinitionError> {
        let block = self.create_block(&def.block_type);
        self.set_inputs_inline(block, def.inline)?;
        self.set_hat(block, def.hat)?;
        self.set_rtl(block, def.rtl)?;
        self.set_shadow(block, def.shadow)?;

        if let Some(output) = &def.output {
            self.add_output_connection(block, output.checks.clone())?;
        }
        if let Some(previous) = &def.previous {
            self.add_previous_connection(block, previous.checks.clone())?;
        }
        if let Some(next) = &def.next {
            self.add_next_connection(block, next.checks.clone())?;
        }

        for (i, input) in def.inputs.iter().enumerate() {
            match input.kind {
                InputKindDef::Value => {
                    self.append_value_input(block, &input.name, input.checks.clone())?;
                }
                InputKindDef::Statement => {
                    self.append_statement_input(block, &input.name, input.checks.clone())?;
                }
                InputKindDef::Dummy => {
                    self.append_dummy_input(block, &input.name)?;
                }
            }
            for text in &input.fields {
                self.append_field(block, i, text)?;
            }
            self.set_input_align(block, i, input.align.into())?;
        }
        Ok(block)
    }
}
