//! Rendering: measurement and drawing, composed by a [`Renderer`].
//!
//! A renderer is a constants provider plus the two passes that consume it.
//! Variants ("classic", "compact", anything a caller registers) are plain
//! configuration values looked up in a [`RendererRegistry`], not subtypes.

pub mod drawer;
pub mod info;
pub mod measurables;
pub mod rows;

use std::collections::HashMap;

use crate::block::BlockId;
use crate::constants::ConstantProvider;
use crate::workspace::{Workspace, WorkspaceError};

pub use drawer::{Drawer, Item, ItemLayout, RenderResult};
pub use info::RenderInfo;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// Runs the measure and draw passes back to back for one block.
pub struct Renderer {
    constants: ConstantProvider,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(ConstantProvider::classic())
    }
}

impl Renderer {
    pub fn new(constants: ConstantProvider) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &ConstantProvider {
        &self.constants
    }

    /// Measure and draw one block. The workspace is mutated only through
    /// the connection-offset sink and the block's size write-back.
    pub fn render(&self, ws: &mut Workspace, block: BlockId) -> Result<RenderResult, RenderError> {
        let info = RenderInfo::measure(ws, block, &self.constants)?;
        Ok(Drawer::new(&self.constants, &info).draw(ws)?)
    }

    /// Render a block and everything connected below or inside it,
    /// children first so parent measurement sees current child sizes.
    /// Results come back in render order, the root last.
    pub fn render_tree(
        &self,
        ws: &mut Workspace,
        root: BlockId,
    ) -> Result<Vec<(BlockId, RenderResult)>, RenderError> {
        let mut results = Vec::new();
        self.render_subtree(ws, root, &mut results)?;
        Ok(results)
    }

    fn render_subtree(
        &self,
        ws: &mut Workspace,
        block: BlockId,
        results: &mut Vec<(BlockId, RenderResult)>,
    ) -> Result<(), RenderError> {
        for child in child_blocks(ws, block) {
            self.render_subtree(ws, child, results)?;
        }
        let result = self.render(ws, block)?;
        results.push((block, result));
        Ok(())
    }
}

/// Blocks attached below `block`'s superior connections: its inputs and its
/// next connection.
fn child_blocks(ws: &Workspace, block: BlockId) -> Vec<BlockId> {
    let Some(b) = ws.block(block) else {
        return Vec::new();
    };
    let mut connections: Vec<_> = b.inputs.iter().filter_map(|i| i.connection).collect();
    connections.extend(b.next);
    connections
        .into_iter()
        .filter_map(|c| {
            let conn = ws.connection(c)?;
            let target = ws.connection(conn.target?)?;
            Some(target.block)
        })
        .collect()
}

type ConstantsFactory = fn() -> ConstantProvider;

/// Maps renderer names to constants factories.
pub struct RendererRegistry {
    factories: HashMap<String, ConstantsFactory>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RendererRegistry {
    /// A registry with the built-in "classic" and "compact" renderers.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("classic", ConstantProvider::classic);
        registry.register("compact", ConstantProvider::compact);
        registry
    }

    pub fn register(&mut self, name: &str, factory: ConstantsFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Option<Renderer> {
        self.factories.get(name).map(|factory| Renderer::new(factory()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
