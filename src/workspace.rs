//! The workspace arena: blocks, connections, and the spatial databases.
//!
//! Blocks and connections are owned by the workspace and referenced by id
//! everywhere else, so disposing a block is a plain arena removal. The
//! workspace is also the only writer of connection positions, which keeps
//! the per-kind databases consistent with what is on screen.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;

use crate::block::{Align, Block, BlockId, Field, Icon, Input, InputKind};
use crate::checker::{CheckReason, ConnectionChecker, DragContext};
use crate::connection::{Connection, ConnectionId, ConnectionKind};
use crate::db::{ConnectionDbSet, DatabaseError};

/// Identifies a workspace; connections from different workspaces never join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkspaceId(pub(crate) u32);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

static NEXT_WORKSPACE_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),
    #[error("block {0} has no input {1}")]
    UnknownInput(BlockId, usize),
    #[error("block {0} already has a conflicting connection")]
    ConflictingConnection(BlockId),
    #[error("connection {0} is already connected")]
    AlreadyConnected(ConnectionId),
    #[error("connection {0} is not connected")]
    NotConnected(ConnectionId),
    #[error("connections cannot be joined: {0}")]
    Rejected(CheckReason),
    #[error("joining {0} under {1} would create a cycle")]
    WouldCycle(BlockId, BlockId),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug)]
pub struct Workspace {
    id: WorkspaceId,
    blocks: HashMap<BlockId, Block>,
    connections: HashMap<ConnectionId, Connection>,
    dbs: ConnectionDbSet,
    next_block_id: u32,
    next_connection_id: u32,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            id: WorkspaceId(NEXT_WORKSPACE_ID.fetch_add(1, Ordering::Relaxed)),
            blocks: HashMap::new(),
            connections: HashMap::new(),
            dbs: ConnectionDbSet::default(),
            next_block_id: 0,
            next_connection_id: 0,
        }
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// The block on the far side of a connection's target, if joined.
    pub fn target_block(&self, conn: &Connection) -> Option<&Block> {
        let target = self.connection(conn.target?)?;
        self.block(target.block)
    }

    pub fn databases(&self) -> &ConnectionDbSet {
        &self.dbs
    }

    // ---- construction ----------------------------------------------------

    pub fn create_block(&mut self, block_type: &str) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, Block::new(id, block_type));
        id
    }

    fn alloc_connection(
        &mut self,
        block: BlockId,
        kind: ConnectionKind,
        checks: Option<Vec<String>>,
    ) -> Result<ConnectionId, WorkspaceError> {
        let (bx, by, in_flyout) = {
            let b = self
                .blocks
                .get(&block)
                .ok_or(WorkspaceError::UnknownBlock(block))?;
            (b.x, b.y, b.in_flyout)
        };
        let id = ConnectionId(self.next_connection_id);
        self.next_connection_id += 1;

        let mut conn = Connection::new(id, kind, block, self.id, checks);
        conn.x = bx;
        conn.y = by;
        if !in_flyout {
            self.dbs.for_kind_mut(kind).add(id, conn.x, conn.y)?;
            conn.in_db = true;
        }
        self.connections.insert(id, conn);
        Ok(id)
    }

    pub fn add_previous_connection(
        &mut self,
        block: BlockId,
        checks: Option<Vec<String>>,
    ) -> Result<ConnectionId, WorkspaceError> {
        {
            let b = self
                .blocks
                .get(&block)
                .ok_or(WorkspaceError::UnknownBlock(block))?;
            if b.output.is_some() || b.previous.is_some() {
                return Err(WorkspaceError::ConflictingConnection(block));
            }
        }
        let c = self.alloc_connection(block, ConnectionKind::PreviousStatement, checks)?;
        if let Some(b) = self.blocks.get_mut(&block) {
            b.previous = Some(c);
        }
        Ok(c)
    }

    pub fn add_next_connection(
        &mut self,
        block: BlockId,
        checks: Option<Vec<String>>,
    ) -> Result<ConnectionId, WorkspaceError> {
        {
            let b = self
                .blocks
                .get(&block)
                .ok_or(WorkspaceError::UnknownBlock(block))?;
            if b.next.is_some() {
                return Err(WorkspaceError::ConflictingConnection(block));
            }
        }
        let c = self.alloc_connection(block, ConnectionKind::NextStatement, checks)?;
        if let Some(b) = self.blocks.get_mut(&block) {
            b.next = Some(c);
        }
        Ok(c)
    }

    pub fn add_output_connection(
        &mut self,
        block: BlockId,
        checks: Option<Vec<String>>,
    ) -> Result<ConnectionId, WorkspaceError> {
        {
            let b = self
                .blocks
                .get(&block)
                .ok_or(WorkspaceError::UnknownBlock(block))?;
            if b.output.is_some() || b.previous.is_some() {
                return Err(WorkspaceError::ConflictingConnection(block));
            }
        }
        let c = self.alloc_connection(block, ConnectionKind::OutputValue, checks)?;
        if let Some(b) = self.blocks.get_mut(&block) {
            b.output = Some(c);
        }
        Ok(c)
    }

    pub fn append_value_input(
        &mut self,
        block: BlockId,
        name: &str,
        checks: Option<Vec<String>>,
    ) -> Result<ConnectionId, WorkspaceError> {
        let c = self.alloc_connection(block, ConnectionKind::InputValue, checks)?;
        if let Some(b) = self.blocks.get_mut(&block) {
            b.inputs.push(Input::new(InputKind::Value, name, Some(c)));
        }
        Ok(c)
    }

    pub fn append_statement_input(
        &mut self,
        block: BlockId,
        name: &str,
        checks: Option<Vec<String>>,
    ) -> Result<ConnectionId, WorkspaceError> {
        let c = self.alloc_connection(block, ConnectionKind::NextStatement, checks)?;
        if let Some(b) = self.blocks.get_mut(&block) {
            b.inputs.push(Input::new(InputKind::Statement, name, Some(c)));
        }
        Ok(c)
    }

    pub fn append_dummy_input(&mut self, block: BlockId, name: &str) -> Result<(), WorkspaceError> {
        let b = self
            .blocks
            .get_mut(&block)
            .ok_or(WorkspaceError::UnknownBlock(block))?;
        b.inputs.push(Input::new(InputKind::Dummy, name, None));
        Ok(())
    }

    pub fn append_field(
        &mut self,
        block: BlockId,
        input: usize,
        text: &str,
    ) -> Result<(), WorkspaceError> {
        let b = self
            .blocks
            .get_mut(&block)
            .ok_or(WorkspaceError::UnknownBlock(block))?;
        let slot = b
            .inputs
            .get_mut(input)
            .ok_or(WorkspaceError::UnknownInput(block, input))?;
        slot.fields.push(Field {
            text: text.to_string(),
        });
        Ok(())
    }

    pub fn add_icon(&mut self, block: BlockId, collapse_hidden: bool) -> Result<(), WorkspaceError> {
        let b = self
            .blocks
            .get_mut(&block)
            .ok_or(WorkspaceError::UnknownBlock(block))?;
        b.icons.push(Icon { collapse_hidden });
        Ok(())
    }

    pub fn input_count(&self, block: BlockId) -> Result<usize, WorkspaceError> {
        Ok(self
            .blocks
            .get(&block)
            .ok_or(WorkspaceError::UnknownBlock(block))?
            .inputs
            .len())
    }

    pub fn set_input_align(
        &mut self,
        block: BlockId,
        input: usize,
        align: Align,
    ) -> Result<(), WorkspaceError> {
        let b = self
            .blocks
            .get_mut(&block)
            .ok_or(WorkspaceError::UnknownBlock(block))?;
        b.inputs
            .get_mut(input)
            .ok_or(WorkspaceError::UnknownInput(block, input))?
            .align = align;
        Ok(())
    }

    pub fn set_input_visible(
        &mut self,
        block: BlockId,
        input: usize,
        visible: bool,
    ) -> Result<(), WorkspaceError> {
        let b = self
            .blocks
            .get_mut(&block)
            .ok_or(WorkspaceError::UnknownBlock(block))?;
        b.inputs
            .get_mut(input)
            .ok_or(WorkspaceError::UnknownInput(block, input))?
            .visible = visible;
        Ok(())
    }

    // ---- flags -----------------------------------------------------------

    fn with_block(
        &mut self,
        block: BlockId,
        f: impl FnOnce(&mut Block),
    ) -> Result<(), WorkspaceError> {
        let b = self
            .blocks
            .get_mut(&block)
            .ok_or(WorkspaceError::UnknownBlock(block))?;
        f(b);
        Ok(())
    }

    pub fn set_collapsed(&mut self, block: BlockId, v: bool) -> Result<(), WorkspaceError> {
        self.with_block(block, |b| b.collapsed = v)
    }

    pub fn set_inputs_inline(&mut self, block: BlockId, v: bool) -> Result<(), WorkspaceError> {
        self.with_block(block, |b| b.inputs_inline = v)
    }

    pub fn set_rtl(&mut self, block: BlockId, v: bool) -> Result<(), WorkspaceError> {
        self.with_block(block, |b| b.rtl = v)
    }

    pub fn set_shadow(&mut self, block: BlockId, v: bool) -> Result<(), WorkspaceError> {
        self.with_block(block, |b| b.shadow = v)
    }

    pub fn set_insertion_marker(&mut self, block: BlockId, v: bool) -> Result<(), WorkspaceError> {
        self.with_block(block, |b| b.insertion_marker = v)
    }

    pub fn set_movable(&mut self, block: BlockId, v: bool) -> Result<(), WorkspaceError> {
        self.with_block(block, |b| b.movable = v)
    }

    pub fn set_hat(&mut self, block: BlockId, v: bool) -> Result<(), WorkspaceError> {
        self.with_block(block, |b| b.hat = v)
    }

    /// Move a block in or out of the flyout. Flyout connections are never
    /// snap targets, so they are drained from (or fed back into) the
    /// databases here.
    pub fn set_in_flyout(&mut self, block: BlockId, in_flyout: bool) -> Result<(), WorkspaceError> {
        let changed = {
            let b = self
                .blocks
                .get_mut(&block)
                .ok_or(WorkspaceError::UnknownBlock(block))?;
            if b.in_flyout == in_flyout {
                false
            } else {
                b.in_flyout = in_flyout;
                true
            }
        };
        if !changed {
            return Ok(());
        }
        for c in self.block_connections(block) {
            let (kind, x, y, in_db) = {
                let conn = self
                    .connections
                    .get(&c)
                    .ok_or(WorkspaceError::UnknownConnection(c))?;
                (conn.kind, conn.x, conn.y, conn.in_db)
            };
            if in_flyout && in_db {
                self.dbs.for_kind_mut(kind).remove(c, y)?;
            } else if !in_flyout && !in_db {
                self.dbs.for_kind_mut(kind).add(c, x, y)?;
            }
            if let Some(conn) = self.connections.get_mut(&c) {
                conn.in_db = !in_flyout;
            }
        }
        Ok(())
    }

    // ---- joining ---------------------------------------------------------

    /// Join two free connections. Splicing into occupied connections is the
    /// drag layer's job; here an occupied endpoint is an error.
    pub fn connect(&mut self, a: ConnectionId, b: ConnectionId) -> Result<(), WorkspaceError> {
        let ca = self
            .connections
            .get(&a)
            .ok_or(WorkspaceError::UnknownConnection(a))?;
        let cb = self
            .connections
            .get(&b)
            .ok_or(WorkspaceError::UnknownConnection(b))?;

        let reason = ConnectionChecker::can_connect_with_reason(self, Some(ca), Some(cb), None);
        if reason != CheckReason::CanConnect {
            debug!("refusing to connect {} to {}: {}", a, b, reason);
            return Err(WorkspaceError::Rejected(reason));
        }
        if ca.is_connected() {
            return Err(WorkspaceError::AlreadyConnected(a));
        }
        if cb.is_connected() {
            return Err(WorkspaceError::AlreadyConnected(b));
        }

        let (sup_block, inf_block) = if ca.kind.is_superior() {
            (ca.block, cb.block)
        } else {
            (cb.block, ca.block)
        };
        if self.is_ancestor(inf_block, sup_block) {
            return Err(WorkspaceError::WouldCycle(inf_block, sup_block));
        }

        if let Some(conn) = self.connections.get_mut(&a) {
            conn.target = Some(b);
        }
        if let Some(conn) = self.connections.get_mut(&b) {
            conn.target = Some(a);
        }
        debug!("connected {} to {}", a, b);
        Ok(())
    }

    pub fn disconnect(&mut self, c: ConnectionId) -> Result<(), WorkspaceError> {
        let target = self
            .connections
            .get(&c)
            .ok_or(WorkspaceError::UnknownConnection(c))?
            .target
            .ok_or(WorkspaceError::NotConnected(c))?;
        if let Some(conn) = self.connections.get_mut(&c) {
            conn.target = None;
        }
        if let Some(conn) = self.connections.get_mut(&target) {
            conn.target = None;
        }
        debug!("disconnected {} from {}", c, target);
        Ok(())
    }

    fn parent_of(&self, block: BlockId) -> Option<BlockId> {
        let b = self.blocks.get(&block)?;
        let up = b.previous.or(b.output)?;
        let conn = self.connections.get(&up)?;
        let target = self.connections.get(&conn.target?)?;
        Some(target.block)
    }

    fn is_ancestor(&self, candidate: BlockId, of: BlockId) -> bool {
        let mut current = of;
        while let Some(parent) = self.parent_of(current) {
            if parent == candidate {
                return true;
            }
            current = parent;
        }
        false
    }

    // ---- geometry --------------------------------------------------------

    /// Record a connection's offset from its block origin and refresh its
    /// absolute position. This is the drawer's write-back channel.
    pub fn set_connection_offset(
        &mut self,
        c: ConnectionId,
        offset_x: f64,
        offset_y: f64,
    ) -> Result<(), WorkspaceError> {
        let (block, kind, old_y, in_db) = {
            let conn = self
                .connections
                .get(&c)
                .ok_or(WorkspaceError::UnknownConnection(c))?;
            (conn.block, conn.kind, conn.y, conn.in_db)
        };
        let (bx, by) = {
            let b = self
                .blocks
                .get(&block)
                .ok_or(WorkspaceError::UnknownBlock(block))?;
            (b.x, b.y)
        };
        let new_x = bx + offset_x;
        let new_y = by + offset_y;

        if in_db {
            self.dbs.for_kind_mut(kind).remove(c, old_y)?;
        }
        if let Some(conn) = self.connections.get_mut(&c) {
            conn.offset_x = offset_x;
            conn.offset_y = offset_y;
            conn.x = new_x;
            conn.y = new_y;
        }
        if in_db {
            self.dbs.for_kind_mut(kind).add(c, new_x, new_y)?;
        }
        Ok(())
    }

    pub fn move_block_to(&mut self, block: BlockId, x: f64, y: f64) -> Result<(), WorkspaceError> {
        let (dx, dy) = {
            let b = self
                .blocks
                .get(&block)
                .ok_or(WorkspaceError::UnknownBlock(block))?;
            (x - b.x, y - b.y)
        };
        self.move_block_by(block, dx, dy)
    }

    /// Translate a block and everything attached below or inside it.
    pub fn move_block_by(&mut self, block: BlockId, dx: f64, dy: f64) -> Result<(), WorkspaceError> {
        {
            let b = self
                .blocks
                .get_mut(&block)
                .ok_or(WorkspaceError::UnknownBlock(block))?;
            b.x += dx;
            b.y += dy;
        }
        for c in self.block_connections(block) {
            let (kind, old_y, in_db, new_x, new_y) = {
                let conn = self
                    .connections
                    .get(&c)
                    .ok_or(WorkspaceError::UnknownConnection(c))?;
                (conn.kind, conn.y, conn.in_db, conn.x + dx, conn.y + dy)
            };
            if in_db {
                self.dbs.for_kind_mut(kind).remove(c, old_y)?;
            }
            if let Some(conn) = self.connections.get_mut(&c) {
                conn.x = new_x;
                conn.y = new_y;
            }
            if in_db {
                self.dbs.for_kind_mut(kind).add(c, new_x, new_y)?;
            }
        }

        let children: Vec<BlockId> = self
            .block_connections(block)
            .into_iter()
            .filter_map(|c| {
                let conn = self.connections.get(&c)?;
                if !conn.kind.is_superior() {
                    return None;
                }
                let target = self.connections.get(&conn.target?)?;
                Some(target.block)
            })
            .collect();
        for child in children {
            self.move_block_by(child, dx, dy)?;
        }
        Ok(())
    }

    pub fn dispose_block(&mut self, block: BlockId) -> Result<(), WorkspaceError> {
        if !self.blocks.contains_key(&block) {
            return Err(WorkspaceError::UnknownBlock(block));
        }
        for c in self.block_connections(block) {
            let (kind, y, in_db, target) = {
                let conn = self
                    .connections
                    .get(&c)
                    .ok_or(WorkspaceError::UnknownConnection(c))?;
                (conn.kind, conn.y, conn.in_db, conn.target)
            };
            if let Some(t) = target {
                if let Some(other) = self.connections.get_mut(&t) {
                    other.target = None;
                }
            }
            if in_db {
                self.dbs.for_kind_mut(kind).remove(c, y)?;
            }
            self.connections.remove(&c);
        }
        self.blocks.remove(&block);
        debug!("disposed {}", block);
        Ok(())
    }

    fn block_connections(&self, block: BlockId) -> Vec<ConnectionId> {
        let Some(b) = self.blocks.get(&block) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        out.extend(b.previous);
        out.extend(b.next);
        out.extend(b.output);
        out.extend(b.inputs.iter().filter_map(|i| i.connection));
        out
    }

    // ---- drag queries ----------------------------------------------------

    /// Connections of the opposite kind within `max_radius`, unfiltered.
    pub fn neighbours(
        &self,
        c: ConnectionId,
        max_radius: f64,
    ) -> Result<Vec<ConnectionId>, WorkspaceError> {
        let conn = self
            .connections
            .get(&c)
            .ok_or(WorkspaceError::UnknownConnection(c))?;
        Ok(self
            .dbs
            .opposite_of(conn.kind)
            .neighbours(conn.x, conn.y, max_radius))
    }

    /// The nearest compatible snap target for a dragged connection, if any.
    pub fn closest_candidate(
        &self,
        c: ConnectionId,
        max_radius: f64,
        dragging: &HashSet<ConnectionId>,
    ) -> Result<Option<ConnectionId>, WorkspaceError> {
        let conn = self
            .connections
            .get(&c)
            .ok_or(WorkspaceError::UnknownConnection(c))?;
        let drag = DragContext {
            max_distance: max_radius,
            dragging,
        };

        let mut best: Option<(ConnectionId, f64)> = None;
        for n in self
            .dbs
            .opposite_of(conn.kind)
            .neighbours(conn.x, conn.y, max_radius)
        {
            let Some(candidate) = self.connections.get(&n) else {
                continue;
            };
            if !ConnectionChecker::can_connect(self, Some(conn), Some(candidate), Some(&drag)) {
                continue;
            }
            let d = conn.distance_from(candidate);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((n, d));
            }
        }
        if let Some((winner, d)) = best {
            debug!("closest candidate for {}: {} at {:.1}px", c, winner, d);
        }
        Ok(best.map(|(n, _)| n))
    }
}
