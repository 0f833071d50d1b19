//! The connection checker: may these two connections be joined?
//!
//! Three gates run in order. The safety gate rules out structurally
//! impossible pairs, the type gate compares check lists, and the drag gate
//! applies the looser splice rules used while the user drags a block.
//! "Cannot connect" is a routine answer on every drag frame, so the checker
//! returns reason values and never fails.

use std::collections::HashSet;
use std::fmt;

use log::trace;

use crate::connection::{Connection, ConnectionId, ConnectionKind};
use crate::workspace::Workspace;

/// The outcome of a compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckReason {
    CanConnect,
    SelfConnection,
    WrongType,
    TargetNull,
    ChecksFailed,
    DifferentWorkspaces,
    ShadowParent,
    DragChecksFailed,
}

impl fmt::Display for CheckReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CanConnect => "can connect",
            Self::SelfConnection => "self connection",
            Self::WrongType => "wrong type",
            Self::TargetNull => "target null",
            Self::ChecksFailed => "checks failed",
            Self::DifferentWorkspaces => "different workspaces",
            Self::ShadowParent => "shadow parent",
            Self::DragChecksFailed => "drag checks failed",
        };
        f.write_str(name)
    }
}

/// Drag-frame state, passed explicitly so the checker stays a pure function
/// of its arguments.
#[derive(Debug, Clone, Copy)]
pub struct DragContext<'a> {
    /// Snap radius in workspace units.
    pub max_distance: f64,
    /// Connections belonging to the stack currently being dragged.
    pub dragging: &'a HashSet<ConnectionId>,
}

/// Stateless predicate over two connections.
pub struct ConnectionChecker;

impl ConnectionChecker {
    /// Whether the connections may be joined. Drag rules apply only when a
    /// [`DragContext`] is supplied.
    pub fn can_connect(
        ws: &Workspace,
        a: Option<&Connection>,
        b: Option<&Connection>,
        drag: Option<&DragContext<'_>>,
    ) -> bool {
        Self::can_connect_with_reason(ws, a, b, drag) == CheckReason::CanConnect
    }

    /// The first failing gate's reason, or [`CheckReason::CanConnect`].
    pub fn can_connect_with_reason(
        ws: &Workspace,
        a: Option<&Connection>,
        b: Option<&Connection>,
        drag: Option<&DragContext<'_>>,
    ) -> CheckReason {
        let safety = Self::do_safety_checks(ws, a, b);
        if safety != CheckReason::CanConnect {
            trace!("rejected candidate: {}", safety);
            return safety;
        }
        // Both ends exist once the safety gate passes.
        let (Some(a), Some(b)) = (a, b) else {
            return CheckReason::TargetNull;
        };
        if !Self::do_type_checks(a, b) {
            trace!("rejected candidate {} for {}: checks failed", b.id, a.id);
            return CheckReason::ChecksFailed;
        }
        if let Some(drag) = drag {
            if !Self::do_drag_checks(ws, a, b, drag) {
                trace!("rejected candidate {} for {}: drag checks failed", b.id, a.id);
                return CheckReason::DragChecksFailed;
            }
        }
        CheckReason::CanConnect
    }

    /// Structural legality: both ends exist, different blocks in the same
    /// workspace, opposite kinds, and no shadow block acquiring a real child.
    pub fn do_safety_checks(
        ws: &Workspace,
        a: Option<&Connection>,
        b: Option<&Connection>,
    ) -> CheckReason {
        let (Some(a), Some(b)) = (a, b) else {
            return CheckReason::TargetNull;
        };
        let (superior, inferior) = if a.kind.is_superior() { (a, b) } else { (b, a) };
        // Block ids are workspace-local, so same-block means same workspace too.
        if superior.block == inferior.block && superior.workspace == inferior.workspace {
            return CheckReason::SelfConnection;
        }
        if b.kind != a.kind.opposite() {
            return CheckReason::WrongType;
        }
        if a.workspace != b.workspace {
            return CheckReason::DifferentWorkspaces;
        }
        let (Some(parent), Some(child)) = (ws.block(superior.block), ws.block(inferior.block))
        else {
            return CheckReason::TargetNull;
        };
        if parent.shadow && !child.shadow {
            return CheckReason::ShadowParent;
        }
        CheckReason::CanConnect
    }

    /// Check-list compatibility. A missing or empty list accepts anything;
    /// otherwise the lists must share at least one tag. Commutative.
    pub fn do_type_checks(a: &Connection, b: &Connection) -> bool {
        match (&a.checks, &b.checks) {
            (Some(one), Some(two)) if !one.is_empty() && !two.is_empty() => {
                one.iter().any(|tag| two.contains(tag))
            }
            _ => true,
        }
    }

    /// The looser rules applied while dragging: distance gating, insertion
    /// markers, and per-kind occupancy rules. `a` is the dragged connection
    /// and `b` the stationary candidate.
    pub fn do_drag_checks(
        ws: &Workspace,
        a: &Connection,
        b: &Connection,
        drag: &DragContext<'_>,
    ) -> bool {
        if a.distance_from(b) > drag.max_distance {
            return false;
        }
        let Some(target_block) = ws.block(b.block) else {
            return false;
        };
        // Insertion markers are never real targets.
        if target_block.insertion_marker {
            return false;
        }
        match b.kind {
            ConnectionKind::PreviousStatement => {
                if !Self::can_connect_to_previous(ws, a, b, drag) {
                    return false;
                }
            }
            ConnectionKind::OutputValue => {
                // Outputs have a single owner; no splicing on either side.
                let occupied_by_real = ws
                    .target_block(b)
                    .is_some_and(|block| !block.insertion_marker);
                if occupied_by_real || a.is_connected() {
                    return false;
                }
            }
            ConnectionKind::InputValue => {
                // Splicing into a value input is fine unless the occupant
                // can neither move out of the way nor be replaced.
                if let Some(occupant) = ws.target_block(b) {
                    if !occupant.movable && !occupant.shadow {
                        return false;
                    }
                }
            }
            ConnectionKind::NextStatement => {
                // A block with no next connection may not bump a real
                // multi-block stack; covering a shadow or a terminal block
                // is fine.
                if b.is_connected() {
                    let dragger_has_next =
                        ws.block(a.block).is_some_and(|block| block.next.is_some());
                    if let Some(occupant) = ws.target_block(b) {
                        if !dragger_has_next && !occupant.shadow && occupant.next.is_some() {
                            return false;
                        }
                    }
                }
            }
        }
        // Never connect to anything that is moving along with the drag.
        !drag.dragging.contains(&b.id)
    }

    /// Rules for a previous-kind candidate during a drag.
    fn can_connect_to_previous(
        ws: &Workspace,
        a: &Connection,
        b: &Connection,
        drag: &DragContext<'_>,
    ) -> bool {
        // A next connection never disconnects itself mid-drag.
        if a.is_connected() {
            return false;
        }
        if drag.dragging.contains(&b.id) {
            return false;
        }
        if !b.is_connected() {
            return true;
        }
        let Some(occupant) = ws.target_block(b) else {
            return false;
        };
        if !occupant.insertion_marker {
            return false;
        }
        // A marker at the top of its stack may still be covered; one that is
        // mid-stack may not.
        match occupant.previous.and_then(|p| ws.connection(p)) {
            Some(prev) => !prev.is_connected(),
            None => true,
        }
    }

    /// Developer-facing description of a reason code, for logging only.
    pub fn error_message(reason: CheckReason) -> &'static str {
        match reason {
            CheckReason::CanConnect => "Connection is allowed.",
            CheckReason::SelfConnection => "Attempted to connect a block to itself.",
            CheckReason::WrongType => "Connection kinds are not opposites.",
            CheckReason::TargetNull => "Target connection is null.",
            CheckReason::ChecksFailed => "Connection type checks failed.",
            CheckReason::DifferentWorkspaces => "Blocks are on different workspaces.",
            CheckReason::ShadowParent => "Connecting a real block under a shadow block.",
            CheckReason::DragChecksFailed => "Drag checks failed.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;
    use crate::workspace::Workspace;

    fn conn<'a>(ws: &'a Workspace, id: ConnectionId) -> &'a Connection {
        ws.connection(id).unwrap()
    }

    fn check(ws: &Workspace, a: ConnectionId, b: ConnectionId) -> CheckReason {
        ConnectionChecker::can_connect_with_reason(ws, Some(conn(ws, a)), Some(conn(ws, b)), None)
    }

    fn drag_check(
        ws: &Workspace,
        a: ConnectionId,
        b: ConnectionId,
        dragging: &HashSet<ConnectionId>,
    ) -> bool {
        let drag = DragContext {
            max_distance: 1000.0,
            dragging,
        };
        ConnectionChecker::can_connect(ws, Some(conn(ws, a)), Some(conn(ws, b)), Some(&drag))
    }

    fn statement_pair(ws: &mut Workspace) -> (BlockId, ConnectionId, BlockId, ConnectionId) {
        let a = ws.create_block("first");
        let a_next = ws.add_next_connection(a, None).unwrap();
        let b = ws.create_block("second");
        let b_prev = ws.add_previous_connection(b, None).unwrap();
        (a, a_next, b, b_prev)
    }

    #[test]
    fn test_target_null() {
        let ws = Workspace::new();
        assert_eq!(
            ConnectionChecker::can_connect_with_reason(&ws, None, None, None),
            CheckReason::TargetNull
        );
    }

    #[test]
    fn test_self_connection_symmetric() {
        let mut ws = Workspace::new();
        let b = ws.create_block("loop");
        let slot = ws.append_statement_input(b, "DO", None).unwrap();
        let prev = ws.add_previous_connection(b, None).unwrap();
        assert_eq!(check(&ws, slot, prev), CheckReason::SelfConnection);
        assert_eq!(check(&ws, prev, slot), CheckReason::SelfConnection);
    }

    #[test]
    fn test_wrong_type() {
        let mut ws = Workspace::new();
        let a = ws.create_block("a");
        let a_next = ws.add_next_connection(a, None).unwrap();
        let b = ws.create_block("b");
        let b_out = ws.add_output_connection(b, None).unwrap();
        assert_eq!(check(&ws, a_next, b_out), CheckReason::WrongType);
    }

    #[test]
    fn test_different_workspaces() {
        let mut ws1 = Workspace::new();
        let mut ws2 = Workspace::new();
        let a = ws1.create_block("a");
        let a_next = ws1.add_next_connection(a, None).unwrap();
        let b = ws2.create_block("b");
        let b_prev = ws2.add_previous_connection(b, None).unwrap();
        let reason = ConnectionChecker::can_connect_with_reason(
            &ws1,
            Some(ws1.connection(a_next).unwrap()),
            Some(ws2.connection(b_prev).unwrap()),
            None,
        );
        assert_eq!(reason, CheckReason::DifferentWorkspaces);
    }

    #[test]
    fn test_shadow_parent_asymmetry() {
        // Shadow parent over a real child is rejected.
        let mut ws = Workspace::new();
        let (parent, p_next, _child, c_prev) = statement_pair(&mut ws);
        ws.set_shadow(parent, true).unwrap();
        assert_eq!(check(&ws, p_next, c_prev), CheckReason::ShadowParent);

        // A real parent over a shadow child is fine.
        let mut ws = Workspace::new();
        let (_, p_next, child, c_prev) = statement_pair(&mut ws);
        ws.set_shadow(child, true).unwrap();
        assert_eq!(check(&ws, p_next, c_prev), CheckReason::CanConnect);
    }

    #[test]
    fn test_type_checks_commutative_and_vacuous() {
        let mut ws = Workspace::new();
        let a = ws.create_block("a");
        let a_next = ws
            .add_next_connection(a, Some(vec!["String".into(), "Number".into()]))
            .unwrap();
        let b = ws.create_block("b");
        let b_prev = ws
            .add_previous_connection(b, Some(vec!["Number".into()]))
            .unwrap();
        let c = ws.create_block("c");
        let c_prev = ws
            .add_previous_connection(c, Some(vec!["Boolean".into()]))
            .unwrap();
        let d = ws.create_block("d");
        let d_prev = ws.add_previous_connection(d, None).unwrap();

        let ab = ConnectionChecker::do_type_checks(conn(&ws, a_next), conn(&ws, b_prev));
        let ba = ConnectionChecker::do_type_checks(conn(&ws, b_prev), conn(&ws, a_next));
        assert!(ab && ba);

        let ac = ConnectionChecker::do_type_checks(conn(&ws, a_next), conn(&ws, c_prev));
        let ca = ConnectionChecker::do_type_checks(conn(&ws, c_prev), conn(&ws, a_next));
        assert!(!ac && !ca);

        // A missing list accepts anything.
        assert!(ConnectionChecker::do_type_checks(
            conn(&ws, a_next),
            conn(&ws, d_prev)
        ));
    }

    #[test]
    fn test_drag_distance_gate() {
        let mut ws = Workspace::new();
        let (a, a_next, b, b_prev) = statement_pair(&mut ws);
        ws.move_block_to(a, 0.0, 0.0).unwrap();
        ws.move_block_to(b, 0.0, 80.0).unwrap();

        let dragging = HashSet::new();
        let near = DragContext {
            max_distance: 100.0,
            dragging: &dragging,
        };
        let far = DragContext {
            max_distance: 10.0,
            dragging: &dragging,
        };
        assert!(ConnectionChecker::can_connect(
            &ws,
            Some(conn(&ws, b_prev)),
            Some(conn(&ws, a_next)),
            Some(&near)
        ));
        assert!(!ConnectionChecker::can_connect(
            &ws,
            Some(conn(&ws, b_prev)),
            Some(conn(&ws, a_next)),
            Some(&far)
        ));
    }

    #[test]
    fn test_drag_rejects_self_nesting() {
        // The candidate is part of the dragged stack itself.
        let mut ws = Workspace::new();
        let (_, a_next, _, b_prev) = statement_pair(&mut ws);
        let dragging = HashSet::from([b_prev, a_next]);
        assert!(!drag_check(&ws, b_prev, a_next, &dragging));

        let only_dragged = HashSet::from([b_prev]);
        assert!(drag_check(&ws, b_prev, a_next, &only_dragged));
    }

    #[test]
    fn test_drag_rejects_insertion_marker_target() {
        let mut ws = Workspace::new();
        let (a, a_next, b, b_prev) = statement_pair(&mut ws);
        ws.set_insertion_marker(a, true).unwrap();
        let dragging = HashSet::from([b_prev]);
        let _ = b;
        assert!(!drag_check(&ws, b_prev, a_next, &dragging));
    }

    #[test]
    fn test_drag_previous_target_occupied_by_real_block() {
        let mut ws = Workspace::new();
        let (_, a_next, _, b_prev) = statement_pair(&mut ws);
        ws.connect(a_next, b_prev).unwrap();

        // Another stack dragged over the occupied previous connection.
        let c = ws.create_block("third");
        let c_next = ws.add_next_connection(c, None).unwrap();
        let dragging = HashSet::from([c_next]);
        assert!(!drag_check(&ws, c_next, b_prev, &dragging));
    }

    #[test]
    fn test_drag_previous_target_covered_by_marker() {
        // A marker at the top of its stack may be covered.
        let mut ws = Workspace::new();
        let target = ws.create_block("target");
        let target_prev = ws.add_previous_connection(target, None).unwrap();
        let marker = ws.create_block("marker");
        let marker_next = ws.add_next_connection(marker, None).unwrap();
        ws.set_insertion_marker(marker, true).unwrap();
        ws.connect(marker_next, target_prev).unwrap();

        let dragged = ws.create_block("dragged");
        let dragged_next = ws.add_next_connection(dragged, None).unwrap();
        let dragging = HashSet::from([dragged_next]);
        assert!(drag_check(&ws, dragged_next, target_prev, &dragging));

        // The same marker mid-stack may not be covered.
        let marker_prev = ws.add_previous_connection(marker, None).unwrap();
        let above = ws.create_block("above");
        let above_next = ws.add_next_connection(above, None).unwrap();
        ws.connect(above_next, marker_prev).unwrap();
        assert!(!drag_check(&ws, dragged_next, target_prev, &dragging));
    }

    #[test]
    fn test_drag_output_single_owner() {
        let mut ws = Workspace::new();
        let parent = ws.create_block("parent");
        let slot = ws.append_value_input(parent, "VALUE", None).unwrap();
        let child = ws.create_block("child");
        let child_out = ws.add_output_connection(child, None).unwrap();
        ws.connect(slot, child_out).unwrap();

        // Dragging another parent's empty input over the occupied output.
        let other = ws.create_block("other");
        let other_slot = ws.append_value_input(other, "VALUE", None).unwrap();
        let dragging = HashSet::from([other_slot]);
        assert!(!drag_check(&ws, other_slot, child_out, &dragging));
    }

    #[test]
    fn test_drag_value_splice_rule() {
        // Occupied by a movable, non-shadow block: splice allowed.
        let mut ws = Workspace::new();
        let parent = ws.create_block("parent");
        let slot = ws.append_value_input(parent, "VALUE", None).unwrap();
        let child = ws.create_block("child");
        let child_out = ws.add_output_connection(child, None).unwrap();
        ws.connect(slot, child_out).unwrap();

        let dragged = ws.create_block("dragged");
        let dragged_out = ws.add_output_connection(dragged, None).unwrap();
        let dragging = HashSet::from([dragged_out]);
        assert!(drag_check(&ws, dragged_out, slot, &dragging));

        // An immovable, non-shadow occupant blocks the splice.
        ws.set_movable(child, false).unwrap();
        assert!(!drag_check(&ws, dragged_out, slot, &dragging));

        // An immovable shadow occupant may still be replaced.
        ws.set_shadow(child, true).unwrap();
        ws.set_shadow(dragged, true).unwrap();
        assert!(drag_check(&ws, dragged_out, slot, &dragging));
    }

    #[test]
    fn test_drag_next_no_orphaning() {
        // Target next connection occupied by a two-block real stack.
        let mut ws = Workspace::new();
        let (_, top_next, mid, mid_prev) = statement_pair(&mut ws);
        ws.connect(top_next, mid_prev).unwrap();
        let mid_next = ws.add_next_connection(mid, None).unwrap();
        let _ = mid_next;

        // A tail-less dragged block may not bump the stack.
        let dragged = ws.create_block("dragged");
        let dragged_prev = ws.add_previous_connection(dragged, None).unwrap();
        let dragging = HashSet::from([dragged_prev]);
        assert!(!drag_check(&ws, dragged_prev, top_next, &dragging));

        // Giving the dragged block its own next connection allows the bump.
        let dragged_next = ws.add_next_connection(dragged, None).unwrap();
        let dragging = HashSet::from([dragged_prev, dragged_next]);
        assert!(drag_check(&ws, dragged_prev, top_next, &dragging));
    }

    #[test]
    fn test_error_messages_cover_reasons() {
        for reason in [
            CheckReason::CanConnect,
            CheckReason::SelfConnection,
            CheckReason::WrongType,
            CheckReason::TargetNull,
            CheckReason::ChecksFailed,
            CheckReason::DifferentWorkspaces,
            CheckReason::ShadowParent,
            CheckReason::DragChecksFailed,
        ] {
            assert!(!ConnectionChecker::error_message(reason).is_empty());
        }
    }
}
