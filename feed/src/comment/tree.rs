use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

use super::{Comment, CommentNode};

/// The rebuilt reply forest plus every anomaly found along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeBuildResult {
    pub roots: Vec<CommentNode>,
    pub diagnostics: Vec<Diagnostic>,
}

struct Slot {
    comment: Comment,
    children: Vec<usize>,
}

/// Converts a flat, parent-referencing comment list into a forest of
/// reply trees.
///
/// Sibling order preserves input order. Comments with a duplicate id, a
/// parent id absent from the input, or a parent chain that would make
/// them their own ancestor are excluded and reported as diagnostics;
/// nothing here is ever fatal, and the remaining forest is always
/// self-consistent.
pub fn build_tree(comments: Vec<Comment>) -> TreeBuildResult {
    let mut diagnostics = Vec::new();

    // First pass: one arena slot per comment. The first occurrence of an
    // id wins, later ones are skipped.
    let mut arena: Vec<Slot> = Vec::with_capacity(comments.len());
    let mut by_id: HashMap<i32, usize> = HashMap::with_capacity(comments.len());
    for comment in comments {
        if by_id.contains_key(&comment.id) {
            tracing::warn!(id = comment.id, "skipping comment with duplicate id");
            diagnostics.push(Diagnostic {
                kind: DiagnosticKind::Duplicate,
                comment_id: comment.id,
            });
            continue;
        }
        by_id.insert(comment.id, arena.len());
        arena.push(Slot {
            comment,
            children: Vec::new(),
        });
    }

    // Second pass, still in input order: collect roots and attach each
    // child to its parent slot by index. Dangling and cyclic references
    // are dropped; their slots stay allocated but unreachable.
    let mut roots: Vec<usize> = Vec::new();
    for index in 0..arena.len() {
        let comment_id = arena[index].comment.id;
        let Some(parent_id) = arena[index].comment.parent_id else {
            roots.push(index);
            continue;
        };
        let Some(&parent_index) = by_id.get(&parent_id) else {
            tracing::warn!(
                id = comment_id,
                parent_id,
                "dropping comment with dangling parent reference"
            );
            diagnostics.push(Diagnostic {
                kind: DiagnosticKind::Dangling,
                comment_id,
            });
            continue;
        };
        if closes_cycle(&arena, &by_id, index, parent_index) {
            tracing::warn!(
                id = comment_id,
                parent_id,
                "dropping comment inside a parent cycle"
            );
            diagnostics.push(Diagnostic {
                kind: DiagnosticKind::Cycle,
                comment_id,
            });
            continue;
        }
        arena[parent_index].children.push(index);
    }

    TreeBuildResult {
        roots: materialize(arena, &roots),
        diagnostics,
    }
}

// Walks the declared parent chain upward from `parent`. Finding `child`
// there, or taking more steps than there are comments, means attaching
// would create a cycle. The walk uses the declared links rather than the
// attached ones so the verdict does not depend on attachment order.
fn closes_cycle(arena: &[Slot], by_id: &HashMap<i32, usize>, child: usize, parent: usize) -> bool {
    let mut current = parent;
    let mut steps = 0usize;
    loop {
        if current == child {
            return true;
        }
        steps += 1;
        if steps > arena.len() {
            // A chain longer than the comment set itself: a cycle that
            // does not pass through `child`.
            return true;
        }
        let Some(parent_id) = arena[current].comment.parent_id else {
            return false;
        };
        match by_id.get(&parent_id) {
            Some(&next) => current = next,
            None => return false,
        }
    }
}

// Assembles the owned forest bottom-up with an explicit stack, keeping
// reply chains thousands of levels deep off the call stack.
fn materialize(arena: Vec<Slot>, roots: &[usize]) -> Vec<CommentNode> {
    let mut slots: Vec<Option<Slot>> = arena.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentNode>> = (0..slots.len()).map(|_| None).collect();

    for &root in roots {
        let mut stack = vec![(root, false)];
        while let Some((index, children_done)) = stack.pop() {
            if children_done {
                let slot = slots[index].take().unwrap();
                let replies = slot
                    .children
                    .iter()
                    .map(|&child| built[child].take().unwrap())
                    .collect();
                let Comment {
                    id,
                    author,
                    content,
                    created_at,
                    parent_id: _,
                } = slot.comment;
                built[index] = Some(CommentNode {
                    id,
                    author,
                    content,
                    created_at,
                    replies,
                });
            } else {
                stack.push((index, true));
                for &child in &slots[index].as_ref().unwrap().children {
                    stack.push((child, false));
                }
            }
        }
    }

    roots.iter().map(|&root| built[root].take().unwrap()).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn comment(id: i32, parent_id: Option<i32>) -> Comment {
        Comment {
            id,
            author: format!("user{}", id),
            content: format!("comment {}", id),
            parent_id,
            created_at: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
                + chrono::Duration::seconds(i64::from(id)),
        }
    }

    fn ids(nodes: &[CommentNode]) -> Vec<i32> {
        nodes.iter().map(|node| node.id).collect()
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        let result = build_tree(vec![]);
        assert!(result.roots.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn nests_replies_under_their_parents() {
        let result = build_tree(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(1)),
            comment(4, Some(2)),
        ]);

        assert!(result.diagnostics.is_empty());
        assert_eq!(ids(&result.roots), vec![1]);
        assert_eq!(ids(&result.roots[0].replies), vec![2, 3]);
        assert_eq!(ids(&result.roots[0].replies[0].replies), vec![4]);
        assert!(result.roots[0].replies[1].replies.is_empty());
    }

    #[test]
    fn attaches_children_that_precede_their_parent() {
        // The id map is built over the whole input before anything is
        // attached, so input order between parent and child is free.
        let result = build_tree(vec![comment(2, Some(1)), comment(1, None)]);

        assert!(result.diagnostics.is_empty());
        assert_eq!(ids(&result.roots), vec![1]);
        assert_eq!(ids(&result.roots[0].replies), vec![2]);
    }

    #[test]
    fn preserves_sibling_input_order() {
        let result = build_tree(vec![
            comment(10, None),
            comment(7, Some(10)),
            comment(3, Some(10)),
            comment(9, Some(10)),
            comment(5, None),
        ]);

        assert_eq!(ids(&result.roots), vec![10, 5]);
        assert_eq!(ids(&result.roots[0].replies), vec![7, 3, 9]);
    }

    #[test]
    fn dangling_parent_is_excluded_and_reported() {
        let result = build_tree(vec![comment(1, Some(5))]);

        assert!(result.roots.is_empty(), "orphan must not become a root");
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic {
                kind: DiagnosticKind::Dangling,
                comment_id: 1,
            }]
        );
    }

    #[test]
    fn subtree_of_a_dangling_comment_stays_unreachable() {
        // 1 has no parent record, 2 replies to 1, 3 replies to 2. Only 1
        // is reported; its descendants silently vanish with it.
        let result = build_tree(vec![
            comment(1, Some(99)),
            comment(2, Some(1)),
            comment(3, Some(2)),
            comment(4, None),
        ]);

        assert_eq!(ids(&result.roots), vec![4]);
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic {
                kind: DiagnosticKind::Dangling,
                comment_id: 1,
            }]
        );
    }

    #[test]
    fn duplicate_ids_keep_the_first_occurrence() {
        let result = build_tree(vec![
            comment(1, None),
            comment(1, None),
            comment(2, Some(1)),
        ]);

        assert_eq!(ids(&result.roots), vec![1]);
        assert_eq!(ids(&result.roots[0].replies), vec![2]);
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic {
                kind: DiagnosticKind::Duplicate,
                comment_id: 1,
            }]
        );
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let result = build_tree(vec![comment(1, Some(1))]);

        assert!(result.roots.is_empty());
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic {
                kind: DiagnosticKind::Cycle,
                comment_id: 1,
            }]
        );
    }

    #[test]
    fn mutual_cycle_drops_both_and_spares_the_rest() {
        let result = build_tree(vec![
            comment(1, Some(2)),
            comment(2, Some(1)),
            comment(3, None),
        ]);

        assert_eq!(ids(&result.roots), vec![3]);
        assert_eq!(
            result.diagnostics,
            vec![
                Diagnostic {
                    kind: DiagnosticKind::Cycle,
                    comment_id: 1,
                },
                Diagnostic {
                    kind: DiagnosticKind::Cycle,
                    comment_id: 2,
                },
            ]
        );
    }

    #[test]
    fn reply_to_a_cyclic_chain_is_dropped_not_looped() {
        // 1 and 2 form a cycle that 3 hangs off of; walking 3's ancestry
        // must terminate via the step bound instead of spinning.
        let result = build_tree(vec![
            comment(1, Some(2)),
            comment(2, Some(1)),
            comment(3, Some(1)),
        ]);

        assert!(result.roots.is_empty());
        assert_eq!(result.diagnostics.len(), 3);
        assert!(
            result
                .diagnostics
                .iter()
                .all(|d| d.kind == DiagnosticKind::Cycle)
        );
    }

    #[test]
    fn builds_are_idempotent() {
        let comments = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(7)),
            comment(2, Some(1)),
        ];

        let first = build_tree(comments.clone());
        let second = build_tree(comments);
        assert_eq!(first, second);
    }

    #[test]
    fn deep_reply_chains_do_not_overflow() {
        let depth = 2_000;
        let mut comments = vec![comment(0, None)];
        for id in 1..depth {
            comments.push(comment(id, Some(id - 1)));
        }

        let result = build_tree(comments);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.roots.len(), 1);

        let mut node = &result.roots[0];
        let mut seen = 1;
        while let Some(reply) = node.replies.first() {
            node = reply;
            seen += 1;
        }
        assert_eq!(seen, depth);
    }

    #[test]
    fn nested_view_serializes_recursively() {
        let result = build_tree(vec![comment(1, None), comment(2, Some(1))]);

        let json = serde_json::to_value(&result.roots).unwrap();
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["author"], "user1");
        assert_eq!(json[0]["replies"][0]["id"], 2);
        assert!(
            json[0]["replies"][0]["replies"]
                .as_array()
                .unwrap()
                .is_empty()
        );
    }
}
