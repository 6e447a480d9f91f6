use super::CommentNode;

/// Depth-first, pre-order traversal of a reply forest.
///
/// The walk carries its own stack, so reply chains of unbounded depth
/// never touch the call stack.
pub fn iter(roots: &[CommentNode]) -> Walk<'_> {
    Walk {
        stack: roots.iter().rev().collect(),
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a CommentNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reversed so the first reply is the next one popped.
        self.stack.extend(node.replies.iter().rev());
        Some(node)
    }
}

/// Total number of comments reachable from the given roots.
pub fn count(roots: &[CommentNode]) -> usize {
    iter(roots).count()
}

/// Length of the longest root-to-leaf reply chain. Roots sit at depth 1;
/// an empty forest has depth 0.
pub fn max_depth(roots: &[CommentNode]) -> usize {
    let mut deepest = 0;
    let mut stack: Vec<(&CommentNode, usize)> = roots.iter().map(|node| (node, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        stack.extend(node.replies.iter().map(|reply| (reply, depth + 1)));
    }
    deepest
}
