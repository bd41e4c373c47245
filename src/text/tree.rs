use std::fmt;
use std::io::{ErrorKind, Read};

use super::reader::{ReadDirection, TreeReader};
use super::utf8::{byte_offset_for_char, char_width, count_chars, is_continuation};
use super::TextError;

/// Maximum number of bytes stored in a single leaf.
pub(crate) const MAX_BYTES_PER_LEAF: usize = 4096;

/// Leaves that fall below this fill level after a deletion are merged
/// with a sibling leaf when the combined bytes still fit in one leaf.
const MIN_BYTES_PER_LEAF: usize = MAX_BYTES_PER_LEAF / 4;

/// Aggregated metadata for O(log n) position queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub bytes: u64,
    pub chars: u64,
    pub newlines: u64,
}

impl Summary {
    fn for_bytes(bytes: &[u8]) -> Summary {
        Summary {
            bytes: bytes.len() as u64,
            chars: count_chars(bytes),
            newlines: bytes.iter().filter(|&&b| b == b'\n').count() as u64,
        }
    }

    fn add(self, other: Summary) -> Summary {
        Summary {
            bytes: self.bytes + other.bytes,
            chars: self.chars + other.chars,
            newlines: self.newlines + other.newlines,
        }
    }
}

/// A node in the document tree. Leaves own a bounded run of UTF-8 bytes
/// aligned to codepoint boundaries; internal nodes own two children and
/// cache the summaries of their subtree.
pub(crate) enum Node {
    Leaf {
        bytes: Vec<u8>,
        summary: Summary,
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
        height: u32,
        summary: Summary,
    },
}

impl Node {
    fn leaf(bytes: Vec<u8>) -> Node {
        let summary = Summary::for_bytes(&bytes);
        Node::Leaf { bytes, summary }
    }

    pub(crate) fn summary(&self) -> Summary {
        match self {
            Node::Leaf { summary, .. } | Node::Internal { summary, .. } => *summary,
        }
    }

    pub(crate) fn chars(&self) -> u64 {
        self.summary().chars
    }

    fn height(&self) -> u32 {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { height, .. } => *height,
        }
    }

    fn branch(left: Node, right: Node) -> Node {
        let summary = left.summary().add(right.summary());
        let height = left.height().max(right.height()) + 1;
        Node::Internal {
            left: Box::new(left),
            right: Box::new(right),
            height,
            summary,
        }
    }

    fn into_children(self) -> (Node, Node) {
        match self {
            Node::Internal { left, right, .. } => (*left, *right),
            Node::Leaf { .. } => panic!("bug: leaf node has no children"),
        }
    }

    /// Join two subtrees, restoring the AVL balance invariant when a
    /// single insert, delete, or split has tipped one side.
    fn balanced_branch(left: Node, right: Node) -> Node {
        let bf = left.height() as i64 - right.height() as i64;
        if bf > 1 {
            let (ll, lr) = left.into_children();
            if lr.height() > ll.height() {
                let (lrl, lrr) = lr.into_children();
                Node::branch(Node::branch(ll, lrl), Node::branch(lrr, right))
            } else {
                Node::branch(ll, Node::branch(lr, right))
            }
        } else if bf < -1 {
            let (rl, rr) = right.into_children();
            if rl.height() > rr.height() {
                let (rll, rlr) = rl.into_children();
                Node::branch(Node::branch(left, rll), Node::branch(rlr, rr))
            } else {
                Node::branch(Node::branch(left, rl), rr)
            }
        } else {
            Node::branch(left, right)
        }
    }

    fn insert(self, char_pos: u64, ch: char) -> Node {
        match self {
            Node::Leaf { mut bytes, summary } => {
                let mut buf = [0u8; 4];
                let encoded = ch.encode_utf8(&mut buf).as_bytes();
                if bytes.len() + encoded.len() <= MAX_BYTES_PER_LEAF {
                    let offset = byte_offset_for_char(&bytes, char_pos);
                    bytes.splice(offset..offset, encoded.iter().copied());
                    let summary = Summary {
                        bytes: summary.bytes + encoded.len() as u64,
                        chars: summary.chars + 1,
                        newlines: summary.newlines + u64::from(ch == '\n'),
                    };
                    Node::Leaf { bytes, summary }
                } else {
                    // Full leaf: split near the midpoint on a codepoint
                    // boundary, then insert into the appropriate half.
                    let mid_char = summary.chars / 2;
                    let mid_byte = byte_offset_for_char(&bytes, mid_char);
                    let right_bytes = bytes.split_off(mid_byte);
                    let left = Node::leaf(bytes);
                    let right = Node::leaf(right_bytes);
                    if char_pos < mid_char {
                        Node::balanced_branch(left.insert(char_pos, ch), right)
                    } else {
                        Node::balanced_branch(left, right.insert(char_pos - mid_char, ch))
                    }
                }
            }
            Node::Internal { left, right, .. } => {
                let (left, right) = (*left, *right);
                let left_chars = left.chars();
                if char_pos < left_chars {
                    Node::balanced_branch(left.insert(char_pos, ch), right)
                } else {
                    Node::balanced_branch(left, right.insert(char_pos - left_chars, ch))
                }
            }
        }
    }

    fn delete(self, char_pos: u64) -> Node {
        match self {
            Node::Leaf { mut bytes, summary } => {
                let offset = byte_offset_for_char(&bytes, char_pos);
                if offset >= bytes.len() {
                    return Node::Leaf { bytes, summary };
                }
                let width = char_width(bytes[offset]);
                let was_newline = bytes[offset] == b'\n';
                bytes.drain(offset..offset + width);
                let summary = Summary {
                    bytes: summary.bytes - width as u64,
                    chars: summary.chars - 1,
                    newlines: summary.newlines - u64::from(was_newline),
                };
                Node::Leaf { bytes, summary }
            }
            Node::Internal { left, right, .. } => {
                let (left, right) = (*left, *right);
                let left_chars = left.chars();
                let (left, right) = if char_pos < left_chars {
                    (left.delete(char_pos), right)
                } else {
                    (left, right.delete(char_pos - left_chars))
                };
                match (left, right) {
                    (
                        Node::Leaf {
                            bytes: mut lb,
                            ..
                        },
                        Node::Leaf { bytes: rb, .. },
                    ) if lb.len() + rb.len() <= MAX_BYTES_PER_LEAF
                        && (lb.len() < MIN_BYTES_PER_LEAF || rb.len() < MIN_BYTES_PER_LEAF) =>
                    {
                        lb.extend_from_slice(&rb);
                        Node::leaf(lb)
                    }
                    (left, right) => Node::balanced_branch(left, right),
                }
            }
        }
    }

    /// Codepoint index just past the `target`-th line feed (1-indexed).
    /// The caller guarantees `1 <= target <= summary.newlines`.
    fn position_after_newline(&self, target: u64) -> u64 {
        match self {
            Node::Leaf { bytes, .. } => {
                let mut chars = 0u64;
                let mut newlines = 0u64;
                for &b in bytes {
                    if !is_continuation(b) {
                        chars += 1;
                        if b == b'\n' {
                            newlines += 1;
                            if newlines == target {
                                return chars;
                            }
                        }
                    }
                }
                panic!("bug: leaf holds fewer line feeds than its summary")
            }
            Node::Internal { left, right, .. } => {
                let left_newlines = left.summary().newlines;
                if target <= left_newlines {
                    left.position_after_newline(target)
                } else {
                    left.chars() + right.position_after_newline(target - left_newlines)
                }
            }
        }
    }

    /// Number of line feeds among the first `char_pos` codepoints.
    fn newlines_before(&self, char_pos: u64) -> u64 {
        match self {
            Node::Leaf { bytes, .. } => {
                let mut chars = 0u64;
                let mut newlines = 0u64;
                for &b in bytes {
                    if !is_continuation(b) {
                        if chars == char_pos {
                            break;
                        }
                        chars += 1;
                        if b == b'\n' {
                            newlines += 1;
                        }
                    }
                }
                newlines
            }
            Node::Internal { left, right, .. } => {
                let left_chars = left.chars();
                if char_pos <= left_chars {
                    left.newlines_before(char_pos)
                } else {
                    left.summary().newlines + right.newlines_before(char_pos - left_chars)
                }
            }
        }
    }
}

/// Balanced tree over the document's UTF-8 bytes.
///
/// Positions are counts of Unicode codepoints from the start of the
/// document; line numbers are zero-based. All indexed operations run in
/// O(log n) using the cached subtree summaries.
pub struct Tree {
    pub(crate) root: Node,
}

impl Tree {
    /// An empty document.
    pub fn new() -> Tree {
        Tree {
            root: Node::leaf(Vec::new()),
        }
    }

    /// Builds a document by streaming bytes from `reader` in leaf-sized
    /// chunks. A chunk that ends mid-codepoint carries its tail bytes
    /// into the next chunk so leaves stay codepoint aligned.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Tree, TextError> {
        let mut leaves: Vec<Node> = Vec::new();
        let mut chunk = [0u8; MAX_BYTES_PER_LEAF];
        let mut filled = 0usize;
        loop {
            let n = match reader.read(&mut chunk[filled..]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TextError::Io(err)),
            };
            if n == 0 {
                if filled > 0 {
                    if std::str::from_utf8(&chunk[..filled]).is_err() {
                        return Err(TextError::InvalidUtf8);
                    }
                    leaves.push(Node::leaf(chunk[..filled].to_vec()));
                }
                break;
            }
            filled += n;
            if filled < chunk.len() {
                continue;
            }

            // The chunk is full: back off to the last complete codepoint
            // and carry the remainder into the next chunk.
            let mut last_lead = filled;
            while last_lead > 0 && is_continuation(chunk[last_lead - 1]) {
                last_lead -= 1;
            }
            if last_lead == 0 {
                return Err(TextError::InvalidUtf8);
            }
            last_lead -= 1;
            let width = char_width(chunk[last_lead]);
            let end = if last_lead + width <= filled {
                last_lead + width
            } else {
                last_lead
            };
            if end == 0 || std::str::from_utf8(&chunk[..end]).is_err() {
                return Err(TextError::InvalidUtf8);
            }
            leaves.push(Node::leaf(chunk[..end].to_vec()));
            chunk.copy_within(end..filled, 0);
            filled -= end;
        }
        Ok(Tree {
            root: build_from_leaves(leaves),
        })
    }

    /// Number of codepoints in the document.
    pub fn num_chars(&self) -> u64 {
        self.root.summary().chars
    }

    /// Number of lines, counting the virtual line after a trailing
    /// line feed.
    pub fn num_lines(&self) -> u64 {
        self.root.summary().newlines + 1
    }

    /// Codepoint index of the start of line `line_num`, or `num_chars()`
    /// when the line does not exist.
    pub fn line_start_position(&self, line_num: u64) -> u64 {
        if line_num == 0 {
            return 0;
        }
        if line_num > self.root.summary().newlines {
            return self.num_chars();
        }
        self.root.position_after_newline(line_num)
    }

    /// Zero-based line containing `pos`. A position at or past the end
    /// of the document reports the last line.
    pub fn line_num_for_position(&self, pos: u64) -> u64 {
        self.root.newlines_before(pos.min(self.num_chars()))
    }

    /// Inserts one codepoint at `pos`. Positions past the end append.
    pub fn insert_at_position(&mut self, pos: u64, ch: char) {
        let pos = pos.min(self.num_chars());
        let root = std::mem::replace(&mut self.root, Node::leaf(Vec::new()));
        self.root = root.insert(pos, ch);
    }

    /// Removes the codepoint at `pos`. Positions at or past the end are
    /// a no-op.
    pub fn delete_at_position(&mut self, pos: u64) {
        if pos >= self.num_chars() {
            return;
        }
        let root = std::mem::replace(&mut self.root, Node::leaf(Vec::new()));
        self.root = root.delete(pos);
    }

    /// Streaming byte reader starting at the codepoint boundary at
    /// `pos`. Backward readers produce bytes in reverse document order.
    pub fn reader_at_position(&self, pos: u64, direction: ReadDirection) -> TreeReader<'_> {
        TreeReader::new(self, pos, direction)
    }
}

impl Default for Tree {
    fn default() -> Tree {
        Tree::new()
    }
}

impl From<&str> for Tree {
    fn from(text: &str) -> Tree {
        let bytes = text.as_bytes();
        let mut leaves = Vec::with_capacity(bytes.len() / MAX_BYTES_PER_LEAF + 1);
        let mut pos = 0;
        while pos < bytes.len() {
            let mut end = (pos + MAX_BYTES_PER_LEAF).min(bytes.len());
            while end < bytes.len() && is_continuation(bytes[end]) {
                end -= 1;
            }
            leaves.push(Node::leaf(bytes[pos..end].to_vec()));
            pos = end;
        }
        Tree {
            root: build_from_leaves(leaves),
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(node: &Node, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match node {
                Node::Leaf { bytes, .. } => {
                    // Leaves are codepoint aligned and validated on entry.
                    f.write_str(std::str::from_utf8(bytes).expect("leaf holds valid UTF-8"))
                }
                Node::Internal { left, right, .. } => {
                    write_node(left, f)?;
                    write_node(right, f)
                }
            }
        }
        write_node(&self.root, f)
    }
}

/// Assembles leaves into a balanced tree by splitting the run in half
/// at every level, so sibling heights never differ by more than one.
fn build_from_leaves(leaves: Vec<Node>) -> Node {
    fn build(nodes: &mut std::vec::IntoIter<Node>, count: usize) -> Node {
        if count == 1 {
            return nodes.next().expect("leaf count matches iterator length");
        }
        let left_count = count / 2;
        let left = build(nodes, left_count);
        let right = build(nodes, count - left_count);
        Node::branch(left, right)
    }

    let count = leaves.len();
    if count == 0 {
        return Node::leaf(Vec::new());
    }
    build(&mut leaves.into_iter(), count)
}
