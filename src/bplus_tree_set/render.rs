use alloc::string::String;
use core::fmt::{self, Display, Write};

use super::BPlusTreeSet;
use crate::raw::{Handle, Node};

impl<T: Display> BPlusTreeSet<T> {
    /// Renders the tree structure as box-drawing text, one node per line.
    ///
    /// The root comes first as `prefix` followed by its keys in brackets. Each child follows its parent, drawn
    /// with `├─` or `└─` for the last child, and nested levels are indented by three columns. Every line, including
    /// the last, ends with a newline. An empty set renders as `[]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let set = BPlusTreeSet::from([1, 2, 3, 4, 5]);
    /// assert_eq!(
    ///     set.render("> "),
    ///     "> [3]\n\
    ///      > ├─[2]\n\
    ///      > │  ├─[1]\n\
    ///      > │  └─[2]\n\
    ///      > └─[4]\n\
    ///      >    ├─[3]\n\
    ///      >    └─[4, 5]\n"
    /// );
    /// ```
    #[must_use]
    pub fn render(&self, prefix: &str) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = self.write_tree(&mut out, prefix);
        out
    }

    fn write_tree<W: Write>(&self, out: &mut W, prefix: &str) -> fmt::Result {
        let root = self.raw.root();
        out.write_str(prefix)?;
        self.write_keys(out, root)?;
        let mut indent = String::from(prefix);
        self.write_children(out, root, &mut indent)
    }

    /// Writes one line per descendant of `handle`, depth first.
    fn write_children<W: Write>(&self, out: &mut W, handle: Handle, indent: &mut String) -> fmt::Result {
        let Node::Internal(internal) = self.raw.node(handle) else {
            return Ok(());
        };
        let count = internal.child_count();
        for (index, &child) in internal.children().iter().enumerate() {
            let is_last = index + 1 == count;
            out.write_str(indent)?;
            out.write_str(if is_last { "└─" } else { "├─" })?;
            self.write_keys(out, child)?;

            let depth = indent.len();
            indent.push_str(if is_last { "   " } else { "│  " });
            self.write_children(out, child, indent)?;
            indent.truncate(depth);
        }
        Ok(())
    }

    fn write_keys<W: Write>(&self, out: &mut W, handle: Handle) -> fmt::Result {
        out.write_char('[')?;
        for (index, key) in self.raw.node(handle).keys().iter().enumerate() {
            if index > 0 {
                out.write_str(", ")?;
            }
            write!(out, "{key}")?;
        }
        out.write_str("]\n")
    }
}

/// Same as [`BPlusTreeSet::render`] with an empty prefix.
impl<T: Display> Display for BPlusTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, "")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn empty_set_renders_brackets() {
        let set = BPlusTreeSet::<i32>::new();
        assert_eq!(set.render(""), "[]\n");
        assert_eq!(set.render("$ "), "$ []\n");
    }

    #[test]
    fn single_leaf_lists_keys() {
        let set = BPlusTreeSet::from([2, 1]);
        assert_eq!(set.to_string(), "[1, 2]\n");
    }

    #[test]
    fn last_child_indents_with_spaces() {
        let set = BPlusTreeSet::from([1, 2, 3, 4, 5]);
        assert_eq!(set.to_string(), "[3]\n├─[2]\n│  ├─[1]\n│  └─[2]\n└─[4]\n   ├─[3]\n   └─[4, 5]\n");
    }

    #[test]
    fn display_uses_element_display() {
        let set = BPlusTreeSet::from(["b", "a", "c"]);
        assert_eq!(set.to_string(), "[b]\n├─[a]\n└─[b, c]\n");
    }
}
