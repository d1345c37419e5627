/*!
 * Prompt document formatter
 *
 * Renders a selection as two sections: a `<file_map>` ASCII tree rebuilt
 * from relative paths, and a `<file_contents>` block with one fenced code
 * block per selected file.
 */

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use log::{debug, info, warn};

use crate::classify::read_text_file;
use crate::types::OutputItem;
use crate::utils::language_for;

/// Root label used when the root path has no final name (e.g. `.` or `/`)
pub const ROOT_PLACEHOLDER: &str = "project_root";

/// Body line of a file map with nothing selected beneath the root
pub const EMPTY_TREE_PLACEHOLDER: &str = "// (no files or folders selected)";

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// Options for [`OutputFormatter::generate_full_output`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Emit only the `<file_map>` section
    pub tree_only: bool,
}

/// A node of the ephemeral file map tree: `None` children marks a file
#[derive(Debug, Default)]
struct TreeNode {
    children: Option<BTreeMap<String, TreeNode>>,
}

/// Formatter for one project root
pub struct OutputFormatter {
    root: PathBuf,
    options: OutputOptions,
}

impl OutputFormatter {
    /// Create a formatter for items under `root`
    pub fn new(root: impl Into<PathBuf>, options: OutputOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    /// Label printed on the first line of the file map
    pub fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ROOT_PLACEHOLDER.to_string())
    }

    /// Render the `<file_map>` section for files and directories alike
    pub fn generate_file_map<T: OutputItem>(&self, items: &[T]) -> String {
        let root_name = self.root_name();
        let tree = build_tree(items);

        let mut lines = vec!["<file_map>".to_string(), format!("{}/", root_name)];
        if tree.is_empty() {
            warn!("No files or folders selected under {}/", root_name);
            lines.push(EMPTY_TREE_PLACEHOLDER.to_string());
        } else {
            render_level(&tree, "", &mut lines);
        }
        lines.push("</file_map>".to_string());

        lines.join("\n")
    }

    /// Render the `<file_contents>` section; directories in `items` are skipped.
    ///
    /// A file that cannot be read is replaced by a one-line error comment,
    /// the rest of the batch is still rendered.
    pub fn generate_file_contents<T: OutputItem>(&self, items: &[T]) -> String {
        let mut files: Vec<&T> = items.iter().filter(|item| !item.is_directory()).collect();
        files.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));

        let mut lines = vec!["<file_contents>".to_string()];
        for item in files {
            let path = item.absolute_path();
            let body = match read_text_file(path) {
                Ok(text) => text,
                Err(err) => {
                    warn!("Failed to read {} ({}): {}", path.display(), err.kind, err.details);
                    format!("// Error: {} - {}", err.kind, err.details)
                }
            };

            lines.push(format!("File: {}", self.display_path(path)));
            lines.push(format!("```{}", language_for(path)));
            lines.push(body);
            lines.push("```".to_string());
            lines.push(String::new());
        }
        lines.push("</file_contents>".to_string());

        lines.join("\n")
    }

    /// Compose the full document from a selection of files and directories.
    ///
    /// The map is built from every item so that selected directories shape
    /// the tree; contents come from the files only.
    pub fn generate_full_output<T: OutputItem>(&self, items: &[T]) -> String {
        let file_map = self.generate_file_map(items);

        let output = if self.options.tree_only {
            file_map
        } else {
            let file_contents = self.generate_file_contents(items);
            format!("{}\n\n{}", file_map, file_contents)
        };

        info!("Generated output: {} chars", output.chars().count());
        debug!(
            "Output preview: {}",
            output.chars().take(500).collect::<String>().replace('\n', "\\n")
        );

        output
    }

    /// Root-relative path with `/` separators, or just the file name when
    /// `path` is not under the root
    fn display_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
        }
    }
}

/// Rebuild a nested tree from flat relative paths.
///
/// Input is visited in path order. A name first recorded as a file and
/// later needed as a parent becomes a directory; a repeated final name is
/// overwritten by the later item.
fn build_tree<T: OutputItem>(items: &[T]) -> BTreeMap<String, TreeNode> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));

    let mut tree = BTreeMap::new();
    for item in sorted {
        let rel_path = item.relative_path();
        if rel_path == Path::new(".") {
            continue;
        }

        let parts = path_parts(rel_path);
        let Some((last, parents)) = parts.split_last() else {
            warn!("Skipping item without usable path parts: {}", rel_path.display());
            continue;
        };

        let mut level = &mut tree;
        for part in parents {
            level = level
                .entry(part.clone())
                .or_insert_with(TreeNode::default)
                .children
                .get_or_insert_with(BTreeMap::new);
        }

        let children = item.is_directory().then(BTreeMap::new);
        level.insert(last.clone(), TreeNode { children });
    }

    tree
}

fn path_parts(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .filter(|part| !part.is_empty())
        .collect()
}

fn render_level(level: &BTreeMap<String, TreeNode>, prefix: &str, lines: &mut Vec<String>) {
    let last_index = level.len().saturating_sub(1);

    for (i, (name, node)) in level.iter().enumerate() {
        let is_last = i == last_index;
        let connector = if is_last { LAST_BRANCH } else { BRANCH };

        match &node.children {
            Some(children) => {
                lines.push(format!("{}{}{}/", prefix, connector, name));
                let indent = if is_last { SPACE_INDENT } else { PIPE_INDENT };
                render_level(children, &format!("{}{}", prefix, indent), lines);
            }
            None => lines.push(format!("{}{}{}", prefix, connector, name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectionItem;
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    fn item(root: &Path, rel: &str, is_dir: bool) -> SelectionItem {
        SelectionItem::new(root.join(rel), rel, is_dir)
    }

    fn formatter(root: &Path) -> OutputFormatter {
        OutputFormatter::new(root, OutputOptions::default())
    }

    #[test]
    fn test_file_map_with_selected_directory() {
        let root = Path::new("/work/proj");
        let items = vec![
            item(root, "sub/b.txt", false),
            item(root, ".", true),
            item(root, "sub", true),
            item(root, "a.py", false),
        ];

        let expected = "<file_map>\nproj/\n├── a.py\n└── sub/\n    └── b.txt\n</file_map>";
        assert_eq!(formatter(root).generate_file_map(&items), expected);
    }

    #[test]
    fn test_file_map_synthesizes_parents() {
        let root = Path::new("/work/proj");
        let items = vec![item(root, "src/bin/tool.rs", false), item(root, "README.md", false)];

        let expected = [
            "<file_map>",
            "proj/",
            "├── README.md",
            "└── src/",
            "    └── bin/",
            "        └── tool.rs",
            "</file_map>",
        ]
        .join("\n");
        assert_eq!(formatter(root).generate_file_map(&items), expected);
    }

    #[test]
    fn test_file_map_pipe_indent_for_non_last_siblings() {
        let root = Path::new("/work/proj");
        let items = vec![
            item(root, "a/x.rs", false),
            item(root, "a/y.rs", false),
            item(root, "b", true),
        ];

        let expected = [
            "<file_map>",
            "proj/",
            "├── a/",
            "│   ├── x.rs",
            "│   └── y.rs",
            "└── b/",
            "</file_map>",
        ]
        .join("\n");
        assert_eq!(formatter(root).generate_file_map(&items), expected);
    }

    #[test]
    fn test_file_leaf_becomes_directory() {
        let root = Path::new("/work/proj");
        let items = vec![item(root, "node/leaf.txt", false), item(root, "node", false)];

        let map = formatter(root).generate_file_map(&items);
        assert!(map.contains("└── node/\n    └── leaf.txt"));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let root = Path::new("/work/proj");
        let items = vec![item(root, "dup", true), item(root, "dup", false)];

        let map = formatter(root).generate_file_map(&items);
        assert!(map.contains("└── dup\n"));
        assert!(!map.contains("dup/"));
    }

    #[test]
    fn test_empty_selection_placeholder() {
        let root = Path::new("/work/proj");
        let items = vec![item(root, ".", true)];

        let expected = format!("<file_map>\nproj/\n{}\n</file_map>", EMPTY_TREE_PLACEHOLDER);
        assert_eq!(formatter(root).generate_file_map(&items), expected);
        assert_eq!(
            formatter(root).generate_file_map::<SelectionItem>(&[]),
            expected
        );
    }

    #[test]
    fn test_root_name_placeholder() {
        assert_eq!(formatter(Path::new(".")).root_name(), ROOT_PLACEHOLDER);
        assert_eq!(formatter(Path::new("/")).root_name(), ROOT_PLACEHOLDER);
        assert_eq!(formatter(Path::new("/srv/app")).root_name(), "app");
    }

    #[test]
    fn test_file_map_is_deterministic() {
        let root = Path::new("/work/proj");
        let forward = vec![
            item(root, "z/1.txt", false),
            item(root, "b.rs", false),
            item(root, "a", true),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let f = formatter(root);
        assert_eq!(f.generate_file_map(&forward), f.generate_file_map(&forward));
        assert_eq!(f.generate_file_map(&forward), f.generate_file_map(&backward));
    }

    #[test]
    fn test_file_contents_blocks() -> io::Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("src"))?;
        fs::write(dir.path().join("src/main.rs"), "fn main() {}")?;
        fs::write(dir.path().join("data.xyz"), "payload")?;

        let items = vec![
            item(dir.path(), "src", true),
            item(dir.path(), "src/main.rs", false),
            item(dir.path(), "data.xyz", false),
        ];
        let contents = formatter(dir.path()).generate_file_contents(&items);

        let expected = [
            "<file_contents>",
            "File: data.xyz",
            "```text",
            "payload",
            "```",
            "",
            "File: src/main.rs",
            "```rust",
            "fn main() {}",
            "```",
            "",
            "</file_contents>",
        ]
        .join("\n");
        assert_eq!(contents, expected);
        Ok(())
    }

    #[test]
    fn test_file_contents_error_comment() -> io::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("ok.md"), "# Title")?;
        fs::write(dir.path().join("blob.png"), "fake image")?;

        let items = vec![
            item(dir.path(), "ok.md", false),
            item(dir.path(), "gone.py", false),
            item(dir.path(), "blob.png", false),
        ];
        let contents = formatter(dir.path()).generate_file_contents(&items);

        assert!(contents.contains("File: gone.py\n```python\n// Error: file_not_found - "));
        assert!(contents.contains("File: blob.png\n```text\n// Error: binary_file - "));
        assert!(contents.contains("File: ok.md\n```markdown\n# Title\n```"));
        Ok(())
    }

    #[test]
    fn test_display_path_outside_root_uses_file_name() -> io::Result<()> {
        let dir = tempdir()?;
        let elsewhere = tempdir()?;
        let path = elsewhere.path().join("stray.txt");
        fs::write(&path, "stray")?;

        let items = vec![SelectionItem::new(&path, "stray.txt", false)];
        let contents = formatter(dir.path()).generate_file_contents(&items);
        assert!(contents.contains("File: stray.txt\n```text\nstray\n```"));
        Ok(())
    }

    #[test]
    fn test_full_output_composition() -> io::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.py"), "print('hi')\n")?;
        let items = vec![item(dir.path(), "a.py", false)];

        let f = formatter(dir.path());
        let full = f.generate_full_output(&items);
        assert_eq!(
            full,
            format!("{}\n\n{}", f.generate_file_map(&items), f.generate_file_contents(&items))
        );

        let tree_only = OutputFormatter::new(dir.path(), OutputOptions { tree_only: true });
        let map_only = tree_only.generate_full_output(&items);
        assert_eq!(map_only, f.generate_file_map(&items));
        assert!(!map_only.contains("<file_contents>"));
        Ok(())
    }
}
