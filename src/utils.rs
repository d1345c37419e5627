/*!
 * Utility functions and static tables for promptmap
 */

use std::collections::{HashMap, HashSet};
use std::path::Path;

use once_cell::sync::Lazy;

/// Fence tag used when an extension is not in [`LANGUAGE_MAP`]
pub const DEFAULT_LANGUAGE: &str = "text";

/// Lowercased extension (with leading dot) to code fence language tag
pub static LANGUAGE_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // C family
        (".c", "c"),
        (".h", "c"),
        (".cpp", "cpp"),
        (".hpp", "cpp"),
        (".cc", "cpp"),
        (".cxx", "cpp"),
        (".c++", "cpp"),
        // Web
        (".html", "html"),
        (".htm", "html"),
        (".xhtml", "html"),
        (".css", "css"),
        (".scss", "scss"),
        (".sass", "sass"),
        (".less", "less"),
        (".js", "javascript"),
        (".jsx", "jsx"),
        (".ts", "typescript"),
        (".tsx", "tsx"),
        // Python
        (".py", "python"),
        (".pyw", "python"),
        (".pyx", "python"),
        (".pxd", "python"),
        (".pyi", "python"),
        (".ipynb", "jupyter"),
        // JVM
        (".java", "java"),
        (".kt", "kotlin"),
        (".kts", "kotlin"),
        (".scala", "scala"),
        (".groovy", "groovy"),
        // .NET
        (".cs", "csharp"),
        (".vb", "vb"),
        (".fs", "fsharp"),
        (".rb", "ruby"),
        (".php", "php"),
        // Systems
        (".go", "go"),
        (".rs", "rust"),
        (".swift", "swift"),
        // Shell
        (".sh", "bash"),
        (".bash", "bash"),
        (".zsh", "bash"),
        (".ps1", "powershell"),
        (".bat", "batch"),
        (".cmd", "batch"),
        // Markup & data
        (".md", "markdown"),
        (".markdown", "markdown"),
        (".json", "json"),
        (".yaml", "yaml"),
        (".yml", "yaml"),
        (".xml", "xml"),
        (".toml", "toml"),
        (".ini", "ini"),
        (".cfg", "ini"),
        (".conf", "ini"),
        (".csv", "csv"),
        (".tsv", "tsv"),
        // Other
        (".sql", "sql"),
        (".graphql", "graphql"),
        (".gql", "graphql"),
        (".tex", "latex"),
        (".dockerfile", "dockerfile"),
        (".gitignore", "gitignore"),
        (".r", "r"),
        (".dart", "dart"),
        (".lua", "lua"),
        (".pl", "perl"),
        (".pm", "perl"),
        (".hs", "haskell"),
        (".txt", "text"),
    ])
});

/// Extensions that are classified binary without reading the file
pub static BINARY_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // Executables & libraries
        ".exe", ".dll", ".so", ".dylib", ".bin", ".o", ".obj",
        // Archives
        ".zip", ".gz", ".tar", ".rar", ".7z", ".xz", ".bz2",
        // Images
        ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".ico", ".webp",
        // Audio
        ".mp3", ".wav", ".ogg", ".flac", ".aac", ".wma",
        // Video
        ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm",
        // Documents & compiled artifacts
        ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
        ".class", ".pyc", ".pyd", ".pyo", ".db", ".sqlite", ".mdb",
        // Fonts
        ".ttf", ".woff", ".woff2", ".eot", ".otf",
    ])
});

/// Directory names treated as Python virtual environments
pub const VIRTUALENV_DIRS: &[&str] = &["venv", "virtualenv", "env", ".venv"];

/// Lowercased extension of `path` with a leading dot, or `""` when it has none
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Code fence language for a file, by extension
pub fn language_for(path: &Path) -> &'static str {
    LANGUAGE_MAP
        .get(dotted_extension(path).as_str())
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Format a count with thousands separators (e.g. 12345 -> "12,345")
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
