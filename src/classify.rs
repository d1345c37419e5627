/*!
 * Path classification: hidden entries, binary detection and text decoding
 */

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use encoding_rs::Encoding;
use log::{debug, error, warn};

use crate::types::{ReadError, ReadErrorKind, ReadResult};
use crate::utils::{dotted_extension, BINARY_EXTENSIONS};

/// Number of leading bytes inspected for NUL when sniffing binary content
const SNIFF_LEN: u64 = 1024;

/// How many decoder messages an `EncodingDetectionFailed` record keeps
const MAX_DECODE_ERRORS: usize = 3;

/// Encodings tried in order by [`read_text_file`]. The first that decodes wins.
pub const ENCODINGS: &[&str] = &[
    "utf-8",
    "utf-8-sig",
    "utf-16",
    "utf-16-le",
    "utf-16-be",
    "latin-1",
    "iso-8859-1",
    "cp1252",
    "euc-kr",
    "cp949",
    "shift-jis",
    "cp932",
    "gb2312",
    "gbk",
    "gb18030",
    "cp1251",
    "ascii",
];

/// Whether the entry is hidden: dot-prefixed name, or the platform hidden
/// attribute where one exists
pub fn is_hidden(path: &Path) -> bool {
    let dot_name = path
        .file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false);

    dot_name || has_hidden_attribute(path)
}

#[cfg(windows)]
fn has_hidden_attribute(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    fs::symlink_metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn has_hidden_attribute(_path: &Path) -> bool {
    false
}

/// Whether a file should be treated as binary.
///
/// Missing and empty files are not binary. Known binary extensions are
/// decided without I/O; anything else is binary iff a NUL byte appears in
/// the first 1024 bytes. I/O failures are logged and answer `false`.
pub fn is_binary_file(path: &Path) -> bool {
    match sniff_binary(path) {
        Ok(binary) => binary,
        Err(e) => {
            error!("Failed to check file type of {}: {}", path.display(), e);
            false
        }
    }
}

fn sniff_binary(path: &Path) -> io::Result<bool> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if !metadata.is_file() || metadata.len() == 0 {
        return Ok(false);
    }

    if BINARY_EXTENSIONS.contains(dotted_extension(path).as_str()) {
        return Ok(true);
    }

    let mut chunk = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut chunk)?;

    Ok(chunk.contains(&0))
}

/// Read a file as text, trying [`ENCODINGS`] in order.
///
/// Never returns raw bytes for a binary file. Content is returned exactly
/// as decoded; line endings are not touched.
pub fn read_text_file(path: &Path) -> ReadResult {
    match path.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Err(ReadError::new(
                ReadErrorKind::FileNotFound,
                format!("File does not exist: {}", path.display()),
            ))
        }
        Err(e) => return Err(io_read_error(path, e)),
    }

    if is_binary_file(path) {
        debug!("Skipping binary file: {}", path.display());
        return Err(ReadError::new(
            ReadErrorKind::BinaryFile,
            format!("Binary file cannot be read as text: {}", path.display()),
        ));
    }

    let bytes = fs::read(path).map_err(|e| io_read_error(path, e))?;

    decode_with_fallback(&bytes, ENCODINGS).map_err(|mut err| {
        warn!("Could not detect encoding of {}", path.display());
        err.details = format!(
            "File could not be decoded with any supported encoding: {}",
            path.display()
        );
        err
    })
}

fn io_read_error(path: &Path, e: io::Error) -> ReadError {
    if e.kind() == io::ErrorKind::PermissionDenied {
        warn!("Permission denied reading {}", path.display());
        return ReadError::new(
            ReadErrorKind::AccessDenied,
            format!("No permission to read file: {}", path.display()),
        );
    }

    error!("Failed to read {}: {}", path.display(), e);
    ReadError::new(
        ReadErrorKind::ReadError,
        format!("{:?}: error while reading file: {}", e.kind(), e),
    )
}

/// Decode `bytes` with the first encoding in `encodings` that accepts them
pub fn decode_with_fallback(bytes: &[u8], encodings: &[&'static str]) -> ReadResult {
    let mut decode_errors = Vec::new();

    for (i, &label) in encodings.iter().enumerate() {
        match decode_as(label, bytes) {
            Ok(text) => {
                if i > 0 {
                    debug!("Decoded with fallback encoding {}", label);
                }
                return Ok(text);
            }
            Err(message) => decode_errors.push(format!("{}: {}", label, message)),
        }
    }

    decode_errors.truncate(MAX_DECODE_ERRORS);
    Err(ReadError {
        kind: ReadErrorKind::EncodingDetectionFailed,
        details: "No supported encoding could decode the content".to_string(),
        attempted_encodings: encodings.to_vec(),
        decode_errors,
    })
}

/// Strictly decode `bytes` as `label`; no replacement characters are produced
fn decode_as(label: &str, bytes: &[u8]) -> Result<String, String> {
    match label {
        "utf-8" => utf8(bytes),
        "utf-8-sig" => utf8(bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)),
        "utf-16" => {
            if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
                strict(encoding_rs::UTF_16LE, rest)
            } else if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
                strict(encoding_rs::UTF_16BE, rest)
            } else {
                strict(encoding_rs::UTF_16LE, bytes)
            }
        }
        "utf-16-le" => strict(encoding_rs::UTF_16LE, bytes),
        "utf-16-be" => strict(encoding_rs::UTF_16BE, bytes),
        // Byte-for-byte code points; WHATWG aliases latin-1 to cp1252, so not via encoding_rs
        "latin-1" | "iso-8859-1" => Ok(bytes.iter().map(|&b| b as char).collect()),
        "cp1252" => strict(encoding_rs::WINDOWS_1252, bytes),
        "euc-kr" | "cp949" => strict(encoding_rs::EUC_KR, bytes),
        "shift-jis" | "cp932" => strict(encoding_rs::SHIFT_JIS, bytes),
        "gb2312" | "gbk" => strict(encoding_rs::GBK, bytes),
        "gb18030" => strict(encoding_rs::GB18030, bytes),
        "cp1251" => strict(encoding_rs::WINDOWS_1251, bytes),
        "ascii" => {
            if bytes.is_ascii() {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            } else {
                Err("ordinal not in range(128)".to_string())
            }
        }
        other => Err(format!("unsupported encoding {}", other)),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| e.to_string())
}

fn strict(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| format!("malformed {} sequence", encoding.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_is_hidden_dot_prefix() {
        assert!(is_hidden(Path::new("/tmp/project/.env")));
        assert!(is_hidden(Path::new(".git")));
        assert!(!is_hidden(Path::new("/tmp/project/src")));
        assert!(!is_hidden(Path::new(".")));
    }

    #[test]
    fn test_is_binary_file() -> io::Result<()> {
        let dir = tempdir()?;

        let text = dir.path().join("notes.txt");
        fs::write(&text, "plain text\n")?;
        assert!(!is_binary_file(&text));

        let nul = dir.path().join("data.dat");
        fs::write(&nul, b"abc\0def")?;
        assert!(is_binary_file(&nul));

        // Extension decides without reading content
        let png = dir.path().join("image.PNG");
        fs::write(&png, "not really an image")?;
        assert!(is_binary_file(&png));

        // Empty files are text, even with a binary extension
        let empty = dir.path().join("empty.exe");
        File::create(&empty)?;
        assert!(!is_binary_file(&empty));

        assert!(!is_binary_file(&dir.path().join("missing.bin")));
        assert!(!is_binary_file(dir.path()));

        Ok(())
    }

    #[test]
    fn test_nul_past_sniff_window_is_text() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("late_nul.log");
        let mut content = vec![b'a'; 2048];
        content.push(0);
        fs::write(&path, content)?;

        assert!(!is_binary_file(&path));
        Ok(())
    }

    #[test]
    fn test_read_utf8_unchanged() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("crlf.txt");
        let content = "first line\r\nsecond – línea\n\u{feff}tail";
        fs::write(&path, content)?;

        assert_eq!(read_text_file(&path).unwrap(), content);
        Ok(())
    }

    #[test]
    fn test_read_utf8_with_bom_keeps_bom() -> io::Result<()> {
        // Plain utf-8 succeeds first, so the BOM survives as U+FEFF
        let dir = tempdir()?;
        let path = dir.path().join("bom.txt");
        fs::write(&path, b"\xEF\xBB\xBFhi")?;

        assert_eq!(read_text_file(&path).unwrap(), "\u{feff}hi");
        Ok(())
    }

    #[test]
    fn test_utf16_ascii_text_is_binary() -> io::Result<()> {
        // ASCII in UTF-16 carries NUL bytes, so the sniffer rejects it first
        let dir = tempdir()?;
        let path = dir.path().join("wide.txt");
        let mut file = File::create(&path)?;
        file.write_all(&[0xFF, 0xFE, b'h', 0, b'i', 0])?;

        assert_eq!(read_text_file(&path).unwrap_err().kind, ReadErrorKind::BinaryFile);
        Ok(())
    }

    #[test]
    fn test_decode_utf16_bom() {
        let le = decode_with_fallback(&[0xFF, 0xFE, b'h', 0, b'i', 0], ENCODINGS).unwrap();
        assert_eq!(le, "hi");

        let be = decode_with_fallback(&[0xFE, 0xFF, 0, b'h', 0, b'i'], ENCODINGS).unwrap();
        assert_eq!(be, "hi");
    }

    #[test]
    fn test_read_falls_back_to_latin1() -> io::Result<()> {
        // Odd length rules out every utf-16 variant
        let dir = tempdir()?;
        let path = dir.path().join("legacy.txt");
        fs::write(&path, b"caf\xE9!")?;

        assert_eq!(read_text_file(&path).unwrap(), "café!");
        Ok(())
    }

    #[test]
    fn test_read_binary_is_error() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("blob.dat");
        fs::write(&path, b"\x00\x01\x02")?;

        let err = read_text_file(&path).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::BinaryFile);
        Ok(())
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_text_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::FileNotFound);
        assert!(err.details.contains("here.txt"));
    }

    #[test]
    fn test_read_directory_is_read_error() -> io::Result<()> {
        let dir = tempdir()?;
        let err = read_text_file(dir.path()).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::ReadError);
        Ok(())
    }

    #[test]
    fn test_decode_failure_record() {
        let err = decode_with_fallback(b"\xFF\xFE\xFD", &["utf-8", "utf-16-le", "ascii", "utf-8-sig"])
            .unwrap_err();

        assert_eq!(err.kind, ReadErrorKind::EncodingDetectionFailed);
        assert_eq!(err.attempted_encodings.len(), 4);
        assert_eq!(err.decode_errors.len(), 3);
        assert!(err.decode_errors[0].starts_with("utf-8:"));
        assert!(err.decode_errors[1].starts_with("utf-16-le:"));
    }

    #[test]
    fn test_decode_shift_jis() {
        // "日本" in Shift_JIS, reached only when earlier encodings are skipped
        let bytes = b"\x93\xFA\x96\x7B";
        assert_eq!(decode_with_fallback(bytes, &["utf-8", "shift-jis"]).unwrap(), "日本");
    }

    #[cfg(unix)]
    #[test]
    fn test_read_permission_denied() -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let path = dir.path().join("secret.txt");
        fs::write(&path, "top secret")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000))?;

        // Root ignores permission bits
        if File::open(&path).is_ok() {
            return Ok(());
        }

        let err = read_text_file(&path).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::AccessDenied);
        Ok(())
    }
}
