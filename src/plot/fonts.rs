//! Font registration for chart text.
//!
//! Plotters is built without its system font stack, so text is rendered by the
//! `ab_glyph` backend from a font file we register ourselves. Registration is
//! process-wide in Plotters, so it happens at most once.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::FontStyle;
use tracing::{debug, info, warn};

/// Family name every chart asks for.
pub const FAMILY: &str = "sans-serif";

const PREFERRED: [&str; 8] = [
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "Arial.ttf",
    "arial.ttf",
    "NotoSans-Regular.ttf",
    "Roboto-Regular.ttf",
    "FreeSans.ttf",
    "Helvetica.ttf",
];

const MAX_DEPTH: usize = 4;
const MAX_ATTEMPTS: usize = 8;

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register a font for [`FAMILY`], returning the file used.
///
/// `explicit` is tried first, then standard font directories. `None` means
/// charts must be drawn without text.
pub fn register(explicit: Option<&Path>) -> Option<PathBuf> {
    REGISTERED
        .get_or_init(|| {
            let mut candidates: Vec<PathBuf> = explicit.map(Path::to_path_buf).into_iter().collect();
            candidates.extend(discover());

            for path in candidates.into_iter().take(MAX_ATTEMPTS) {
                match try_register(&path) {
                    Ok(()) => {
                        info!(font = %path.display(), "Registered chart font");
                        return Some(path);
                    }
                    Err(reason) => debug!(font = %path.display(), %reason, "Skipping font"),
                }
            }
            warn!("No usable font found; charts will be drawn without text (use --font)");
            None
        })
        .clone()
}

fn try_register(path: &Path) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    if !has_font_header(&bytes) {
        return Err("missing TrueType/OpenType header".to_string());
    }
    // Plotters keeps a `'static` reference; the font lives for the whole process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| "not a TrueType/OpenType font".to_string())
}

/// sfnt version tags: TrueType (0x00010000, `true`), CFF (`OTTO`), `typ1`.
fn has_font_header(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some(&[0x00, 0x01, 0x00, 0x00] | b"true" | b"OTTO" | b"typ1")
    )
}

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
    }
    dirs
}

/// Font files under the standard directories, preferred names first.
fn discover() -> Vec<PathBuf> {
    let mut found = Vec::new();
    for dir in font_dirs() {
        collect_fonts(&dir, 0, &mut found);
    }
    found.sort();
    found.sort_by_key(|p| {
        let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
        PREFERRED.iter().position(|pref| *pref == name).unwrap_or(PREFERRED.len())
    });
    found
}

fn collect_fonts(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_fonts(&path, depth + 1, out);
        } else if is_font_file(&path) {
            out.push(path);
        }
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_files_are_recognised_by_extension() {
        assert!(is_font_file(Path::new("/x/DejaVuSans.ttf")));
        assert!(is_font_file(Path::new("/x/Inter.OTF")));
        assert!(!is_font_file(Path::new("/x/fonts.conf")));
        assert!(!is_font_file(Path::new("/x/Collection.ttc")));
    }

    #[test]
    fn discovery_walks_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("truetype").join("dejavu");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("DejaVuSans.ttf"), b"").unwrap();
        fs::write(tmp.path().join("readme.txt"), b"").unwrap();

        let mut out = Vec::new();
        collect_fonts(tmp.path(), 0, &mut out);
        assert_eq!(out, vec![nested.join("DejaVuSans.ttf")]);
    }

    #[test]
    fn only_sfnt_headers_pass_the_precheck() {
        assert!(has_font_header(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x10]));
        assert!(has_font_header(b"OTTO\x00\x0a"));
        assert!(has_font_header(b"true...."));
        assert!(!has_font_header(b"ttcf...."));
        assert!(!has_font_header(b"<?xml"));
        assert!(!has_font_header(b"OT"));
    }

    #[test]
    fn garbage_bytes_are_not_registered() {
        let tmp = tempfile::tempdir().unwrap();
        let bogus = tmp.path().join("bogus.ttf");
        fs::write(&bogus, b"definitely not a font").unwrap();
        assert!(try_register(&bogus).is_err());
    }
}
