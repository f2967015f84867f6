//! Batch and glyph export drivers against temporary directories

use std::cell::Cell;
use std::fs;
use std::path::Path;

use svgnorm::glyph::{glyph_file_name, GlyphOutcome};
use svgnorm::{
    collect_svg_files, export_glyphs, normalize_dir, BatchOptions, BoundingBox, Document,
    FileOutcome, Glyph, GlyphError, NormalizeError, NormalizeOptions,
};

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write fixture");
}

fn read_root(path: &Path) -> Document {
    let content = fs::read_to_string(path).expect("read output");
    Document::parse(&content).expect("Output should parse")
}

#[test]
fn test_collect_svg_files_case_insensitive_and_sorted() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "b.SVG", "<svg/>");
    write(dir.path(), "a.svg", "<svg/>");
    write(dir.path(), "notes.txt", "not an icon");
    write(dir.path(), "c.svgz", "compressed");
    fs::create_dir(dir.path().join("sub.svg")).expect("mkdir");

    let files = collect_svg_files(dir.path()).expect("Should list");
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.svg", "b.SVG"]);
}

#[test]
fn test_collect_svg_files_missing_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = collect_svg_files(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, NormalizeError::Io { .. }));
}

#[test]
fn test_batch_continues_past_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "arrow.svg", r#"<svg width="24" height="24"><path id="p"/></svg>"#);
    write(dir.path(), "broken.svg", "<svg><g></svg>");
    write(dir.path(), "loose.svg", r#"<svg overflow="hidden"/>"#);

    let report = normalize_dir(dir.path(), &BatchOptions::default()).expect("Should run");

    assert_eq!(report.total(), 3);
    assert_eq!(report.normalized(), 1);
    assert_eq!(report.warned(), 1);
    assert_eq!(report.failed(), 1);
    assert!(report.has_failures());

    let arrow = read_root(&dir.path().join("arrow.svg"));
    assert_eq!(arrow.root.attr("viewBox"), Some("0 0 24 24"));
    let path = arrow.root.child_elements().next().expect("path");
    assert_eq!(path.attr("id"), Some("arrow_p"));

    // Missing viewBox: the rest of the cleanup is still written
    let loose = read_root(&dir.path().join("loose.svg"));
    assert!(!loose.root.has_attr("overflow"));
    assert_eq!(loose.root.attr("role"), Some("img"));

    // The malformed file is left as it was
    assert_eq!(
        fs::read_to_string(dir.path().join("broken.svg")).unwrap(),
        "<svg><g></svg>"
    );
    let failed: Vec<&Path> = report.failures().map(|(p, _)| p).collect();
    assert_eq!(failed, vec![dir.path().join("broken.svg").as_path()]);
}

#[test]
fn test_batch_writes_declaration() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "dot.svg", r#"<svg viewBox="0 0 2 2"><circle r="1"/></svg>"#);

    normalize_dir(dir.path(), &BatchOptions::default()).expect("Should run");

    let content = fs::read_to_string(dir.path().join("dot.svg")).unwrap();
    assert!(content.starts_with("<?xml version='1.0' encoding='utf-8'?>\n<svg "));
    assert!(content.ends_with("<circle r=\"1\"/></svg>"));
}

#[test]
fn test_dry_run_leaves_files_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let original = r#"<svg width="10" height="10"/>"#;
    write(dir.path(), "square.svg", original);

    let options = BatchOptions::new(NormalizeOptions::default()).with_dry_run(true);
    let report = normalize_dir(dir.path(), &options).expect("Should run");

    assert_eq!(report.normalized(), 1);
    assert!(matches!(report.files[0].1, FileOutcome::Normalized(_)));
    assert_eq!(
        fs::read_to_string(dir.path().join("square.svg")).unwrap(),
        original
    );
}

#[test]
fn test_batch_twice_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "icon.svg",
        r##"<svg width="24" height="24"><defs><linearGradient id="g"/></defs><rect fill="url(#g)"/></svg>"##,
    );

    normalize_dir(dir.path(), &BatchOptions::default()).expect("first run");
    let first = fs::read_to_string(dir.path().join("icon.svg")).unwrap();
    normalize_dir(dir.path(), &BatchOptions::default()).expect("second run");
    let second = fs::read_to_string(dir.path().join("icon.svg")).unwrap();

    assert_eq!(first, second);
    assert!(first.contains(r#"id="icon_g""#));
    assert!(first.contains("url(#icon_g)"));
}

#[test]
fn test_batch_replaces_files_without_leftovers() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "a.svg", r#"<svg width="8" height="8"/>"#);
    write(dir.path(), "b.svg", r#"<svg viewBox="0 0 1 1"/>"#);

    let report = normalize_dir(dir.path(), &BatchOptions::default()).expect("Should run");
    assert_eq!(report.normalized(), 2);

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.svg", "b.svg"]);
}

#[cfg(unix)]
#[test]
fn test_batch_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("shared.svg");
    write(dir.path(), "shared.svg", r#"<svg width="8" height="8"/>"#);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    normalize_dir(dir.path(), &BatchOptions::default()).expect("Should run");

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
    assert_eq!(read_root(&path).root.attr("viewBox"), Some("0 0 8 8"));
}

/// In-memory stand-in for a font toolkit glyph
struct FakeGlyph {
    name: &'static str,
    outline: Option<&'static str>,
    bbox: Option<BoundingBox>,
    fail_export: bool,
    exports: Cell<usize>,
}

impl FakeGlyph {
    fn new(name: &'static str, outline: &'static str, bbox: BoundingBox) -> Self {
        Self {
            name,
            outline: Some(outline),
            bbox: Some(bbox),
            fail_export: false,
            exports: Cell::new(0),
        }
    }

    fn empty(name: &'static str) -> Self {
        Self {
            name,
            outline: None,
            bbox: None,
            fail_export: false,
            exports: Cell::new(0),
        }
    }
}

impl Glyph for FakeGlyph {
    fn name(&self) -> &str {
        self.name
    }

    fn is_empty(&self) -> bool {
        self.outline.is_none()
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox
    }

    fn export_svg(&self, path: &Path) -> Result<(), GlyphError> {
        self.exports.set(self.exports.get() + 1);
        if self.fail_export {
            return Err(GlyphError::export(self.name, "toolkit refused"));
        }
        let outline = self.outline.unwrap_or_default();
        fs::write(path, outline).map_err(|e| GlyphError::export(self.name, e.to_string()))
    }
}

const EXPORTED: &str = r#"<?xml version="1.0" standalone="no"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 -800 1000 1000"><path id="outline" d="M0 0h10v20H0z"/></svg>"#;

#[test]
fn test_export_glyphs_creates_dir_and_normalizes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_dir = dir.path().join("icons");

    let mut broken = FakeGlyph::new("B", EXPORTED, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    broken.fail_export = true;
    let glyphs = vec![
        FakeGlyph::new("arrow/up", EXPORTED, BoundingBox::new(0.0, 0.0, 10.0, 20.0)),
        FakeGlyph::empty("space"),
        broken,
        FakeGlyph::new("bad", "<svg><g></svg>", BoundingBox::new(0.0, 0.0, 1.0, 1.0)),
    ];

    let report =
        export_glyphs(&glyphs, &out_dir, &NormalizeOptions::default()).expect("Should export");

    assert_eq!(report.exported(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(glyphs[1].exports.get(), 0, "empty glyphs are never exported");

    let arrow = read_root(&out_dir.join(glyph_file_name("arrow/up")));
    // The glyph bbox replaces the exporter's em-box viewBox
    assert_eq!(arrow.root.attr("viewBox"), Some("-5.0 0.0 20 20"));
    let path = arrow.root.child_elements().next().expect("path");
    assert_eq!(path.attr("id"), Some("arrow_up_outline"));

    assert!(matches!(
        report.glyphs[3].1,
        GlyphOutcome::ExportedUnnormalized(_, NormalizeError::Xml { .. })
    ));
    assert!(report
        .summary(&out_dir)
        .starts_with("Exported 2 glyphs to "));
}
