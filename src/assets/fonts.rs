use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use crate::foundation::{config::FontSearchConfig, core::FontWeight};

const FONT_EXTS: [&str; 4] = ["ttf", "otf", "TTF", "OTF"];

/// Where a resolved face came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// A preferred face found in one of the search directories.
    Preferred(PathBuf),
    /// A generic fallback font file.
    Fallback(PathBuf),
    /// A face picked from the system font database.
    System(String),
    /// The built-in bitmap face.
    Builtin,
}

#[derive(Clone)]
pub(crate) struct OutlineData {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
}

/// A resolved face for one weight. Shared read-only between handles and threads.
pub struct FontFace {
    weight: FontWeight,
    source: FontSource,
    family: Option<String>,
    pub(crate) outline: Option<OutlineData>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("weight", &self.weight)
            .field("source", &self.source)
            .field("family", &self.family)
            .field(
                "outline_len",
                &self.outline.as_ref().map(|o| o.bytes.len()),
            )
            .finish()
    }
}

impl FontFace {
    /// Weight this face was resolved for.
    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// Where the face came from.
    pub fn source(&self) -> &FontSource {
        &self.source
    }

    /// Family name read from the font data, `None` for the built-in face.
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Whether this is the built-in bitmap face.
    pub fn is_builtin(&self) -> bool {
        self.outline.is_none()
    }

    fn builtin(weight: FontWeight) -> Self {
        Self {
            weight,
            source: FontSource::Builtin,
            family: None,
            outline: None,
        }
    }
}

/// A face bound to a point size. Handles with equal weight and size from the same provider share
/// the same face and therefore measure identically.
#[derive(Clone, Debug)]
pub struct FontHandle {
    face: Arc<FontFace>,
    size_pt: u32,
}

impl FontHandle {
    /// Weight category.
    pub fn weight(&self) -> FontWeight {
        self.face.weight
    }

    /// Point size (used as pixels per em).
    pub fn size_pt(&self) -> u32 {
        self.size_pt
    }

    /// Underlying face.
    pub fn face(&self) -> &Arc<FontFace> {
        &self.face
    }

    pub(crate) fn face_key(&self) -> usize {
        Arc::as_ptr(&self.face) as usize
    }
}

/// Resolves a weight and point size to a renderable font.
///
/// Lookup per weight runs once and never fails: preferred stems across the search directories
/// (direct names, then a recursive scan of the same directory), then generic fallback files, then
/// the system font database, then the built-in bitmap face.
#[derive(Debug)]
pub struct FontProvider {
    search: FontSearchConfig,
    faces: [OnceLock<Arc<FontFace>>; 2],
}

impl FontProvider {
    /// Provider over an explicit search configuration.
    pub fn new(search: FontSearchConfig) -> Self {
        Self {
            search,
            faces: [OnceLock::new(), OnceLock::new()],
        }
    }

    /// Search configuration in use.
    pub fn search(&self) -> &FontSearchConfig {
        &self.search
    }

    /// Bind the face for `weight` to `size_pt` (clamped to at least 1).
    pub fn resolve(&self, weight: FontWeight, size_pt: u32) -> FontHandle {
        FontHandle {
            face: self.face(weight),
            size_pt: size_pt.max(1),
        }
    }

    /// Face for `weight`, resolving it on first use.
    pub fn face(&self, weight: FontWeight) -> Arc<FontFace> {
        self.faces[weight.index()]
            .get_or_init(|| Arc::new(resolve_face(&self.search, weight)))
            .clone()
    }
}

#[tracing::instrument(skip(search))]
fn resolve_face(search: &FontSearchConfig, weight: FontWeight) -> FontFace {
    if let Some(path) = find_preferred(&search.dirs, search.stems(weight))
        && let Some(face) = load_file(&path, weight, FontSource::Preferred(path.clone()))
    {
        tracing::debug!(%weight, path = %path.display(), "resolved preferred font");
        return face;
    }

    tracing::warn!(
        %weight,
        stems = ?search.stems(weight),
        "preferred font not found, trying fallback fonts"
    );

    for path in search.fallbacks(weight) {
        if !path.is_file() {
            continue;
        }
        if let Some(face) = load_file(path, weight, FontSource::Fallback(path.clone())) {
            tracing::debug!(%weight, path = %path.display(), "resolved fallback font");
            return face;
        }
    }

    if search.system_fonts
        && let Some(face) = query_system(weight)
    {
        tracing::debug!(%weight, family = ?face.family, "resolved system font");
        return face;
    }

    tracing::warn!(%weight, "no outline font available, using built-in bitmap font");
    FontFace::builtin(weight)
}

/// First preferred file across `dirs`: direct `<stem>.<ext>` names, then a recursive scan of the
/// same directory, before moving on to the next one.
pub(crate) fn find_preferred(dirs: &[PathBuf], stems: &[String]) -> Option<PathBuf> {
    if stems.is_empty() {
        return None;
    }
    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        for stem in stems {
            for ext in FONT_EXTS {
                let p = dir.join(format!("{stem}.{ext}"));
                if p.is_file() {
                    return Some(p);
                }
            }
        }
        if let Some(p) = scan_dir(dir, stems) {
            return Some(p);
        }
    }
    None
}

fn scan_dir(dir: &Path, stems: &[String]) -> Option<PathBuf> {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return None;
    };
    let mut entries = rd.flatten().collect::<Vec<_>>();
    entries.sort_by_key(|e| e.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let Ok(ft) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if ft.is_dir() {
            subdirs.push(path);
            continue;
        }
        if is_preferred_file(&path, stems) {
            return Some(path);
        }
    }
    subdirs.into_iter().find_map(|d| scan_dir(&d, stems))
}

fn is_preferred_file(path: &Path, stems: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    if ext != "ttf" && ext != "otf" {
        return false;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stems.iter().any(|s| s == stem))
}

fn load_file(path: &Path, weight: FontWeight, source: FontSource) -> Option<FontFace> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read font file");
            return None;
        }
    };
    let Some(family) = probe_family(&bytes, 0) else {
        tracing::warn!(path = %path.display(), "font file has no usable face");
        return None;
    };
    Some(FontFace {
        weight,
        source,
        family: Some(family),
        outline: Some(OutlineData {
            bytes: Arc::new(bytes),
            index: 0,
        }),
    })
}

/// Family name of face `index` in `bytes`, or `None` when the data is not a font.
fn probe_family(bytes: &[u8], index: u32) -> Option<String> {
    let mut db = usvg::fontdb::Database::new();
    db.load_font_data(bytes.to_vec());
    db.faces()
        .find(|f| f.index == index)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
}

fn query_system(weight: FontWeight) -> Option<FontFace> {
    use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

    let mut db = Database::new();
    db.load_system_fonts();

    let families = [
        Family::Name("Montserrat"),
        Family::SansSerif,
        Family::Name("DejaVu Sans"),
        Family::Name("Liberation Sans"),
    ];
    let id = db.query(&Query {
        families: &families,
        weight: Weight(weight.numeric()),
        stretch: Stretch::Normal,
        style: Style::Normal,
    })?;

    let family = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))?;
    let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;

    Some(FontFace {
        weight,
        source: FontSource::System(family.clone()),
        family: Some(family),
        outline: Some(OutlineData {
            bytes: Arc::new(bytes),
            index,
        }),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
