use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use usvg::fontdb;

/// Font discovery options.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontOpts {
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
    /// Also load the fonts installed on this machine.
    pub load_system_fonts: bool,
    /// Family tried when a layer's family is not installed.
    pub default_family: String,
}

impl Default for FontOpts {
    fn default() -> Self {
        Self {
            font_dirs: Vec::new(),
            load_system_fonts: true,
            default_family: "Arial".to_owned(),
        }
    }
}

impl FontOpts {
    /// Return options with an additional font directory.
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Return options with system font loading toggled.
    pub fn with_system_fonts(mut self, enabled: bool) -> Self {
        self.load_system_fonts = enabled;
        self
    }
}

/// Raw bytes of one font face, ready for shaping and glyph rendering.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    /// Family name reported by the font database.
    pub family: String,
    /// Whole font file (may be a collection).
    pub data: Arc<Vec<u8>>,
    /// Face index inside `data`.
    pub index: u32,
}

/// Family-name → font-bytes resolver backed by `fontdb`.
///
/// Lookups fall back from the requested family to [`FontOpts::default_family`], then to the
/// generic sans-serif family, then to any loaded face. Results (including misses) are memoized
/// per requested family.
pub struct FontBook {
    db: fontdb::Database,
    default_family: String,
    cache: HashMap<String, Option<ResolvedFont>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .field("default_family", &self.default_family)
            .finish()
    }
}

impl FontBook {
    /// Build a font book, scanning the configured sources.
    #[tracing::instrument(skip_all, fields(dirs = opts.font_dirs.len(), system = opts.load_system_fonts))]
    pub fn new(opts: &FontOpts) -> Self {
        let mut db = fontdb::Database::new();
        if opts.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &opts.font_dirs {
            db.load_fonts_dir(dir);
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self {
            db,
            default_family: opts.default_family.clone(),
            cache: HashMap::new(),
        }
    }

    /// A book with no faces; add fonts with [`FontBook::register_font_data`].
    pub fn empty() -> Self {
        Self::new(&FontOpts::default().with_system_fonts(false))
    }

    /// Number of loaded faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Add an in-memory font file. Invalidates memoized lookups.
    pub fn register_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
        self.cache.clear();
    }

    /// Sorted, de-duplicated family names of every loaded face.
    pub fn families(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Resolve a family to font bytes, following the fallback chain.
    pub fn resolve(&mut self, family: &str) -> Option<ResolvedFont> {
        if let Some(hit) = self.cache.get(family) {
            return hit.clone();
        }
        let resolved = self.lookup(family);
        match &resolved {
            Some(font) if !font.family.eq_ignore_ascii_case(family) => {
                tracing::debug!(requested = family, using = %font.family, "font fallback");
            }
            None => tracing::warn!(requested = family, "no font available"),
            _ => {}
        }
        self.cache.insert(family.to_owned(), resolved.clone());
        resolved
    }

    fn lookup(&self, family: &str) -> Option<ResolvedFont> {
        let families = [
            fontdb::Family::Name(family),
            fontdb::Family::Name(&self.default_family),
            fontdb::Family::SansSerif,
        ];
        let id = self
            .db
            .query(&fontdb::Query {
                families: &families,
                ..fontdb::Query::default()
            })
            .or_else(|| self.db.faces().next().map(|face| face.id))?;

        let family_name = self
            .db
            .face(id)
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| family.to_owned());
        self.db.with_face_data(id, |data, index| ResolvedFont {
            family: family_name,
            data: Arc::new(data.to_vec()),
            index,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
