//! compression/registry.rs
//! Codec metadata and the process-wide capability table.
//!
//! Built-in codecs are always available. Runtime-loaded ones are probed
//! through `native::probe` on first query and the answer is kept for the
//! rest of the process: library presence is assumed not to change.
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::compression::native;
use crate::compression::types::CodecKind;

static CAPABILITIES: Lazy<DashMap<CodecKind, bool>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecInfo {
    pub kind: CodecKind,
    pub name: &'static str,
    /// Library stem loaded at runtime; `None` for linked-in codecs.
    pub native_library: Option<&'static str>,
    /// Whether the crate also exposes an encoder for this kind.
    pub can_compress: bool,
}

pub fn codec_info(kind: CodecKind) -> CodecInfo {
    CodecInfo {
        kind,
        name: kind.name(),
        native_library: kind.native_library(),
        can_compress: matches!(kind, CodecKind::Oodle | CodecKind::Zstd),
    }
}

/// Whether `kind` can be decoded right now.
///
/// Concurrent first queries may probe the same library more than once;
/// every probe yields the same answer, so the last insert wins harmlessly.
pub fn is_supported(kind: CodecKind) -> bool {
    let Some(library) = kind.native_library() else {
        return true;
    };

    if let Some(cached) = CAPABILITIES.get(&kind) {
        return *cached;
    }

    let available = native::probe(library);
    log::debug!("capability {kind}: {}", if available { "available" } else { "unavailable" });
    CAPABILITIES.insert(kind, available);
    available
}

/// Every kind whose `is_supported` currently answers true.
pub fn supported_codecs() -> Vec<CodecKind> {
    CodecKind::ALL.into_iter().filter(|kind| is_supported(*kind)).collect()
}
