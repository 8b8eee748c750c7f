//! compression/native.rs
//! Locating and loading the optional codec binaries.
//!
//! Search order, first hit wins:
//! 1. the OS loader's own search (standard paths, already-loaded modules);
//! 2. `<base>/runtimes/<rid>/native/<name>.<ext>`;
//! 3. the same path with a `lib` prefix on the file name.
//!
//! A miss is reported as `CompressionError::NotFound`, never a panic, so an
//! absent optional codec only shows up as "unsupported".
use std::path::{Path, PathBuf};

use libloading::Library;
use once_cell::sync::OnceCell;

use crate::compression::types::CompressionError;

static CONFIG: OnceCell<ResolverConfig> = OnceCell::new();

/// Where to look for codec binaries outside the OS search path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    base_dir: Option<PathBuf>,
    runtime_identifier: Option<String>,
}

impl ResolverConfig {
    /// `None` fields fall back to the executable's directory and the
    /// runtime identifier of the compile target.
    pub fn new(base_dir: Option<PathBuf>, runtime_identifier: Option<String>) -> Self {
        Self { base_dir, runtime_identifier }
    }

    /// The installed process-wide configuration (default if none was installed).
    pub fn current() -> &'static ResolverConfig {
        CONFIG.get_or_init(ResolverConfig::default)
    }

    pub fn base_dir(&self) -> Option<PathBuf> {
        self.base_dir.clone().or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
        })
    }

    pub fn runtime_identifier(&self) -> Option<String> {
        self.runtime_identifier.clone().or_else(default_runtime_identifier)
    }
}

/// Install the process-wide configuration.
///
/// Must happen before the first resolution; capability answers are cached
/// for the process lifetime and would otherwise disagree with later lookups.
///
/// # Errors
/// - Returns the rejected config if one is already installed.
pub fn configure(config: ResolverConfig) -> Result<(), ResolverConfig> {
    CONFIG.set(config)
}

/// `<os>-<arch>` identifier of the compile target, e.g. `linux-x64`.
pub fn default_runtime_identifier() -> Option<String> {
    let os = if cfg!(target_os = "windows") {
        "win"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        return None;
    };

    let arch = match std::env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "x86",
        "aarch64" => "arm64",
        "arm" => "arm",
        _ => return None,
    };

    Some(format!("{os}-{arch}"))
}

/// Shared library extension of the host OS; `None` on unknown systems.
pub fn platform_extension() -> Option<&'static str> {
    if cfg!(target_os = "windows") {
        Some("dll")
    } else if cfg!(target_os = "linux") {
        Some("so")
    } else if cfg!(target_os = "macos") {
        Some("dylib")
    } else {
        None
    }
}

/// Application-relative candidates (steps 2 and 3), in search order.
pub fn candidate_paths(name: &str, config: &ResolverConfig) -> Vec<PathBuf> {
    let (Some(base), Some(rid), Some(ext)) =
        (config.base_dir(), config.runtime_identifier(), platform_extension())
    else {
        return Vec::new();
    };

    let dir = base.join("runtimes").join(rid).join("native");
    let mut candidates = vec![dir.join(format!("{name}.{ext}"))];
    if !name.starts_with("lib") {
        candidates.push(dir.join(format!("lib{name}.{ext}")));
    }
    candidates
}

/// Resolve `name` with the process-wide configuration.
///
/// # Errors
/// - `CompressionError::NotFound` when no candidate could be loaded.
pub fn resolve(name: &str) -> Result<Library, CompressionError> {
    resolve_with(name, ResolverConfig::current())
}

/// Resolve `name` against an explicit configuration.
///
/// # Errors
/// - `CompressionError::NotFound` when no candidate could be loaded.
pub fn resolve_with(name: &str, config: &ResolverConfig) -> Result<Library, CompressionError> {
    if let Some(library) = load_from_os_search(name) {
        return Ok(library);
    }

    for candidate in candidate_paths(name, config) {
        if !candidate.is_file() {
            log::trace!("native {name}: no file at {}", candidate.display());
            continue;
        }
        // SAFETY: loading runs the library's initializers; the files searched
        // here are the codec binaries shipped next to the application.
        match unsafe { Library::new(&candidate) } {
            Ok(library) => {
                log::debug!("native {name}: loaded {}", candidate.display());
                return Ok(library);
            }
            Err(e) => log::warn!("native {name}: failed to load {}: {e}", candidate.display()),
        }
    }

    log::debug!("native {name}: not found");
    Err(CompressionError::NotFound { library: name.to_string() })
}

/// Load and immediately drop `name`; true if it could be located.
pub fn probe(name: &str) -> bool {
    resolve(name).is_ok()
}

fn load_from_os_search(name: &str) -> Option<Library> {
    let names = [libloading::library_filename(name), name.into()];
    for file_name in names {
        // SAFETY: see `resolve_with`.
        match unsafe { Library::new(&file_name) } {
            Ok(library) => {
                log::debug!("native {name}: loaded from OS search path");
                return Some(library);
            }
            Err(e) => log::trace!("native {name}: OS search miss: {e}"),
        }
    }
    None
}

/// Copy an exported function pointer out of `library`.
///
/// # Safety
/// `T` must match the export's real signature, and the copy must not be
/// called once `library` has been dropped.
pub(crate) unsafe fn symbol<T: Copy>(library: &Library, name: &[u8]) -> Result<T, CompressionError> {
    let export = String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)).into_owned();
    let symbol = library
        .get::<T>(name)
        .map_err(|e| CompressionError::NotFound { library: format!("export {export} ({e})") })?;
    Ok(*symbol)
}
