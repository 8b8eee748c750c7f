
#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use compression_core::compression::native::{
        candidate_paths, configure, default_runtime_identifier, platform_extension, probe, resolve_with, ResolverConfig,
    };
    use compression_core::compression::CompressionError;

    fn config_at(base: PathBuf) -> ResolverConfig {
        ResolverConfig::new(Some(base), Some("linux-x64".to_string()))
    }

    #[test]
    fn candidates_follow_runtimes_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path().to_path_buf());
        let Some(ext) = platform_extension() else {
            assert!(candidate_paths("chm", &config).is_empty());
            return;
        };

        let native = dir.path().join("runtimes").join("linux-x64").join("native");
        let candidates = candidate_paths("chm", &config);
        assert_eq!(
            candidates,
            vec![native.join(format!("chm.{ext}")), native.join(format!("libchm.{ext}"))]
        );
    }

    #[test]
    fn lib_prefixed_names_get_one_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path().to_path_buf());
        let Some(ext) = platform_extension() else { return };

        let candidates = candidate_paths("liblzo2", &config);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].ends_with(format!("runtimes/linux-x64/native/liblzo2.{ext}")));
    }

    #[test]
    fn explicit_config_overrides_defaults() {
        let config = ResolverConfig::new(Some(PathBuf::from("/opt/app")), Some("osx-arm64".to_string()));
        assert_eq!(config.base_dir(), Some(PathBuf::from("/opt/app")));
        assert_eq!(config.runtime_identifier().as_deref(), Some("osx-arm64"));
    }

    #[test]
    fn default_config_uses_executable_dir() {
        let config = ResolverConfig::default();
        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(config.base_dir(), Some(exe_dir));
        assert_eq!(config.runtime_identifier(), default_runtime_identifier());
    }

    #[test]
    fn runtime_identifier_shape() {
        if let Some(rid) = default_runtime_identifier() {
            let (os, arch) = rid.split_once('-').unwrap();
            assert!(["win", "linux", "osx"].contains(&os), "{rid}");
            assert!(["x64", "x86", "arm64", "arm"].contains(&arch), "{rid}");
        }
    }

    #[test]
    fn missing_library_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path().to_path_buf());
        let err = resolve_with("compression-core-no-such-codec", &config).unwrap_err();
        assert!(matches!(err, CompressionError::NotFound { ref library } if library == "compression-core-no-such-codec"));
        assert!(!probe("compression-core-no-such-codec"));
    }

    #[test]
    fn unloadable_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path().to_path_buf());
        let Some(ext) = platform_extension() else { return };

        let native = dir.path().join("runtimes").join("linux-x64").join("native");
        fs::create_dir_all(&native).unwrap();
        fs::write(native.join(format!("compression-core-garbage.{ext}")), b"not a shared library").unwrap();
        fs::write(native.join(format!("libcompression-core-garbage.{ext}")), b"still not one").unwrap();

        let err = resolve_with("compression-core-garbage", &config).unwrap_err();
        assert!(matches!(err, CompressionError::NotFound { .. }));
    }

    #[test]
    fn configuration_is_installed_once() {
        let _ = configure(ResolverConfig::default());
        let rejected = ResolverConfig::new(Some(PathBuf::from("/elsewhere")), None);
        assert_eq!(configure(rejected.clone()), Err(rejected));
        assert_ne!(ResolverConfig::current().base_dir(), Some(PathBuf::from("/elsewhere")));
    }
}
