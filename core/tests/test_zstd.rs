
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use compression_core::compression::codecs::{
        compress_bound, decompress_bound, CParameter, ZstdCodec, ZstdDictionary, ZstdOptions,
    };
    use compression_core::compression::{output_bound, CodecKind, CompressionError, Compressor};

    const DICTIONARY: &[u8] = b"asset_id=texture/character/hero_diffuse.dds;mip=0;format=bc7;\
asset_id=texture/character/hero_normal.dds;mip=0;format=bc5;";

    fn record(i: usize) -> Vec<u8> {
        format!("asset_id=texture/character/hero_{i}.dds;mip={};format=bc7;", i % 4).into_bytes()
    }

    fn compress_with(codec: &mut ZstdCodec<'_>, data: &[u8]) -> Vec<u8> {
        let mut compressed = vec![0u8; compress_bound(data.len())];
        let len = codec.compress(data, &mut compressed).unwrap();
        compressed.truncate(len);
        compressed
    }

    fn decompress_with(codec: &mut ZstdCodec<'_>, compressed: &[u8], len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        let written = codec.decompress(compressed, &mut out).unwrap();
        assert_eq!(written, len);
        out
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_roundtrip_any_level(data in prop::collection::vec(any::<u8>(), 0..4096), level in 1i32..=12) {
            let mut codec = ZstdCodec::with_options(ZstdOptions::for_level(level)).unwrap();
            let compressed = compress_with(&mut codec, &data);
            prop_assert!(compressed.len() <= compress_bound(data.len()));

            let mut out = vec![0u8; data.len()];
            let written = codec.decompress(&compressed, &mut out).unwrap();
            prop_assert_eq!(written, data.len());
            prop_assert_eq!(out, data);
        }
    }

    #[test]
    fn default_options() {
        let options = ZstdOptions::default();
        assert_eq!(options.level, 6);
        assert!(options.content_size);
        assert_eq!(ZstdOptions::for_level(19).level, 19);
        assert_eq!(ZstdCodec::new().unwrap().options(), &options);
    }

    #[test]
    fn checksum_and_window_options_roundtrip() {
        let options = ZstdOptions { level: 3, window_log: Some(20), checksum: true, content_size: false };
        let mut codec = ZstdCodec::with_options(options).unwrap();
        let data = record(7).repeat(200);
        let compressed = compress_with(&mut codec, &data);
        assert_eq!(decompress_with(&mut codec, &compressed, data.len()), data);
    }

    #[test]
    fn raw_parameters_pass_through() {
        let mut codec = ZstdCodec::new().unwrap();
        codec.set_compression_parameter(CParameter::ChecksumFlag(true)).unwrap();
        let data = record(1).repeat(64);
        let compressed = compress_with(&mut codec, &data);
        assert_eq!(decompress_with(&mut codec, &compressed, data.len()), data);
    }

    #[test]
    fn level_parameter_survives_dictionary_load() {
        let mut codec = ZstdCodec::new().unwrap();
        codec.set_compression_parameter(CParameter::CompressionLevel(19)).unwrap();
        assert_eq!(codec.options().level, 19);

        codec.load_dictionary(DICTIONARY).unwrap();
        assert_eq!(codec.options().level, 19);

        let data = record(4).repeat(32);
        let compressed = compress_with(&mut codec, &data);
        assert_eq!(decompress_with(&mut codec, &compressed, data.len()), data);
    }

    #[test]
    fn copied_dictionary_roundtrip() {
        let mut codec = ZstdCodec::new().unwrap();
        codec.load_dictionary(DICTIONARY).unwrap();

        let data = record(3);
        let compressed = compress_with(&mut codec, &data);
        assert_eq!(decompress_with(&mut codec, &compressed, data.len()), data);

        let mut plain = ZstdCodec::new().unwrap();
        let without = compress_with(&mut plain, &data);
        assert!(compressed.len() < without.len());
    }

    #[test]
    fn prepared_dictionary_by_copy_and_by_reference() {
        let owned = ZstdDictionary::copy(DICTIONARY, 6);
        let bytes = DICTIONARY.to_vec();
        let borrowed = ZstdDictionary::borrowed(&bytes, 6);
        let data = record(2);

        for dictionary in [&owned, &borrowed] {
            let mut codec = ZstdCodec::new().unwrap();
            codec.ref_dictionary(dictionary).unwrap();
            let compressed = compress_with(&mut codec, &data);
            assert_eq!(decompress_with(&mut codec, &compressed, data.len()), data);
        }
    }

    #[test]
    fn unloaded_dictionary_leaves_plain_codec() {
        let mut codec = ZstdCodec::new().unwrap();
        codec.load_dictionary(DICTIONARY).unwrap();
        codec.unload_dictionary().unwrap();

        let data = record(5).repeat(10);
        let compressed = compress_with(&mut codec, &data);

        let mut fresh = ZstdCodec::new().unwrap();
        assert_eq!(decompress_with(&mut fresh, &compressed, data.len()), data);
    }

    #[test]
    fn bounds_cover_actual_sizes() {
        let data = record(9).repeat(100);
        let mut codec = ZstdCodec::new().unwrap();
        assert_eq!(Compressor::compress_bound(&codec, data.len()).unwrap(), compress_bound(data.len()));

        let compressed = compress_with(&mut codec, &data);
        assert!(compressed.len() <= compress_bound(data.len()));
        assert!(decompress_bound(&compressed).unwrap() >= data.len());
        assert_eq!(output_bound(CodecKind::Zstd, &compressed).unwrap(), Some(decompress_bound(&compressed).unwrap()));
        assert_eq!(output_bound(CodecKind::Lz4, &compressed).unwrap(), None);
    }

    #[test]
    fn decompress_bound_rejects_non_frames() {
        let err = decompress_bound(b"definitely not zstd").unwrap_err();
        assert!(matches!(err, CompressionError::Corrupt { codec: CodecKind::Zstd, .. }));
    }

    #[test]
    fn undersized_output_fails() {
        let data = record(4).repeat(50);
        let mut codec = ZstdCodec::new().unwrap();
        let compressed = compress_with(&mut codec, &data);

        let mut out = vec![0u8; data.len() - 1];
        let err = codec.decompress(&compressed, &mut out).unwrap_err();
        assert!(matches!(err, CompressionError::Corrupt { .. }));
    }

    #[test]
    fn undersized_compress_target_is_resource_error() {
        let data: Vec<u8> = (0..2048u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
        let mut codec = ZstdCodec::new().unwrap();
        let mut out = [0u8; 8];
        let err = codec.compress(&data, &mut out).unwrap_err();
        assert!(matches!(err, CompressionError::ResourceError { .. }));
    }
}
