
#[cfg(test)]
mod tests {
    use compression_core::compression::codecs::{
        decoder_memory_size, first_chunk_compressor, OodleCompressor, OodleEncoder, OodleLevel, OodleVersion,
    };
    use compression_core::compression::{is_supported, CodecKind, CompressionError, Compressor};

    #[test]
    fn version_word_layout() {
        let word = OodleVersion::encode(2, 9, 48);
        assert_eq!(word, 0x2E02_0930);

        let version = OodleVersion::parse(word);
        assert_eq!(version.check, 2);
        assert_eq!(version.provider, 0xE);
        assert_eq!(version.major, 2);
        assert_eq!(version.minor, 9);
        assert_eq!(version.seek_table_size, OodleVersion::DEFAULT_SEEK_TABLE_SIZE);
        assert_eq!(version.to_string(), "2.2.9 (provider: E, seek: 48)");
    }

    #[test]
    fn level_aliases() {
        assert_eq!(OodleLevel::MIN as i32, -4);
        assert_eq!(OodleLevel::MAX as i32, 9);
        assert_eq!(OodleLevel::HYPER_FAST, OodleLevel::HyperFast1);
        assert_eq!(OodleLevel::OPTIMAL, OodleLevel::Optimal2);
    }

    #[test]
    fn compressor_ids_match_native_numbering() {
        assert_eq!(OodleCompressor::Invalid as i32, -1);
        assert_eq!(OodleCompressor::Kraken as i32, 8);
        assert_eq!(OodleCompressor::Leviathan as i32, 13);
        assert_eq!(OodleCompressor::try_from(9).unwrap(), OodleCompressor::Mermaid);
    }

    #[test]
    fn missing_library_makes_every_entry_unsupported() {
        if is_supported(CodecKind::Oodle) {
            return;
        }
        assert!(matches!(decoder_memory_size(), Err(CompressionError::Unsupported { .. })));
        assert!(matches!(first_chunk_compressor(&[0x8C, 0x06]), Err(CompressionError::Unsupported { .. })));

        let mut encoder = OodleEncoder::new(OodleCompressor::Kraken, OodleLevel::Normal);
        let mut out = [0u8; 64];
        let err = encoder.compress(b"payload", &mut out).unwrap_err();
        assert!(matches!(err, CompressionError::Unsupported { .. }));
    }

    #[test]
    fn kraken_roundtrip_when_available() {
        if !is_supported(CodecKind::Oodle) {
            return;
        }
        let data = b"oodle oodle oodle kraken kraken kraken ".repeat(64);
        let mut encoder = OodleEncoder::new(OodleCompressor::Kraken, OodleLevel::Normal);
        let mut compressed = vec![0u8; encoder.compress_bound(data.len()).unwrap()];
        let len = encoder.compress(&data, &mut compressed).unwrap();
        compressed.truncate(len);

        assert_eq!(first_chunk_compressor(&compressed).unwrap(), OodleCompressor::Kraken);

        let mut out = vec![0u8; data.len()];
        compression_core::compression::decompress(CodecKind::Oodle, &compressed, &mut out).unwrap();
        assert_eq!(out, data);
    }
}
