mod common;

use common::{ArchiveBuilder, all_literals, directory_size, script_like, set_directory_size};
use zunarc_archive::{
    ArchiveDecoder, CancelToken, ChecksumPolicy, Cipher, DecodeOptions, decode, decode_one,
};
use zunarc_core::{Crc32, ZunError};

#[test]
fn test_literal_entry_and_run_entry() {
    let literals = all_literals();
    let run = vec![0x41u8; 64];
    let archive = ArchiveBuilder::new()
        .add("A", &literals)
        .add("B", &run)
        .build();

    let result = decode(&archive).unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.is_complete());

    let a = result.get("A").unwrap().as_ref().unwrap();
    assert_eq!(a.data, literals);
    assert_eq!(a.descriptor.decompressed_len as usize, literals.len());

    let b = result.get("B").unwrap().as_ref().unwrap();
    assert_eq!(b.data, run);
    assert!(b.descriptor.compressed_len < 64);
}

#[test]
fn test_results_follow_directory_order() {
    let archive = ArchiveBuilder::new()
        .add("stage3.ecl", b"third third third")
        .add("stage1.ecl", b"first first first")
        .add("stage2.ecl", b"second second second")
        .build();

    let names: Vec<_> = decode(&archive)
        .unwrap()
        .iter()
        .map(|(name, _)| name.to_string())
        .collect();
    assert_eq!(names, ["stage3.ecl", "stage1.ecl", "stage2.ecl"]);
}

#[test]
fn test_truncated_third_descriptor_fails_container() {
    let mut archive = ArchiveBuilder::new()
        .add("one", b"1111111111")
        .add("two", b"2222222222")
        .add("three", b"3333333333")
        .build();
    let size = directory_size(&archive);
    set_directory_size(&mut archive, size - 3);

    let err = decode(&archive).unwrap_err();
    assert!(matches!(err, ZunError::MalformedContainer { .. }));
    assert!(err.is_container_error());
}

#[test]
fn test_checksum_mismatch_is_isolated() {
    let good = script_like(3000);
    let archive = ArchiveBuilder::new()
        .add("good.txt", &good)
        .add_with_checksum("bad.txt", b"bad bad bad bad", Some(0x1234_5678))
        .add("also_good.txt", b"still fine")
        .build();

    let result = decode(&archive).unwrap();
    assert_eq!(result.len(), 3);
    assert!(!result.is_complete());
    assert_eq!(result.successes().count(), 2);

    let failures: Vec<_> = result.failures().collect();
    assert_eq!(failures.len(), 1);
    let (name, failure) = failures[0];
    assert_eq!(name, "bad.txt");
    assert_eq!(
        failure.error,
        ZunError::ChecksumMismatch {
            expected: 0x1234_5678,
            computed: Crc32::compute(b"bad bad bad bad"),
        }
    );
    assert!(failure.salvaged.is_none());

    let good_entry = result.get("good.txt").unwrap().as_ref().unwrap();
    assert_eq!(good_entry.data, good);
}

#[test]
fn test_keep_policy_salvages_bytes() {
    let archive = ArchiveBuilder::new()
        .add_with_checksum("bad.txt", b"salvage me please", Some(0))
        .build();
    let decoder =
        ArchiveDecoder::new(DecodeOptions::new().with_checksum_policy(ChecksumPolicy::Keep));

    let result = decoder.decode(&archive).unwrap();
    let failure = result.get("bad.txt").unwrap().as_ref().unwrap_err();
    assert!(matches!(failure.error, ZunError::ChecksumMismatch { .. }));
    assert_eq!(failure.salvaged.as_deref(), Some(&b"salvage me please"[..]));
}

#[test]
fn test_verification_can_be_disabled() {
    let archive = ArchiveBuilder::new()
        .add_with_checksum("bad.txt", b"unchecked", Some(0))
        .build();
    let decoder = ArchiveDecoder::new(DecodeOptions::new().with_verify_checksums(false));

    let result = decoder.decode(&archive).unwrap();
    assert!(result.is_complete());
}

#[test]
fn test_entry_without_checksum() {
    let archive = ArchiveBuilder::new()
        .add_with_checksum("plain", b"no crc stored here", None)
        .build();

    let entry = decode_one(&archive, "plain").unwrap();
    assert_eq!(entry.data, b"no crc stored here");
    assert!(entry.descriptor.checksum.is_none());
}

#[test]
fn test_corrupt_stream_is_isolated() {
    let archive = ArchiveBuilder::new()
        .add("ok", b"fine fine fine")
        .add_raw("broken", vec![0xFF], 100, None, Cipher::None)
        .build();

    let result = decode(&archive).unwrap();
    assert!(result.get("ok").unwrap().is_ok());

    let failure = result.get("broken").unwrap().as_ref().unwrap_err();
    assert!(matches!(failure.error, ZunError::CorruptStream { .. }));
    assert!(failure.error.is_entry_error());
}

#[test]
fn test_overrun_is_reported() {
    // Literal 'a' then one 9-byte copy, declared as only 5 bytes
    let payload = zunarc_lzss::compress(&[b'a'; 10]);
    let archive = ArchiveBuilder::new()
        .add_raw("short", payload, 5, None, Cipher::None)
        .build();

    let failure = decode(&archive)
        .unwrap()
        .get("short")
        .unwrap()
        .clone()
        .unwrap_err();
    assert_eq!(
        failure.error,
        ZunError::OverrunOutput {
            declared: 5,
            attempted: 10
        }
    );
}

#[test]
fn test_stored_entries() {
    let data = b"stored verbatim, never LZSS".to_vec();
    let archive = ArchiveBuilder::new()
        .add_stored("raw.bin", &data)
        .add_stored("empty.bin", b"")
        .build();

    let result = decode(&archive).unwrap();
    let entry = result.get("raw.bin").unwrap().as_ref().unwrap();
    assert!(entry.descriptor.is_stored());
    assert_eq!(entry.data, data);

    let empty = result.get("empty.bin").unwrap().as_ref().unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_encrypted_entries() {
    let text = script_like(5000);
    let archive = ArchiveBuilder::new()
        .add_encrypted("th06.msg", &text, Cipher::Additive { key: 0x77 })
        .add_encrypted(
            "th08.msg",
            &text,
            Cipher::Block {
                block_size: 0x400,
                base: 0x1b,
                add: 0x37,
            },
        )
        .add_encrypted(
            "odd.msg",
            b"odd length payload!",
            Cipher::Block {
                block_size: 0x40,
                base: 0xAA,
                add: 0xE1,
            },
        )
        .build();

    let result = decode(&archive).unwrap();
    assert!(result.is_complete());
    for name in ["th06.msg", "th08.msg"] {
        let entry = result.get(name).unwrap().as_ref().unwrap();
        assert!(entry.descriptor.is_encrypted());
        assert_eq!(entry.data, text, "{name}");
    }
    assert_eq!(
        result.get("odd.msg").unwrap().as_ref().unwrap().data,
        b"odd length payload!"
    );
}

#[test]
fn test_zero_block_size_fails_entry_only() {
    let archive = ArchiveBuilder::new()
        .add("fine", b"fine")
        .add_raw(
            "weird",
            vec![1, 2, 3],
            3,
            None,
            Cipher::Block {
                block_size: 0,
                base: 0,
                add: 0,
            },
        )
        .build();

    let result = decode(&archive).unwrap();
    assert!(result.get("fine").unwrap().is_ok());
    assert!(matches!(
        result.get("weird").unwrap().as_ref().unwrap_err().error,
        ZunError::InvalidParameters { .. }
    ));
}

#[test]
fn test_duplicate_names_last_wins() {
    let archive = ArchiveBuilder::new()
        .add("dup", b"first version")
        .add("other", b"other entry")
        .add("dup", b"second version")
        .build();

    let result = decode(&archive).unwrap();
    assert_eq!(result.len(), 2);

    let names: Vec<_> = result.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["dup", "other"]);
    assert_eq!(
        result.get("dup").unwrap().as_ref().unwrap().data,
        b"second version"
    );
    assert_eq!(decode_one(&archive, "dup").unwrap().data, b"second version");
}

#[test]
fn test_decode_is_idempotent() {
    let archive = ArchiveBuilder::new()
        .add("a", &script_like(20_000))
        .add_with_checksum("b", b"bbbbbbbbbbbb", Some(1))
        .build();

    assert_eq!(decode(&archive).unwrap(), decode(&archive).unwrap());
}

#[cfg(feature = "parallel")]
#[test]
fn test_sequential_matches_parallel() {
    let mut builder = ArchiveBuilder::new();
    for i in 0..16 {
        builder = builder.add(&format!("entry{i:02}.bin"), &script_like(500 + i * 300));
    }
    let archive = builder.build();

    let sequential = ArchiveDecoder::new(DecodeOptions::new().with_parallel(false))
        .decode(&archive)
        .unwrap();
    let parallel = ArchiveDecoder::new(DecodeOptions::new().with_parallel(true))
        .decode(&archive)
        .unwrap();
    assert_eq!(sequential, parallel);
    assert!(sequential.is_complete());
}

#[test]
fn test_cancelled_before_start() {
    let archive = ArchiveBuilder::new()
        .add("a", b"aaaa")
        .add("b", b"bbbb")
        .build();
    let token = CancelToken::new();
    token.cancel();

    let result = ArchiveDecoder::default()
        .decode_with_cancel(&archive, &token)
        .unwrap();
    assert_eq!(result.len(), 2);
    assert!(
        result
            .failures()
            .all(|(_, f)| f.error == ZunError::Cancelled)
    );
}

#[test]
fn test_uncancelled_token_decodes_everything() {
    let archive = ArchiveBuilder::new().add("a", b"aaaa").build();
    let result = ArchiveDecoder::default()
        .decode_with_cancel(&archive, &CancelToken::new())
        .unwrap();
    assert!(result.is_complete());
}

#[test]
fn test_decode_one() {
    let archive = ArchiveBuilder::new()
        .add("wanted", b"the one we want")
        .add_with_checksum("bad", b"broken checksum", Some(7))
        .build();

    assert_eq!(
        decode_one(&archive, "wanted").unwrap().data,
        b"the one we want"
    );
    assert_eq!(
        decode_one(&archive, "missing"),
        Err(ZunError::EntryNotFound {
            name: "missing".to_string()
        })
    );
    assert!(matches!(
        decode_one(&archive, "bad"),
        Err(ZunError::ChecksumMismatch { expected: 7, .. })
    ));
}

#[test]
fn test_empty_archive() {
    let archive = ArchiveBuilder::new().build();
    let result = decode(&archive).unwrap();
    assert!(result.is_empty());
    assert!(result.is_complete());
}

#[test]
fn test_entry_size_limit() {
    let archive = ArchiveBuilder::new().add("big", &vec![0u8; 4096]).build();
    let decoder = ArchiveDecoder::new(DecodeOptions::new().with_max_entry_size(1024));
    assert!(matches!(
        decoder.decode(&archive),
        Err(ZunError::MalformedContainer { .. })
    ));
}

#[test]
fn test_list_does_not_decode() {
    let archive = ArchiveBuilder::new()
        .add("x", b"xxxxxxxxxxxx")
        .add_raw("broken", vec![0xFF], 100, None, Cipher::None)
        .build();

    let container = ArchiveDecoder::default().list(&archive).unwrap();
    assert_eq!(container.entries.len(), 2);
    assert_eq!(container.entries[1].name, "broken");
    assert_eq!(container.total_decompressed(), 112);
}
