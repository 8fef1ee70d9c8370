// SPDX-License-Identifier: MIT
//! Integration tests for GLB container output
//!
//! These exercise the public API end to end: staging buffer views, routing
//! named buffers to external streams and checking the exact bytes written.

use glb_writer::{
    temp_file_store, BufferWriter, ChunkType, FileStreamWriter, GlbError, GlbResourceWriter,
    MemoryStreamWriter, GLB_BUFFER_ID,
};
use std::sync::Arc;

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

#[test]
fn empty_object_manifest_without_binary() {
    let streams = MemoryStreamWriter::new();
    let mut writer = GlbResourceWriter::new(streams.clone());

    let layout = writer.finalize("{}", "empty.glb").unwrap();
    let bytes = streams.contents("empty.glb").unwrap();

    assert_eq!(layout.json_chunk_len(), 4);
    assert_eq!(layout.bin_chunk_len(), 0);
    assert_eq!(layout.total_len, 32);
    assert_eq!(bytes.len(), 32);

    assert_eq!(&bytes[0..4], b"glTF");
    assert_eq!(read_u32(&bytes, 4), 2);
    assert_eq!(read_u32(&bytes, 8), 32);
    assert_eq!(read_u32(&bytes, 12), 4);
    assert_eq!(read_u32(&bytes, 16), ChunkType::Json.tag_u32());
    assert_eq!(&bytes[20..24], b"{}  ");
    assert_eq!(read_u32(&bytes, 24), 0);
    assert_eq!(read_u32(&bytes, 28), ChunkType::Bin.tag_u32());
}

#[test]
fn aligned_manifest_with_five_staged_bytes() {
    let streams = MemoryStreamWriter::new();
    let mut writer = GlbResourceWriter::new(streams.clone());
    writer
        .write_buffer_view(GLB_BUFFER_ID, &[9, 8, 7, 6, 5])
        .unwrap();

    let manifest = r#"{"x":1}"#.to_string() + " ";
    assert_eq!(manifest.len(), 8);

    let layout = writer.finalize(&manifest, "b.glb").unwrap();
    let bytes = streams.contents("b.glb").unwrap();

    assert_eq!(layout.json_padding, 0);
    assert_eq!(layout.bin_padding, 3);
    assert_eq!(layout.total_len, 44);
    assert_eq!(bytes.len(), 44);
    assert_eq!(read_u32(&bytes, 12), 8);
    assert_eq!(read_u32(&bytes, 28), 8);
    assert_eq!(&bytes[36..41], &[9, 8, 7, 6, 5]);
    assert!(bytes[41..44].iter().all(|&b| b == 0));
}

#[test]
fn sequential_appends_accumulate_in_order() {
    let streams = MemoryStreamWriter::new();
    let mut writer = GlbResourceWriter::new(streams.clone());

    let first = writer.write_buffer_view(GLB_BUFFER_ID, b"abc").unwrap();
    let second = writer.write_buffer_view(GLB_BUFFER_ID, b"defgh").unwrap();

    assert_eq!(first.byte_offset, 0);
    assert_eq!(second.byte_offset, 3);
    assert_eq!(writer.staged_len(), 8);

    let layout = writer.finalize("{}", "d.glb").unwrap();
    assert_eq!(layout.bin_chunk_len(), 8);
    assert_eq!(layout.bin_padding, 0);

    let bytes = streams.contents("d.glb").unwrap();
    let bin_start = layout.bin_chunk_offset() as usize + 8;
    assert_eq!(&bytes[bin_start..bin_start + 8], b"abcdefgh");
}

#[test]
fn unresolvable_destination_fails_without_output() {
    let streams = MemoryStreamWriter::new();
    streams.refuse("blocked.glb");
    let mut writer = GlbResourceWriter::new(streams.clone());
    writer.write_buffer_view(GLB_BUFFER_ID, b"data").unwrap();

    let result = writer.finalize("{}", "blocked.glb");

    assert!(matches!(result, Err(GlbError::StreamUnavailable { .. })));
    assert!(streams.contents("blocked.glb").is_none());
    assert!(streams.uris().is_empty());

    // Nothing was written, so a different destination still works
    let layout = writer.finalize("{}", "retry.glb").unwrap();
    assert_eq!(streams.contents("retry.glb").unwrap().len(), layout.total_len as usize);
}

#[test]
fn named_buffers_stay_external() {
    let streams = MemoryStreamWriter::new();
    let mut writer = GlbResourceWriter::builder(streams.clone())
        .uri_prefix("scene_")
        .build();

    writer.write_buffer_view("textures", b"png-bytes").unwrap();
    writer.write_buffer_view(GLB_BUFFER_ID, b"mesh").unwrap();

    assert_eq!(
        writer.buffer_uri("textures").unwrap().as_deref(),
        Some("scene_textures.bin")
    );
    assert_eq!(writer.buffer_uri(GLB_BUFFER_ID).unwrap(), None);
    assert_eq!(
        streams.contents("scene_textures.bin").unwrap(),
        b"png-bytes"
    );

    let layout = writer.finalize("{}", "scene.glb").unwrap();
    assert_eq!(layout.bin_len, 4);
    assert_eq!(writer.buffer_offset("textures"), 9);
}

#[test]
fn embedded_stream_handle_is_shared() {
    let mut writer = GlbResourceWriter::new(MemoryStreamWriter::new());

    let a = writer.buffer_stream(GLB_BUFFER_ID).unwrap();
    writer.write_buffer_view(GLB_BUFFER_ID, b"xyz").unwrap();
    let b = writer.buffer_stream(GLB_BUFFER_ID).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn temp_file_staging_matches_memory_staging() {
    let memory_streams = MemoryStreamWriter::new();
    let mut memory_writer = GlbResourceWriter::new(memory_streams.clone());

    let file_streams = MemoryStreamWriter::new();
    let mut file_writer = GlbResourceWriter::builder(file_streams.clone())
        .staging(temp_file_store().unwrap())
        .build();

    let payload: Vec<u8> = (0..=254u8).collect();
    for writer_views in [&payload[..100], &payload[100..]] {
        memory_writer
            .write_buffer_view_aligned(GLB_BUFFER_ID, writer_views, 4)
            .unwrap();
        file_writer
            .write_buffer_view_aligned(GLB_BUFFER_ID, writer_views, 4)
            .unwrap();
    }

    let manifest = r#"{"asset":{"version":"2.0"},"buffers":[{"byteLength":255}]}"#;
    memory_writer.finalize(manifest, "m.glb").unwrap();
    file_writer.finalize(manifest, "f.glb").unwrap();

    assert_eq!(
        memory_streams.contents("m.glb").unwrap(),
        file_streams.contents("f.glb").unwrap()
    );
}

#[test]
fn writes_container_file_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = GlbResourceWriter::new(FileStreamWriter::new(dir.path()));

    writer
        .write_buffer_view(GLB_BUFFER_ID, &[1, 2, 3, 4, 5, 6])
        .unwrap();
    let layout = writer
        .finalize(r#"{"asset":{"version":"2.0"}}"#, "models/box.glb")
        .unwrap();

    let bytes = std::fs::read(dir.path().join("models/box.glb")).unwrap();
    assert_eq!(bytes.len(), layout.total_len as usize);
    assert_eq!(read_u32(&bytes, 8), layout.total_len);
    assert_eq!(bytes.len() % 4, 0);
}
