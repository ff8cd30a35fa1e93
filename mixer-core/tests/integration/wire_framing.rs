use mixer_core::foundation::{MixError, MAX_FRAME_SIZE_BYTES, PROTOCOL_VERSION};
use mixer_core::infrastructure::transport::{FrameReader, FrameWriter, MixMessage};
use tokio::io::AsyncWriteExt;

#[tokio::test]
async fn oversized_length_prefix_is_refused_before_allocation() {
    let (mut raw, theirs) = tokio::io::duplex(64);
    let mut reader = FrameReader::new(theirs);
    raw.write_all(&(MAX_FRAME_SIZE_BYTES as u32 + 1).to_be_bytes()).await.expect("write");
    assert!(matches!(reader.read_message().await, Err(MixError::MessageTooLarge { .. })));
}

#[tokio::test]
async fn truncated_body_is_a_connection_error() {
    let (mut raw, theirs) = tokio::io::duplex(64);
    let mut reader = FrameReader::new(theirs);
    raw.write_all(&16u32.to_be_bytes()).await.expect("write");
    raw.write_all(&[1, 0, 0]).await.expect("write");
    drop(raw);
    assert!(matches!(reader.read_message().await, Err(MixError::ConnectionError { .. })));
}

#[tokio::test]
async fn unknown_version_is_an_encoding_error() {
    let (mut raw, theirs) = tokio::io::duplex(64);
    let mut reader = FrameReader::new(theirs);
    let version = (PROTOCOL_VERSION + 1).to_le_bytes();
    raw.write_all(&(version.len() as u32 + 1).to_be_bytes()).await.expect("write");
    raw.write_all(&version).await.expect("write");
    raw.write_all(&[0]).await.expect("write");
    assert!(matches!(reader.read_message().await, Err(MixError::EncodingError(_))));
}

#[tokio::test]
async fn messages_arrive_in_order() {
    let (ours, theirs) = tokio::io::duplex(1024);
    let mut writer = FrameWriter::new(ours);
    let mut reader = FrameReader::new(theirs);
    let sent = vec![
        MixMessage::Signature { signature: vec![1; 96] },
        MixMessage::Transaction { final_tx: vec![2; 10] },
    ];
    for message in &sent {
        writer.write_message(message).await.expect("write");
    }
    writer.shutdown().await.expect("shutdown");
    for message in sent {
        assert_eq!(reader.read_message().await.expect("read"), Some(message));
    }
    assert_eq!(reader.read_message().await.expect("eof"), None);
}
