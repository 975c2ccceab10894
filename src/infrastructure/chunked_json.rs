// Chunked JSON streaming utilities
use crate::application::streaming_service::StreamMessage;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;

/// Create a chunked streaming response of length-prefixed JSON messages
pub async fn chunked_json_stream<S>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = StreamMessage> + Send + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding on the response itself
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single StreamMessage to a chunk: 4-byte big-endian length, then payload
async fn serialize_chunk(msg: StreamMessage, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(&json).await?
    } else {
        json
    };

    let length = u32::try_from(payload.len()).map_err(std::io::Error::other)?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<StreamMessage>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chunk_is_length_prefixed_json() {
        let msg = StreamMessage::Failed {
            message: "boom".to_string(),
        };
        let chunk = serialize_chunk(msg.clone(), false).await.unwrap();

        let length = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(length, chunk.len() - 4);
        assert_eq!(&chunk[4..], serde_json::to_vec(&msg).unwrap().as_slice());
    }

    #[tokio::test]
    async fn test_stream_body_concatenates_chunks() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send(StreamMessage::Failed {
            message: "a".to_string(),
        })
        .await
        .unwrap();
        drop(tx);

        let response = stream_from_receiver(rx, false).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let length = u32::from_be_bytes([body[0], body[1], body[2], body[3]]) as usize;
        assert_eq!(body.len(), 4 + length);
    }
}
