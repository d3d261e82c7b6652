//! Streamed HTML with a deferred section.
//!
//! The first chunk is the page shell with a fallback already in the slot. Once
//! the deferred future resolves, a second chunk appends the markup inside a
//! `<template>` together with a script that swaps it into the slot, then closes
//! the document.

use super::views::{ResolvedBoundaryTemplate, render_html};
use axum::body::{Body, Bytes};
use futures::{Stream, StreamExt, stream};
use std::{convert::Infallible, future::Future};
use tracing::error;

/// Stream of the shell chunk followed by the resolved chunk.
pub fn chunks<F>(
    shell: String,
    boundary_id: &'static str,
    deferred: F,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static
where
    F: Future<Output = String> + Send + 'static,
{
    let head = stream::once(async move { Ok::<_, Infallible>(Bytes::from(shell)) });
    let tail = stream::once(async move {
        let content = deferred.await;
        Ok::<_, Infallible>(Bytes::from(resolved_chunk(boundary_id, &content)))
    });
    head.chain(tail)
}

#[must_use]
pub fn body<F>(shell: String, boundary_id: &'static str, deferred: F) -> Body
where
    F: Future<Output = String> + Send + 'static,
{
    Body::from_stream(chunks(shell, boundary_id, deferred))
}

fn resolved_chunk(boundary_id: &str, content: &str) -> String {
    render_html(&ResolvedBoundaryTemplate {
        boundary_id,
        content,
    })
    .unwrap_or_else(|err| {
        // Still close the document so the browser stops waiting.
        error!("Failed to render resolved boundary {boundary_id}: {err}");
        "</body>\n</html>\n".to_string()
    })
}
