//! Streaming transport seam.
//!
//! The connection manager only ever sees a [`Link`]: a stream of inbound
//! frames and a sink for outbound text. [`WsConnector`] provides one over a
//! real websocket; tests plug in an in-memory [`Connector`].

use std::pin::Pin;

use futures_util::future::{self, BoxFuture};
use futures_util::stream::BoxStream;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::TransportError;

/// One inbound frame as the manager cares about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Binary(Vec<u8>),
    /// Remote sent a close frame
    Closed,
}

pub type FrameStream = BoxStream<'static, Result<Inbound, TransportError>>;
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// An open connection, split into its two directions.
pub struct Link {
    pub inbound: FrameStream,
    pub outbound: FrameSink,
}

/// Opens links to an endpoint. Only the connection manager calls this.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, endpoint: &str) -> BoxFuture<'static, Result<Link, TransportError>>;
}

/// Websocket connector backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, endpoint: &str) -> BoxFuture<'static, Result<Link, TransportError>> {
        let endpoint = endpoint.to_string();
        Box::pin(async move {
            let (socket, _) = connect_async(endpoint).await?;
            let (sink, stream) = socket.split();

            let inbound = stream
                .filter_map(|msg| {
                    future::ready(match msg {
                        Ok(Message::Text(text)) => Some(Ok(Inbound::Text(text))),
                        Ok(Message::Binary(data)) => Some(Ok(Inbound::Binary(data))),
                        Ok(Message::Close(_)) => Some(Ok(Inbound::Closed)),
                        // Control frames are answered by tungstenite itself
                        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {
                            None
                        }
                        Err(e) => Some(Err(TransportError::from(e))),
                    })
                })
                .boxed();

            let outbound = sink
                .sink_map_err(TransportError::from)
                .with(|text: String| future::ready(Ok::<_, TransportError>(Message::Text(text))));

            Ok(Link {
                inbound,
                outbound: Box::pin(outbound),
            })
        })
    }
}
