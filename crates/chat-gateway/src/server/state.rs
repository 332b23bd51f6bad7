//! Gateway state
//!
//! The process-lifetime context: built once at startup, cloned into every
//! request, and torn down by [`GatewayState::shutdown`].

use crate::broadcast::BroadcastListener;
use crate::connection::ConnectionRegistry;
use chat_cache::Subscriber;
use chat_common::JwtService;
use chat_service::ServiceContext;
use std::sync::Arc;

/// Default capacity of each session's outbound queue
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Orchestrator dependencies
    service_context: Arc<ServiceContext>,
    /// Live sessions on this process
    registry: Arc<ConnectionRegistry>,
    /// Bus consumer feeding the registry
    listener: Arc<BroadcastListener>,
    /// Redis subscription, absent when the bus is in-process
    subscriber: Option<Arc<Subscriber>>,
    /// Token validation
    jwt: Arc<JwtService>,
    /// Capacity of each session's outbound queue
    outbound_buffer: usize,
}

impl GatewayState {
    /// Create a new gateway state with a fresh registry and an idle listener
    pub fn new(service_context: ServiceContext, jwt: JwtService) -> Self {
        let registry = ConnectionRegistry::new_shared();
        let listener = Arc::new(BroadcastListener::new(registry.clone()));
        Self {
            service_context: Arc::new(service_context),
            registry,
            listener,
            subscriber: None,
            jwt: Arc::new(jwt),
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }

    /// Attach the Redis subscription so shutdown can close it
    #[must_use]
    pub fn with_subscriber(mut self, subscriber: Subscriber) -> Self {
        self.subscriber = Some(Arc::new(subscriber));
        self
    }

    #[must_use]
    pub fn with_outbound_buffer(mut self, outbound_buffer: usize) -> Self {
        self.outbound_buffer = outbound_buffer.max(1);
        self
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn listener(&self) -> &BroadcastListener {
        &self.listener
    }

    pub fn subscriber(&self) -> Option<&Subscriber> {
        self.subscriber.as_deref()
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn outbound_buffer(&self) -> usize {
        self.outbound_buffer
    }

    /// Stop fan-out and close every live session
    pub async fn shutdown(&self) {
        self.listener.stop().await;

        if let Some(subscriber) = &self.subscriber {
            if let Err(e) = subscriber.shutdown().await {
                tracing::warn!(error = %e, "Failed to shut down subscriber");
            }
        }

        self.registry.close_all();
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("listener", &self.listener)
            .field("outbound_buffer", &self.outbound_buffer)
            .finish()
    }
}
