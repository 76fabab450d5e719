use crate::binding::{AfPacketBinding, Binding};
use crate::config::RelayConfig;
use crate::error::Result;
use crate::forward::{ForwardingLoop, LoopStats};
use crate::shutdown::{self, ShutdownTrigger};
use afpacket::ETH_P_PAE;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Two bindings, one per side of the relay. Starting the engine spawns one forwarding loop per
/// direction; each binding is read by one loop and written by the other.
pub struct ProxyEngine<B: Binding> {
    router: Arc<B>,
    wan: Arc<B>,
}

/// Counters of both directions after the relay stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub router_to_wan: LoopStats,
    pub wan_to_router: LoopStats,
}

/// A running relay.
pub struct RelayHandle<B: Binding> {
    trigger: ShutdownTrigger,
    router_to_wan: JoinHandle<LoopStats>,
    wan_to_router: JoinHandle<LoopStats>,
    router: Arc<B>,
    wan: Arc<B>,
}

impl ProxyEngine<AfPacketBinding> {
    /// Opens both interfaces named in `config` for EAPOL and applies the configured receive
    /// filter to each. Must be called from within a tokio runtime.
    pub fn bind(config: &RelayConfig) -> Result<Self> {
        let mut router = AfPacketBinding::bind(&config.router_iface, ETH_P_PAE)?;
        let mut wan = AfPacketBinding::bind(&config.wan_iface, ETH_P_PAE)?;
        router.set_receive_filter(config.filter)?;
        wan.set_receive_filter(config.filter)?;
        info!(
            "listening on {} and {} ({})",
            router.name(),
            wan.name(),
            config.filter
        );
        Ok(ProxyEngine::new(router, wan))
    }
}

impl<B: Binding> ProxyEngine<B> {
    pub fn new(router: B, wan: B) -> Self {
        ProxyEngine {
            router: Arc::new(router),
            wan: Arc::new(wan),
        }
    }

    /// Spawns both forwarding loops onto the current tokio runtime.
    pub fn start(self) -> RelayHandle<B> {
        let (trigger, shutdown) = shutdown::channel();
        let router_to_wan = tokio::spawn(
            ForwardingLoop::new(self.router.clone(), self.wan.clone()).run(shutdown.clone()),
        );
        let wan_to_router =
            tokio::spawn(ForwardingLoop::new(self.wan.clone(), self.router.clone()).run(shutdown));

        RelayHandle {
            trigger,
            router_to_wan,
            wan_to_router,
            router: self.router,
            wan: self.wan,
        }
    }
}

impl<B: Binding> RelayHandle<B> {
    /// Asks both loops to stop. Returns immediately; use `join` to wait for them.
    pub fn shutdown(&self) {
        self.trigger.fire();
    }

    /// True once both loops have stopped.
    pub fn is_finished(&self) -> bool {
        self.router_to_wan.is_finished() && self.wan_to_router.is_finished()
    }

    /// Waits for both loops to stop, then closes both bindings.
    pub async fn join(self) -> Result<RelayStats> {
        let (router_to_wan, wan_to_router) =
            futures::future::join(self.router_to_wan, self.wan_to_router).await;

        for binding in [&self.router, &self.wan].iter() {
            if let Err(err) = binding.close() {
                warn!("{}: failed to leave receive filter: {}", binding.name(), err);
            }
        }

        let stats = RelayStats {
            router_to_wan: router_to_wan?,
            wan_to_router: wan_to_router?,
        };
        for (src, dst, counts) in [
            (self.router.name(), self.wan.name(), &stats.router_to_wan),
            (self.wan.name(), self.router.name(), &stats.wan_to_router),
        ]
        .iter()
        {
            info!(
                "{} > {}: {} forwarded, {} ignored, {} read errors, {} write errors",
                src,
                dst,
                counts.frames_forwarded,
                counts.frames_ignored,
                counts.read_errors,
                counts.write_errors
            );
        }
        Ok(stats)
    }
}
